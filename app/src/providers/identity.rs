//! Identity provider trait.

use crate::error::SignInError;
use crate::types::Identity;
use std::future::Future;

/// Identity provider.
///
/// This trait abstracts over hosted sign-in flows (email link, password,
/// federated providers). The flow itself, including its UI, belongs to the
/// provider.
pub trait IdentityProvider: Send + Sync {
    /// The identity signed in on this device, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Run the external sign-in flow and wait for its result.
    ///
    /// # Errors
    ///
    /// Returns [`SignInError::Cancelled`] if the user backs out of the flow
    /// and [`SignInError::Failed`] if the provider rejects the attempt.
    fn sign_in(&self) -> impl Future<Output = Result<Identity, SignInError>> + Send;

    /// Forget the current identity.
    fn sign_out(&self) -> impl Future<Output = ()> + Send;
}
