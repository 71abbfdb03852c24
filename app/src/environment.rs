//! Environment injected into the reducers.

use crate::providers::{IdentityProvider, RemoteCollection};

/// External dependencies of the to-do core.
///
/// # Type Parameters
///
/// - `I`: Identity provider
/// - `C`: Remote document collection
#[derive(Clone, Debug)]
pub struct TodoEnvironment<I, C>
where
    I: IdentityProvider + Clone,
    C: RemoteCollection + Clone,
{
    /// Identity provider.
    pub identity: I,

    /// Remote document collection.
    pub collection: C,
}

impl<I, C> TodoEnvironment<I, C>
where
    I: IdentityProvider + Clone,
    C: RemoteCollection + Clone,
{
    /// Create a new environment.
    #[must_use]
    pub const fn new(identity: I, collection: C) -> Self {
        Self {
            identity,
            collection,
        }
    }
}
