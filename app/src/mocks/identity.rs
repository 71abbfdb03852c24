//! Scripted identity provider.

use crate::error::SignInError;
use crate::providers::IdentityProvider;
use crate::types::Identity;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Script {
    current: Option<Identity>,
    outcomes: VecDeque<Result<Identity, SignInError>>,
    sign_in_calls: usize,
    sign_out_calls: usize,
}

/// Identity provider replaying queued sign-in outcomes.
///
/// Each `sign_in` pops the next outcome; when the queue is empty the flow
/// counts as cancelled. A successful outcome becomes the current identity,
/// `sign_out` clears it.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIdentityProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedIdentityProvider {
    /// A provider with nobody signed in and no queued outcomes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider with `identity` already signed in on this device.
    #[must_use]
    pub fn signed_in(identity: Identity) -> Self {
        let provider = Self::new();
        provider.lock().current = Some(identity);
        provider
    }

    /// Queue a successful sign-in.
    #[must_use]
    pub fn then_sign_in_as(self, identity: Identity) -> Self {
        self.push_outcome(Ok(identity));
        self
    }

    /// Queue a sign-in the user backs out of.
    #[must_use]
    pub fn then_cancel(self) -> Self {
        self.push_outcome(Err(SignInError::Cancelled));
        self
    }

    /// Queue a sign-in the provider rejects.
    #[must_use]
    pub fn then_fail(self, reason: impl Into<String>) -> Self {
        self.push_outcome(Err(SignInError::Failed(reason.into())));
        self
    }

    /// Queue the outcome of a later sign-in.
    pub fn push_outcome(&self, outcome: Result<Identity, SignInError>) {
        self.lock().outcomes.push_back(outcome);
    }

    /// Number of sign-in flows started so far.
    #[must_use]
    pub fn sign_in_calls(&self) -> usize {
        self.lock().sign_in_calls
    }

    /// Number of sign-outs so far.
    #[must_use]
    pub fn sign_out_calls(&self) -> usize {
        self.lock().sign_out_calls
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityProvider for ScriptedIdentityProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.lock().current.clone()
    }

    fn sign_in(&self) -> impl Future<Output = Result<Identity, SignInError>> + Send {
        let outcome = {
            let mut script = self.lock();
            script.sign_in_calls += 1;
            let outcome = script.outcomes.pop_front().unwrap_or(Err(SignInError::Cancelled));
            if let Ok(identity) = &outcome {
                script.current = Some(identity.clone());
            }
            outcome
        };

        async move { outcome }
    }

    fn sign_out(&self) -> impl Future<Output = ()> + Send {
        {
            let mut script = self.lock();
            script.sign_out_calls += 1;
            script.current = None;
        }

        async {}
    }
}
