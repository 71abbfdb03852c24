//! Session gate.
//!
//! ```text
//! Unauthenticated ──Launched──▶ SigningIn ──SignInSucceeded──▶ Authenticated
//!        │                          │  ▲                           │
//!        └──Launched (signed in)────┼──┼───────────────────────────┤
//!                                   │  └──────SignOutRequested─────┘
//!                                   └──SignInFailed──▶ Terminated
//! ```
//!
//! The list subscription is only ever opened on entering `Authenticated`
//! and is cancelled on leaving it.

use crate::actions::AppAction;
use crate::environment::TodoEnvironment;
use crate::error::SignInError;
use crate::list::{ListReducer, SUBSCRIPTION};
use crate::providers::{IdentityProvider, RemoteCollection};
use crate::state::{AppState, SessionPhase};
use crate::types::Identity;
use std::marker::PhantomData;
use todosync_core::effect::Effect;
use todosync_core::{SmallVec, reducer::Reducer, smallvec};

/// Reducer for the session gate
pub struct SessionReducer<I, C> {
    _environment: PhantomData<fn() -> (I, C)>,
}

impl<I, C> SessionReducer<I, C>
where
    I: IdentityProvider + Clone + 'static,
    C: RemoteCollection + Clone + 'static,
{
    /// Creates a new `SessionReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _environment: PhantomData,
        }
    }

    fn sign_in(env: &TodoEnvironment<I, C>) -> Effect<AppAction> {
        let identity = env.identity.clone();
        Effect::future(async move { Some(Self::outcome(identity.sign_in().await)) })
    }

    fn sign_out_then_in(env: &TodoEnvironment<I, C>) -> Effect<AppAction> {
        let identity = env.identity.clone();
        Effect::future(async move {
            identity.sign_out().await;
            Some(Self::outcome(identity.sign_in().await))
        })
    }

    fn outcome(result: Result<Identity, SignInError>) -> AppAction {
        match result {
            Ok(identity) => AppAction::SignInSucceeded { identity },
            Err(reason) => AppAction::SignInFailed { reason },
        }
    }

    fn authenticate(
        state: &mut AppState,
        identity: Identity,
        env: &TodoEnvironment<I, C>,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        tracing::info!(uid = %identity.uid, "Session authenticated");
        let owner = identity.owner_key();
        state.phase = SessionPhase::Authenticated { identity };
        state.items.clear();
        smallvec![ListReducer::subscription(env, owner)]
    }
}

impl<I, C> Default for SessionReducer<I, C>
where
    I: IdentityProvider + Clone + 'static,
    C: RemoteCollection + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I, C> Reducer for SessionReducer<I, C>
where
    I: IdentityProvider + Clone + 'static,
    C: RemoteCollection + Clone + 'static,
{
    type State = AppState;
    type Action = AppAction;
    type Environment = TodoEnvironment<I, C>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Launched if state.phase == SessionPhase::Unauthenticated => {
                if let Some(identity) = env.identity.current_identity() {
                    return Self::authenticate(state, identity, env);
                }

                tracing::info!("No signed-in identity, starting sign-in");
                state.phase = SessionPhase::SigningIn;
                smallvec![Self::sign_in(env)]
            },

            AppAction::SignInSucceeded { identity } if state.phase == SessionPhase::SigningIn => {
                Self::authenticate(state, identity, env)
            },

            AppAction::SignInFailed { reason } if state.phase == SessionPhase::SigningIn => {
                tracing::info!(%reason, "Sign-in did not complete, terminating");
                state.phase = SessionPhase::Terminated;
                SmallVec::new()
            },

            AppAction::SignOutRequested if state.phase.identity().is_some() => {
                if let Some(identity) = state.phase.identity() {
                    tracing::info!(uid = %identity.uid, "Signing out");
                }
                state.phase = SessionPhase::SigningIn;
                state.items.clear();
                smallvec![Effect::Cancel(SUBSCRIPTION), Self::sign_out_then_in(env)]
            },

            action @ (AppAction::Launched
            | AppAction::SignInSucceeded { .. }
            | AppAction::SignInFailed { .. }
            | AppAction::SignOutRequested) => {
                tracing::debug!(phase = ?state.phase, ?action, "Ignoring session action in this phase");
                SmallVec::new()
            },

            AppAction::AddItem { .. }
            | AppAction::ToggleItem { .. }
            | AppAction::DeleteItem { .. }
            | AppAction::SnapshotReceived { .. } => SmallVec::new(),
        }
    }
}
