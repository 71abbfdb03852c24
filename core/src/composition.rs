//! Reducer composition utilities
//!
//! [`combine_reducers`] runs several reducers over the same state and
//! action types, one after another, and concatenates their effects. The
//! to-do core uses it to join the session gate and the list store into a
//! single reducer driven by one store.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use todosync_core::composition::{SharedReducer, combine_reducers};
//! use todosync_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Clone, Default)]
//! struct AppState {
//!     signed_in: bool,
//!     items: usize,
//! }
//!
//! #[derive(Clone)]
//! enum AppAction {
//!     SignedIn,
//!     Added,
//! }
//!
//! struct SessionReducer;
//! struct ItemsReducer;
//!
//! impl Reducer for SessionReducer {
//!     type State = AppState;
//!     type Action = AppAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut AppState, action: AppAction, _env: &()) -> SmallVec<[Effect<AppAction>; 4]> {
//!         if matches!(action, AppAction::SignedIn) {
//!             state.signed_in = true;
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! impl Reducer for ItemsReducer {
//!     type State = AppState;
//!     type Action = AppAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut AppState, action: AppAction, _env: &()) -> SmallVec<[Effect<AppAction>; 4]> {
//!         if matches!(action, AppAction::Added) && state.signed_in {
//!             state.items += 1;
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let session: SharedReducer<AppState, AppAction, ()> = Arc::new(SessionReducer);
//! let items: SharedReducer<AppState, AppAction, ()> = Arc::new(ItemsReducer);
//! let combined = combine_reducers(vec![session, items]);
//!
//! let mut state = AppState::default();
//! combined.reduce(&mut state, AppAction::SignedIn, &());
//! combined.reduce(&mut state, AppAction::Added, &());
//! assert_eq!(state.items, 1);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;
use std::sync::Arc;

/// Shared handle to a reducer that can be combined
pub type SharedReducer<S, A, E> =
    Arc<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, in the order given, and all effects are
/// collected and concatenated. Later reducers observe the state changes made
/// by earlier ones.
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<SharedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    A: Clone,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E> {
    reducers: Vec<SharedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E> {
    /// Number of reducers combined
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether no reducers were combined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> Clone for CombinedReducer<S, A, E> {
    fn clone(&self) -> Self {
        Self {
            reducers: self.reducers.iter().map(Arc::clone).collect(),
        }
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    A: Clone,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects.into_iter().filter(|effect| !effect.is_none()));
        }

        all_effects
    }
}
