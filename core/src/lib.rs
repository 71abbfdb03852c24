//! # todosync Core
//!
//! Core traits and types for the todosync architecture.
//!
//! This crate provides the abstractions the to-do list core is built on:
//! reducers that turn actions into state changes, and effects that describe
//! the side effects (remote writes, sign-in flows, standing subscriptions)
//! the runtime has to perform.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state of a feature
//! - **Action**: All possible inputs to a reducer (user intents and effect feedback)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Example
//!
//! ```
//! use todosync_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct ListState {
//!     items: Vec<String>,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum ListAction {
//!     Replace(Vec<String>),
//! }
//!
//! struct ListReducer;
//!
//! impl Reducer for ListReducer {
//!     type State = ListState;
//!     type Action = ListAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut ListState,
//!         action: ListAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<ListAction>; 4]> {
//!         match action {
//!             ListAction::Replace(items) => state.items = items,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = ListState::default();
//! ListReducer.reduce(&mut state, ListAction::Replace(vec!["buy milk".into()]), &());
//! assert_eq!(state.items.len(), 1);
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Reducer composition utilities
pub mod composition;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Decides whether the action applies to the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution); the runtime decides when and where
/// they run.
pub mod effect {
    use futures::Stream;
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;

    /// Identifier under which cancellable effects are registered
    ///
    /// Sending [`Effect::Cancel`] with the same id aborts every running
    /// effect registered under it.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Create an effect id from a static name
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(name)
        }

        /// The name this id was created with
        #[must_use]
        pub const fn as_str(&self) -> &'static str {
            self.0
        }
    }

    impl fmt::Display for EffectId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Standing stream of actions
        ///
        /// Every item is fed back into the reducer. The stream runs until it
        /// ends or until it is cancelled.
        Stream(Pin<Box<dyn Stream<Item = Action> + Send>>),

        /// Register the wrapped effect under an id so it can be cancelled later
        Cancellable {
            /// Cancellation id
            id: EffectId,
            /// The effect to run
            effect: Box<Effect<Action>>,
        },

        /// Abort every running effect registered under the id
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Stream(_) => write!(f, "Effect::Stream(<stream>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap a future producing an optional feedback action
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Wrap a future whose outcome is never fed back
        pub fn fire_and_forget<F>(fut: F) -> Self
        where
            F: Future<Output = ()> + Send + 'static,
        {
            Effect::Future(Box::pin(async move {
                fut.await;
                None
            }))
        }

        /// Wrap a stream whose items are all fed back
        pub fn stream<S>(stream: S) -> Self
        where
            S: Stream<Item = Action> + Send + 'static,
        {
            Effect::Stream(Box::pin(stream))
        }

        /// Make this effect cancellable under `id`
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Self {
            Effect::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// Whether this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}
