//! # todosync Runtime
//!
//! Runtime implementation for the todosync architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution,
//! effect handling and state observation.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Observation**: Every reducer run publishes the full state to watchers
//! - **Cancellation**: Standing effects (subscriptions) registered by id and aborted on demand
//!
//! ## Example
//!
//! ```ignore
//! use todosync_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//!
//! // Watch state as it is replaced
//! let mut rx = store.observe();
//! rx.changed().await?;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use todosync_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for effects or for a matching state
        #[error("Timeout waiting for store")]
        Timeout,

        /// An observation channel closed
        #[error("Store channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use todosync_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(64)
///     .with_shutdown_timeout(Duration::from_secs(5));
/// assert_eq!(config.broadcast_capacity, 64);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of effect-produced actions buffered for action observers
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize, shutdown_timeout: Duration) -> Self {
        Self {
            broadcast_capacity,
            shutdown_timeout,
        }
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the one-shot effects
/// (futures) started by that action. Standing stream effects are not
/// tracked: they only end when cancelled.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // All futures started by Action::Start are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle together with its internal tracking side
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (_tx, rx) = watch::channel(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of tracked effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all tracked effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all tracked effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            self.notifier.send_replace(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Runs on completion, on panic, and when the task is aborted.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration, Effect,
        EffectHandle, EffectTracking, Ordering, Reducer, RwLock, StoreConfig, StoreError, watch,
    };
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::sync::{Mutex, PoisonError};
    use todosync_core::effect::EffectId;
    use tokio::sync::broadcast;
    use tokio::task::AbortHandle;

    type Cancellations = Arc<Mutex<HashMap<EffectId, Vec<AbortHandle>>>>;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation)
    /// 5. Observation (full state published after every reducer run)
    ///
    /// Clones share the same state, effects and channels.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        config: StoreConfig,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        cancellations: Cancellations,
        /// Latest state, replaced wholesale after every reducer run.
        observers: Arc<watch::Sender<S>>,
        /// Actions produced by effects, for observers that care about the feedback loop.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + Clone + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));
            let (observers, _) = watch::channel(initial_state.clone());

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                config,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                cancellations: Arc::new(Mutex::new(HashMap::new())),
                observers: Arc::new(observers),
                action_broadcast,
            }
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> &StoreConfig {
            &self.config
        }

        /// Whether shutdown has been initiated
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Number of effects (one-shot and standing) currently running
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Publishes the new state to observers
        /// 4. Starts the returned effects, registering cancellable ones,
        ///    before releasing the lock
        ///
        /// `send()` returns after starting effect execution, not completion.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.is_shutting_down() {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!("Processing action");
            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            // shutdown() takes the lock before cancel_all, so nothing can be
            // registered after it once this check passes
            if self.is_shutting_down() {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            tracing::trace!("Reducer completed, returned {} effects", effects.len());

            // Published under the lock so observers see states in reduction order
            self.observers.send_replace(state.clone());

            // Started and registered under the lock so a Cancel reduced by a
            // later action always finds the handles
            for effect in effects {
                self.execute_effect(effect, &tracking);
            }
            drop(state);

            Ok(handle)
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.items.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Watch the state
        ///
        /// The receiver always holds the state as of the last reducer run;
        /// intermediate states may be skipped by slow observers.
        #[must_use]
        pub fn observe(&self) -> watch::Receiver<S> {
            self.observers.subscribe()
        }

        /// Wait until the observed state satisfies `predicate`
        ///
        /// Checks the current state first.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`] if no matching state is published in time
        /// - [`StoreError::ChannelClosed`] if the observation channel closed
        pub async fn wait_for_state<F>(&self, mut predicate: F, timeout: Duration) -> Result<S, StoreError>
        where
            F: FnMut(&S) -> bool,
        {
            let mut rx = self.observe();
            tokio::time::timeout(timeout, async move {
                rx.wait_for(|state| predicate(state))
                    .await
                    .map(|state| state.clone())
                    .map_err(|_| StoreError::ChannelClosed)
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to actions produced by effects
        ///
        /// Only feedback actions are broadcast, not the actions passed to `send`.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Abort every effect registered under `id`
        ///
        /// Returns the number of tasks aborted.
        pub fn cancel(&self, id: EffectId) -> usize {
            let handles = self
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id)
                .unwrap_or_default();

            let aborted = handles.iter().filter(|h| !h.is_finished()).count();
            for handle in handles {
                handle.abort();
            }

            if aborted > 0 {
                tracing::debug!(effect_id = %id, aborted, "Cancelled effects");
                metrics::counter!("store.effects.cancelled").increment(aborted as u64);
            }
            aborted
        }

        /// Abort every registered cancellable effect
        pub fn cancel_all(&self) -> usize {
            let ids: Vec<EffectId> = self
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .keys()
                .copied()
                .collect();

            ids.into_iter().map(|id| self.cancel(id)).sum()
        }

        /// Initiate graceful shutdown of the store
        ///
        /// 1. Sets the shutdown flag (rejecting new actions)
        /// 2. Cancels standing effects
        /// 3. Waits for the remaining effects to complete (with timeout)
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);
            // Wait out an in-flight reduction so its effects are registered
            drop(self.state.write().await);
            self.cancel_all();

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timeout");
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Feed an effect-produced action back into the store
        async fn feed_back(&self, action: A) -> Result<(), StoreError> {
            // No receivers is fine
            let _ = self.action_broadcast.send(action.clone());
            self.send(action).await.map(|_| ())
        }

        fn register(&self, id: EffectId, handles: Vec<AbortHandle>) {
            let mut cancellations = self
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let entry = cancellations.entry(id).or_default();
            entry.retain(|handle| !handle.is_finished());
            entry.extend(handles);
        }

        /// Execute an effect
        ///
        /// Returns the abort handles of the tasks it spawned so that a
        /// surrounding [`Effect::Cancellable`] can register them.
        ///
        /// **Effect failures**: effects are fire-and-forget. Whatever an
        /// effect wants to report has to come back as an action; the guards
        /// keep the counters right on completion, panic and abort.
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) -> Vec<AbortHandle> {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    Vec::new()
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();
                    self.pending_effects.fetch_add(1, Ordering::SeqCst);

                    let guard = DecrementGuard(tracking.clone());
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));
                    let store = self.clone();

                    let task = tokio::spawn(async move {
                        let _guard = guard;
                        let _pending_guard = pending_guard;

                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            if let Err(error) = store.feed_back(action).await {
                                tracing::debug!(%error, "Dropped feedback action");
                            }
                        }
                    });
                    vec![task.abort_handle()]
                },
                Effect::Stream(mut stream) => {
                    tracing::trace!("Executing Effect::Stream");
                    metrics::counter!("store.effects.executed", "type" => "stream").increment(1);
                    self.pending_effects.fetch_add(1, Ordering::SeqCst);

                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));
                    let store = self.clone();

                    let task = tokio::spawn(async move {
                        let _pending_guard = pending_guard;

                        while let Some(action) = stream.next().await {
                            if let Err(error) = store.feed_back(action).await {
                                tracing::debug!(%error, "Stopping stream effect");
                                break;
                            }
                        }
                        tracing::trace!("Effect::Stream ended");
                    });
                    vec![task.abort_handle()]
                },
                Effect::Cancellable { id, effect } => {
                    tracing::trace!(effect_id = %id, "Executing Effect::Cancellable");
                    let handles = self.execute_effect(*effect, tracking);
                    self.register(id, handles);
                    Vec::new()
                },
                Effect::Cancel(id) => {
                    tracing::trace!(effect_id = %id, "Executing Effect::Cancel");
                    metrics::counter!("store.effects.executed", "type" => "cancel").increment(1);
                    self.cancel(id);
                    Vec::new()
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                config: self.config.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                cancellations: Arc::clone(&self.cancellations),
                observers: Arc::clone(&self.observers),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use todosync_core::{SmallVec, smallvec};

    #[derive(Debug, Clone, Default)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone)]
    enum TestAction {
        Increment,
        ProduceEffect,
        ProduceNothing,
    }

    #[derive(Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::ProduceEffect => {
                    smallvec![Effect::future(async { Some(TestAction::Increment) })]
                },
                TestAction::ProduceNothing => {
                    smallvec![Effect::fire_and_forget(async {})]
                },
            }
        }
    }

    #[tokio::test]
    async fn send_runs_reducer() {
        let store = Store::new(TestState::default(), TestReducer, ());
        let _ = store.send(TestAction::Increment).await;
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn future_effect_feeds_back() {
        let store = Store::new(TestState::default(), TestReducer, ());
        let mut handle = store
            .send(TestAction::ProduceEffect)
            .await
            .unwrap_or_else(|_| EffectHandle::completed());
        let waited = handle.wait_with_timeout(Duration::from_secs(1)).await;
        assert_eq!(waited, Ok(()));
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn observers_see_latest_state() {
        let store = Store::new(TestState::default(), TestReducer, ());
        let rx = store.observe();
        assert_eq!(rx.borrow().value, 0);

        let _ = store.send(TestAction::Increment).await;
        let _ = store.send(TestAction::Increment).await;
        assert_eq!(rx.borrow().value, 2);
    }

    #[tokio::test]
    async fn shutdown_rejects_actions() {
        let store = Store::new(TestState::default(), TestReducer, ());
        let _ = store.send(TestAction::ProduceNothing).await;
        assert_eq!(store.shutdown(Duration::from_secs(1)).await, Ok(()));

        let result = store.send(TestAction::Increment).await;
        assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
        assert!(store.is_shutting_down());
    }

    #[test]
    fn completed_handle_has_nothing_pending() {
        assert_eq!(EffectHandle::completed().pending(), 0);
    }

    #[test]
    fn config_builders() {
        let config = StoreConfig::new(4, Duration::from_secs(1))
            .with_broadcast_capacity(8)
            .with_shutdown_timeout(Duration::from_millis(250));
        assert_eq!(config.broadcast_capacity, 8);
        assert_eq!(config.shutdown_timeout, Duration::from_millis(250));
    }
}
