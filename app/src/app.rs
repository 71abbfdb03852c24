//! Application context.
//!
//! [`TodoApp`] owns the store and the renderer. It is created explicitly by
//! [`TodoApp::launch`] and destroyed explicitly by [`TodoApp::teardown`];
//! there is no global instance.

use crate::actions::AppAction;
use crate::config::AppConfig;
use crate::environment::TodoEnvironment;
use crate::error::{AppError, Result};
use crate::list::ListReducer;
use crate::providers::{IdentityProvider, RemoteCollection};
use crate::render::{ListRenderer, Row, RowEvent};
use crate::session::SessionReducer;
use crate::state::{AppState, SessionPhase};
use crate::types::{Identity, Item, ItemId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use todosync_core::composition::{CombinedReducer, SharedReducer, combine_reducers};
use todosync_runtime::{EffectHandle, Store, StoreError};

/// The session gate and the list store, joined
pub type TodoReducer<I, C> = CombinedReducer<AppState, AppAction, TodoEnvironment<I, C>>;

/// Store running the to-do reducers
pub type TodoStore<I, C> = Store<AppState, AppAction, TodoEnvironment<I, C>, TodoReducer<I, C>>;

/// Builds the application reducer.
///
/// The session gate runs first, so the list store already sees the phase
/// an action leads to.
#[must_use]
pub fn todo_reducer<I, C>() -> TodoReducer<I, C>
where
    I: IdentityProvider + Clone + 'static,
    C: RemoteCollection + Clone + 'static,
{
    let session: SharedReducer<AppState, AppAction, TodoEnvironment<I, C>> =
        Arc::new(SessionReducer::new());
    let list: SharedReducer<AppState, AppAction, TodoEnvironment<I, C>> =
        Arc::new(ListReducer::new());

    combine_reducers(vec![session, list])
}

/// A running to-do application
pub struct TodoApp<I, C>
where
    I: IdentityProvider + Clone + 'static,
    C: RemoteCollection + Clone + 'static,
{
    store: TodoStore<I, C>,
    renderer: ListRenderer,
    updates: watch::Receiver<AppState>,
    config: AppConfig,
}

impl<I, C> TodoApp<I, C>
where
    I: IdentityProvider + Clone + 'static,
    C: RemoteCollection + Clone + 'static,
{
    /// Builds the store and runs the session gate.
    ///
    /// Returns once `Launched` has been reduced; sign-in may still be in
    /// progress. Use [`TodoApp::wait_until_ready`] to wait for it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store rejects the launch.
    pub async fn launch(env: TodoEnvironment<I, C>, config: AppConfig) -> Result<Self> {
        let store = Store::with_config(AppState::default(), todo_reducer(), env, config.store.clone());
        let updates = store.observe();

        tracing::info!("Launching to-do application");
        store.send(AppAction::Launched).await?;

        Ok(Self {
            store,
            renderer: ListRenderer::new(),
            updates,
            config,
        })
    }

    /// Waits for the session gate to settle.
    ///
    /// # Errors
    ///
    /// - [`AppError::Terminated`] if sign-in was cancelled or failed
    /// - [`AppError::Timeout`] if the gate does not settle within the
    ///   configured ready timeout
    pub async fn wait_until_ready(&self) -> Result<Identity> {
        let state = self
            .wait_for(
                |state| matches!(state.phase, SessionPhase::Authenticated { .. } | SessionPhase::Terminated),
                self.config.ready_timeout,
            )
            .await?;

        match state.phase {
            SessionPhase::Authenticated { identity } => Ok(identity),
            _ => Err(AppError::Terminated),
        }
    }

    /// Creates an item. The list updates when the collection echoes it back.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] after teardown.
    pub async fn add(&self, text: impl Into<String>) -> Result<EffectHandle> {
        self.send(AppAction::AddItem { text: text.into() }).await
    }

    /// Flips the completion flag of an item.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] after teardown.
    pub async fn toggle(&self, id: ItemId) -> Result<EffectHandle> {
        self.send(AppAction::ToggleItem { id }).await
    }

    /// Deletes an item.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] after teardown.
    pub async fn delete(&self, id: ItemId) -> Result<EffectHandle> {
        self.send(AppAction::DeleteItem { id }).await
    }

    /// Handles a tap on a rendered row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] after teardown.
    pub async fn dispatch(&self, event: RowEvent) -> Result<EffectHandle> {
        self.send(event.into_action()).await
    }

    /// Signs out and starts a fresh sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] after teardown.
    pub async fn sign_out(&self) -> Result<EffectHandle> {
        self.send(AppAction::SignOutRequested).await
    }

    async fn send(&self, action: AppAction) -> Result<EffectHandle> {
        Ok(self.store.send(action).await?)
    }

    /// Current session phase.
    pub async fn phase(&self) -> SessionPhase {
        self.store.state(|state| state.phase.clone()).await
    }

    /// Items of the last delivered snapshot.
    pub async fn items(&self) -> Vec<Item> {
        self.store.state(|state| state.items.clone()).await
    }

    /// A fresh observer of the application state.
    #[must_use]
    pub fn observe(&self) -> watch::Receiver<AppState> {
        self.store.observe()
    }

    /// Rows as last returned by [`TodoApp::next_rows`].
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        self.renderer.rows()
    }

    /// Waits for the next state change that alters the rendered rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store's observation channel closed.
    pub async fn next_rows(&mut self) -> Result<Vec<Row>> {
        loop {
            self.updates
                .changed()
                .await
                .map_err(|_| StoreError::ChannelClosed)?;
            let items = self.updates.borrow_and_update().items.clone();

            if let Some(rows) = self.renderer.update(&items) {
                return Ok(rows.to_vec());
            }
        }
    }

    /// Waits for a state matching `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Timeout`] if no matching state shows up in time.
    pub async fn wait_for<F>(&self, predicate: F, timeout: Duration) -> Result<AppState>
    where
        F: FnMut(&AppState) -> bool,
    {
        self.store
            .wait_for_state(predicate, timeout)
            .await
            .map_err(AppError::from_wait)
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &TodoStore<I, C> {
        &self.store
    }

    /// Cancels the subscription and shuts the store down.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if effects are still running when the
    /// shutdown timeout expires.
    pub async fn teardown(self) -> Result<()> {
        tracing::info!("Tearing down to-do application");
        self.store.shutdown(self.config.store.shutdown_timeout).await?;
        Ok(())
    }
}
