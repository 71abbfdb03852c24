//! Reactive list store.
//!
//! Mutations go straight to the remote collection as fire-and-forget
//! effects; nothing is applied locally. The item list only changes when the
//! standing subscription delivers a snapshot, which replaces it wholesale.

use crate::actions::AppAction;
use crate::environment::TodoEnvironment;
use crate::error::RemoteError;
use crate::providers::{IdentityProvider, RemoteCollection};
use crate::state::AppState;
use crate::types::{Item, NewItem, OwnerKey, done_patch};
use futures::StreamExt;
use std::marker::PhantomData;
use todosync_core::effect::{Effect, EffectId};
use todosync_core::{SmallVec, reducer::Reducer, smallvec};

/// Cancellation id of the collection subscription
pub const SUBSCRIPTION: EffectId = EffectId::new("todo.subscription");

/// Reducer for item mutations and snapshot delivery
pub struct ListReducer<I, C> {
    _environment: PhantomData<fn() -> (I, C)>,
}

impl<I, C> ListReducer<I, C>
where
    I: IdentityProvider + Clone + 'static,
    C: RemoteCollection + Clone + 'static,
{
    /// Creates a new `ListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _environment: PhantomData,
        }
    }

    /// Standing subscription to `owner`'s collection
    ///
    /// Every snapshot becomes a [`AppAction::SnapshotReceived`]. Error
    /// deliveries are logged and dropped; the subscription stays open.
    pub fn subscription(env: &TodoEnvironment<I, C>, owner: OwnerKey) -> Effect<AppAction> {
        tracing::info!(owner = %owner, "Opening collection subscription");

        let snapshots = env.collection.subscribe(&owner).filter_map(move |delivery| {
            let owner = owner.clone();
            async move {
                match delivery {
                    Ok(documents) => Some(AppAction::SnapshotReceived { owner, documents }),
                    Err(error) => {
                        tracing::warn!(owner = %owner, %error, "Dropped subscription error");
                        metrics::counter!("todo.subscription.errors_dropped").increment(1);
                        None
                    },
                }
            }
        });

        Effect::stream(snapshots).cancellable(SUBSCRIPTION)
    }

    fn remote_write<F>(operation: &'static str, write: F) -> Effect<AppAction>
    where
        F: Future<Output = Result<(), RemoteError>> + Send + 'static,
    {
        Effect::fire_and_forget(async move {
            if let Err(error) = write.await {
                tracing::warn!(operation, %error, "Remote write failed");
                metrics::counter!("todo.remote.write_failed", "operation" => operation).increment(1);
            }
        })
    }
}

impl<I, C> Default for ListReducer<I, C>
where
    I: IdentityProvider + Clone + 'static,
    C: RemoteCollection + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I, C> Reducer for ListReducer<I, C>
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
            AppAction::AddItem { text } => {
                let Some(owner) = state.phase.owner_key() else {
                    tracing::debug!("Ignoring add: no active session");
                    return SmallVec::new();
                };

                let collection = env.collection.clone();
                let fields = NewItem::new(text).into_fields();
                smallvec![Self::remote_write("create", async move {
                    let id = collection.create(&owner, fields).await?;
                    tracing::debug!(owner = %owner, id = %id, "Item created");
                    Ok::<_, RemoteError>(())
                })]
            },

            AppAction::ToggleItem { id } => {
                let Some(owner) = state.phase.owner_key() else {
                    tracing::debug!(id = %id, "Ignoring toggle: no active session");
                    return SmallVec::new();
                };
                let Some(item) = state.get(&id) else {
                    tracing::debug!(id = %id, "Ignoring toggle: item not in snapshot");
                    return SmallVec::new();
                };

                let collection = env.collection.clone();
                let patch = done_patch(!item.done);
                smallvec![Self::remote_write("update", async move {
                    collection.update(&owner, &id, patch).await
                })]
            },

            AppAction::DeleteItem { id } => {
                let Some(owner) = state.phase.owner_key() else {
                    tracing::debug!(id = %id, "Ignoring delete: no active session");
                    return SmallVec::new();
                };

                let collection = env.collection.clone();
                smallvec![Self::remote_write("delete", async move {
                    collection.delete(&owner, &id).await
                })]
            },

            AppAction::SnapshotReceived { owner, documents } => {
                if state.phase.owner_key().as_ref() != Some(&owner) {
                    tracing::debug!(owner = %owner, "Ignoring snapshot for inactive session");
                    return SmallVec::new();
                }

                state.items = documents.iter().map(Item::from_document).collect();
                tracing::trace!(count = state.items.len(), "Snapshot applied");
                SmallVec::new()
            },

            AppAction::Launched
            | AppAction::SignInSucceeded { .. }
            | AppAction::SignInFailed { .. }
            | AppAction::SignOutRequested => SmallVec::new(),
        }
    }
}
