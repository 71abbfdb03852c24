//! In-memory document collection.

use crate::error::RemoteError;
use crate::providers::{RemoteCollection, SnapshotStream};
use crate::types::{Document, Fields, Item, ItemId, OwnerKey};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// Buffered change notifications per owner. Subscribers that fall further
/// behind skip to newer snapshots.
const CHANGE_CAPACITY: usize = 64;

type Delivery = Result<Vec<Document>, RemoteError>;

#[derive(Debug)]
struct OwnerCollection {
    documents: Vec<Document>,
    changes: broadcast::Sender<Delivery>,
}

impl OwnerCollection {
    fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            documents: Vec::new(),
            changes,
        }
    }

    fn publish(&self) {
        // No subscribers is fine
        let _ = self.changes.send(Ok(self.documents.clone()));
    }
}

/// Per-owner document collections held in memory.
///
/// Documents keep creation order. Every accepted write notifies the
/// owner's subscribers with the full snapshot. Writes can be made to fail
/// with [`InMemoryCollection::set_fail_writes`], and error deliveries can be
/// injected with [`InMemoryCollection::emit_error`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryCollection {
    owners: Arc<Mutex<HashMap<OwnerKey, OwnerCollection>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail with [`RemoteError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Deliver an error to the owner's subscribers.
    pub fn emit_error(&self, owner: &OwnerKey, error: RemoteError) {
        let owners = self.lock();
        if let Some(collection) = owners.get(owner) {
            let _ = collection.changes.send(Err(error));
        }
    }

    /// Insert a document directly, bypassing failure injection.
    pub fn seed(&self, owner: &OwnerKey, fields: Fields) -> ItemId {
        let id = ItemId::generate();
        let mut owners = self.lock();
        let collection = owners.entry(owner.clone()).or_insert_with(OwnerCollection::new);
        collection.documents.push(Document::new(id.clone(), fields));
        collection.publish();
        id
    }

    /// Documents currently stored for `owner`.
    #[must_use]
    pub fn documents(&self, owner: &OwnerKey) -> Vec<Document> {
        self.lock()
            .get(owner)
            .map(|collection| collection.documents.clone())
            .unwrap_or_default()
    }

    /// Documents currently stored for `owner`, decoded as items.
    #[must_use]
    pub fn items(&self, owner: &OwnerKey) -> Vec<Item> {
        self.documents(owner).iter().map(Item::from_document).collect()
    }

    /// Number of open subscriptions on `owner`'s collection.
    #[must_use]
    pub fn subscriber_count(&self, owner: &OwnerKey) -> usize {
        self.lock()
            .get(owner)
            .map_or(0, |collection| collection.changes.receiver_count())
    }

    /// Number of documents across all owners.
    #[must_use]
    pub fn total_documents(&self) -> usize {
        self.lock().values().map(|collection| collection.documents.len()).sum()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<OwnerKey, OwnerCollection>> {
        self.owners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> Result<(), RemoteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl RemoteCollection for InMemoryCollection {
    fn subscribe(&self, owner: &OwnerKey) -> SnapshotStream {
        let (snapshot, mut changes) = {
            let mut owners = self.lock();
            let collection = owners.entry(owner.clone()).or_insert_with(OwnerCollection::new);
            (collection.documents.clone(), collection.changes.subscribe())
        };
        let owner = owner.clone();

        Box::pin(async_stream::stream! {
            yield Ok(snapshot);

            loop {
                match changes.recv().await {
                    Ok(delivery) => yield delivery,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(owner = %owner, skipped, "Subscriber lagged, skipping to newer snapshots");
                    },
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn create(
        &self,
        owner: &OwnerKey,
        fields: Fields,
    ) -> impl Future<Output = Result<ItemId, RemoteError>> + Send {
        let collections = self.clone();
        let owner = owner.clone();

        async move {
            collections.check_writable()?;
            Ok(collections.seed(&owner, fields))
        }
    }

    fn update(
        &self,
        owner: &OwnerKey,
        id: &ItemId,
        fields: Fields,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send {
        let collections = self.clone();
        let owner = owner.clone();
        let id = id.clone();

        async move {
            collections.check_writable()?;

            let mut owners = collections.lock();
            let collection = owners
                .get_mut(&owner)
                .ok_or_else(|| RemoteError::NotFound(id.clone()))?;
            let document = collection
                .documents
                .iter_mut()
                .find(|document| document.id == id)
                .ok_or_else(|| RemoteError::NotFound(id.clone()))?;

            document.fields.extend(fields);
            collection.publish();
            Ok(())
        }
    }

    fn delete(
        &self,
        owner: &OwnerKey,
        id: &ItemId,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send {
        let collections = self.clone();
        let owner = owner.clone();
        let id = id.clone();

        async move {
            collections.check_writable()?;

            let mut owners = collections.lock();
            if let Some(collection) = owners.get_mut(&owner) {
                let before = collection.documents.len();
                collection.documents.retain(|document| document.id != id);
                if collection.documents.len() != before {
                    collection.publish();
                }
            }
            Ok(())
        }
    }
}
