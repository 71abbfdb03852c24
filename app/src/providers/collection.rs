//! Remote document collection trait.

use crate::error::RemoteError;
use crate::types::{Document, Fields, ItemId, OwnerKey};
use futures::stream::BoxStream;
use std::future::Future;

/// Stream of full collection snapshots.
///
/// Each `Ok` item is the complete document list as of one change. Dropping
/// the stream ends the subscription.
pub type SnapshotStream = BoxStream<'static, Result<Vec<Document>, RemoteError>>;

/// Remote collection of documents, one collection per owner key.
///
/// Writes are acknowledged by the returned future only; the change itself
/// reaches readers through [`RemoteCollection::subscribe`].
pub trait RemoteCollection: Send + Sync {
    /// Open a standing subscription to the owner's collection.
    ///
    /// The first item is the current snapshot; every later item follows a
    /// change. Errors are delivered in-band and do not end the stream.
    fn subscribe(&self, owner: &OwnerKey) -> SnapshotStream;

    /// Create a document, returning the id the collection assigned.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the write is not accepted.
    fn create(
        &self,
        owner: &OwnerKey,
        fields: Fields,
    ) -> impl Future<Output = Result<ItemId, RemoteError>> + Send;

    /// Merge `fields` into an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::NotFound`] if the document does not exist, or
    /// another [`RemoteError`] if the write is not accepted.
    fn update(
        &self,
        owner: &OwnerKey,
        id: &ItemId,
        fields: Fields,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Delete a document. Deleting a missing document succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the write is not accepted.
    fn delete(
        &self,
        owner: &OwnerKey,
        id: &ItemId,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
