//! Actions driving the session gate and the list store.

use crate::error::SignInError;
use crate::types::{Document, Identity, ItemId, OwnerKey};

/// Every input to the application reducer.
///
/// User intents come from the application context and the renderer; the
/// remaining variants are fed back by effects.
#[derive(Clone, Debug, PartialEq)]
pub enum AppAction {
    // ========== Session ==========
    /// The application started.
    Launched,

    /// Feedback: the external sign-in flow returned an identity.
    SignInSucceeded {
        /// The signed-in identity.
        identity: Identity,
    },

    /// Feedback: the external sign-in flow was cancelled or failed.
    SignInFailed {
        /// Why the flow ended.
        reason: SignInError,
    },

    /// The user asked to sign out.
    SignOutRequested,

    // ========== List ==========
    /// Create an item with this text.
    AddItem {
        /// Text as typed; not validated.
        text: String,
    },

    /// Flip the completion flag of an item.
    ToggleItem {
        /// Item to toggle.
        id: ItemId,
    },

    /// Delete an item.
    DeleteItem {
        /// Item to delete.
        id: ItemId,
    },

    /// Feedback: the subscription delivered a snapshot.
    SnapshotReceived {
        /// Collection the snapshot belongs to.
        owner: OwnerKey,
        /// Every document in the collection.
        documents: Vec<Document>,
    },
}
