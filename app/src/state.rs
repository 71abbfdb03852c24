//! Application state.

use crate::types::{Identity, Item, ItemId, OwnerKey};

/// Where the session gate is.
///
/// `Unauthenticated → SigningIn → Authenticated`, with `Terminated` as the
/// end state when sign-in does not complete.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing checked yet.
    #[default]
    Unauthenticated,
    /// The external sign-in flow is running.
    SigningIn,
    /// Signed in; the identity scopes the visible collection.
    Authenticated {
        /// The signed-in identity.
        identity: Identity,
    },
    /// Sign-in was cancelled or failed.
    Terminated,
}

impl SessionPhase {
    /// The signed-in identity, if authenticated.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated { identity } => Some(identity),
            _ => None,
        }
    }

    /// Owner key of the active session, if authenticated.
    #[must_use]
    pub fn owner_key(&self) -> Option<OwnerKey> {
        self.identity().map(Identity::owner_key)
    }

    /// Whether the application has terminated.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

/// State observed by the renderer.
///
/// `items` mirrors the remote collection as of the last delivered
/// snapshot; it is never edited locally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// Session gate phase.
    pub phase: SessionPhase,
    /// Last delivered snapshot, in collection order.
    pub items: Vec<Item>,
}

impl AppState {
    /// Returns an item of the last snapshot by id.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Returns the number of items.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of done items.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.done).count()
    }
}
