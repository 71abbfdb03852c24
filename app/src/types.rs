//! Domain types for the to-do list.
//!
//! Items live remotely as schemaless documents in a per-user collection.
//! This module holds the typed view of those documents ([`Item`]), the
//! identifiers involved and the wire field names.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Field holding the item text in a remote document
pub const TEXT_FIELD: &str = "text";

/// Field holding the completion flag in a remote document
pub const DONE_FIELD: &str = "isDone";

/// Field map of a remote document
pub type Fields = serde_json::Map<String, Value>;

/// Identifier of a to-do item, assigned by the remote collection on creation
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Wraps an id handed out by a collection
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random id
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a signed-in user
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wraps a user id from the identity provider
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key scoping which remote collection a session reads and writes
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerKey(String);

impl OwnerKey {
    /// Wraps an owner key
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated identity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id
    pub uid: UserId,
    /// Email address the user signed in with
    pub email: String,
}

impl Identity {
    /// Creates an identity
    #[must_use]
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: UserId::new(uid),
            email: email.into(),
        }
    }

    /// Each user owns exactly one collection, keyed by their uid
    #[must_use]
    pub fn owner_key(&self) -> OwnerKey {
        OwnerKey::new(self.uid.as_str())
    }
}

/// A document as stored in and delivered by a remote collection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id
    pub id: ItemId,
    /// Document fields
    pub fields: Fields,
}

impl Document {
    /// Creates a document
    #[must_use]
    pub const fn new(id: ItemId, fields: Fields) -> Self {
        Self { id, fields }
    }
}

/// A single to-do item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Identifier assigned by the collection
    pub id: ItemId,
    /// Item text
    pub text: String,
    /// Whether the item is done
    pub done: bool,
}

impl Item {
    /// Decodes an item from a document
    ///
    /// Missing or mistyped fields fall back to an empty text and `done = false`.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let text = document
            .fields
            .get(TEXT_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let done = document
            .fields
            .get(DONE_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self {
            id: document.id.clone(),
            text,
            done,
        }
    }
}

impl From<&Document> for Item {
    fn from(document: &Document) -> Self {
        Self::from_document(document)
    }
}

/// Payload of a create: a new, not yet done item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewItem {
    /// Item text, sent as typed
    pub text: String,
}

impl NewItem {
    /// Creates the payload
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Document fields for the create
    #[must_use]
    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(TEXT_FIELD.to_string(), Value::String(self.text));
        fields.insert(DONE_FIELD.to_string(), Value::Bool(false));
        fields
    }
}

/// Fields of an update setting the completion flag
#[must_use]
pub fn done_patch(done: bool) -> Fields {
    let mut fields = Fields::new();
    fields.insert(DONE_FIELD.to_string(), Value::Bool(done));
    fields
}
