//! External collaborators.
//!
//! The reducers depend on these traits only; the identity provider and the
//! document collection are supplied through [`TodoEnvironment`](crate::TodoEnvironment).
//! In-process implementations live in [`mocks`](crate::mocks).

pub mod collection;
pub mod identity;

pub use collection::{RemoteCollection, SnapshotStream};
pub use identity::IdentityProvider;
