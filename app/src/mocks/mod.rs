//! In-process implementations of the provider traits.
//!
//! Used by the demo binary and the tests. Both are cheap to clone; clones
//! share state, so a test can keep a handle and inspect what the application
//! did.

pub mod collection;
pub mod identity;

pub use collection::InMemoryCollection;
pub use identity::ScriptedIdentityProvider;
