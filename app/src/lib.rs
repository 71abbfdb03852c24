//! # todosync
//!
//! A per-user to-do list core built on the todosync reducer architecture.
//!
//! A user signs in through an [`IdentityProvider`], then creates, toggles
//! and deletes items stored in a per-user [`RemoteCollection`]. A standing
//! subscription on that collection feeds the observable [`AppState`], and
//! the [`ListRenderer`] turns it into rows.
//!
//! Local mutations never touch the observed items directly:
//!
//! ```text
//! RowEvent ─▶ AppAction ─▶ remote write ─▶ subscription ─▶ SnapshotReceived ─▶ rows
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use todosync::mocks::{InMemoryCollection, ScriptedIdentityProvider};
//! use todosync::{AppConfig, Identity, TodoApp, TodoEnvironment};
//!
//! # async fn demo() -> todosync::Result<()> {
//! let identity = ScriptedIdentityProvider::new()
//!     .then_sign_in_as(Identity::new("ada", "ada@example.com"));
//! let env = TodoEnvironment::new(identity, InMemoryCollection::new());
//!
//! let mut app = TodoApp::launch(env, AppConfig::default()).await?;
//! app.wait_until_ready().await?;
//!
//! app.add("buy milk").await?;
//! let rows = app.next_rows().await?;
//! assert_eq!(rows[0].text, "buy milk");
//!
//! app.teardown().await
//! # }
//! ```

pub mod actions;
pub mod app;
pub mod config;
pub mod environment;
pub mod error;
pub mod list;
pub mod mocks;
pub mod providers;
pub mod render;
pub mod session;
pub mod state;
pub mod types;

pub use actions::AppAction;
pub use app::{TodoApp, TodoReducer, TodoStore, todo_reducer};
pub use config::AppConfig;
pub use environment::TodoEnvironment;
pub use error::{AppError, RemoteError, Result, SignInError};
pub use list::{ListReducer, SUBSCRIPTION};
pub use providers::{IdentityProvider, RemoteCollection, SnapshotStream};
pub use render::{ListRenderer, Row, RowEvent, render};
pub use session::SessionReducer;
pub use state::{AppState, SessionPhase};
pub use types::{Document, Fields, Identity, Item, ItemId, NewItem, OwnerKey, UserId};
