//! Shared helpers for the application integration tests

#![allow(dead_code, clippy::expect_used, clippy::panic)]

use std::time::Duration;
use todosync::mocks::{InMemoryCollection, ScriptedIdentityProvider};
use todosync::{AppConfig, AppState, Identity, OwnerKey, Row, TodoApp, TodoEnvironment};

pub type App = TodoApp<ScriptedIdentityProvider, InMemoryCollection>;

pub const STEP: Duration = Duration::from_secs(2);

pub fn ada() -> Identity {
    Identity::new("ada", "ada@example.com")
}

pub fn grace() -> Identity {
    Identity::new("grace", "grace@example.com")
}

pub fn config() -> AppConfig {
    AppConfig::default()
        .with_ready_timeout(STEP)
        .with_teardown_timeout(STEP)
}

pub async fn launch(identity: ScriptedIdentityProvider, collection: InMemoryCollection) -> App {
    todosync_testing::init_test_tracing();
    TodoApp::launch(TodoEnvironment::new(identity, collection), config())
        .await
        .expect("launch")
}

/// An app signed in as ada, with the first snapshot already delivered
pub async fn signed_in(collection: &InMemoryCollection) -> App {
    let app = launch(ScriptedIdentityProvider::signed_in(ada()), collection.clone()).await;
    let owner = ada().owner_key();
    eventually(|| collection.subscriber_count(&owner) == 1).await;
    converged(&app, collection, &owner).await;
    app
}

/// Waits until the app shows exactly what the collection holds for `owner`
pub async fn converged(app: &App, collection: &InMemoryCollection, owner: &OwnerKey) -> AppState {
    let expected = collection.items(owner);
    app.wait_for(|state| state.items == expected, STEP)
        .await
        .expect("items converge to the collection")
}

pub async fn next_rows(app: &mut App) -> Vec<Row> {
    tokio::time::timeout(STEP, app.next_rows())
        .await
        .expect("rows change in time")
        .expect("observation channel open")
}

/// Polls `condition` until it holds
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + STEP;
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Gives in-flight deliveries a chance to land
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
