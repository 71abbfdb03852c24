//! Integration tests for the reactive list store against the in-memory backend

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{STEP, ada, converged, eventually, launch, next_rows, settle, signed_in};
use todosync::mocks::{InMemoryCollection, ScriptedIdentityProvider};
use todosync::{AppError, ItemId, NewItem, RemoteError, RowEvent};
use todosync_runtime::StoreError;
use tokio_test::assert_ok;

#[tokio::test]
async fn add_toggle_delete_round_trip() {
    let collection = InMemoryCollection::new();
    let mut app = signed_in(&collection).await;

    assert_ok!(app.add("buy milk").await);
    let rows = next_rows(&mut app).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text, "buy milk");
    assert!(!rows[0].struck_through);

    let id = rows[0].id.clone();
    assert_ok!(app.dispatch(RowEvent::Tapped(id.clone())).await);
    let rows = next_rows(&mut app).await;
    assert!(rows[0].struck_through && rows[0].italic);

    assert_ok!(app.dispatch(RowEvent::Tapped(id.clone())).await);
    let rows = next_rows(&mut app).await;
    assert!(!rows[0].struck_through && !rows[0].italic);

    assert_ok!(app.dispatch(RowEvent::DeleteTapped(id)).await);
    assert!(next_rows(&mut app).await.is_empty());
    assert_eq!(collection.total_documents(), 0);
}

#[tokio::test]
async fn add_does_not_touch_items_until_the_echo() {
    let collection = InMemoryCollection::new();
    collection.set_fail_writes(true);
    let app = signed_in(&collection).await;

    let before = app.observe().borrow().clone();
    let mut handle = assert_ok!(app.add("buy milk").await);
    assert_ok!(handle.wait_with_timeout(STEP).await);
    settle().await;

    assert_eq!(app.observe().borrow().items, before.items);
    assert_eq!(collection.total_documents(), 0);
}

#[tokio::test]
async fn empty_text_is_sent_as_is() {
    let collection = InMemoryCollection::new();
    let app = signed_in(&collection).await;

    assert_ok!(app.add("").await);
    let state = assert_ok!(app.wait_for(|state| state.count() == 1, STEP).await);

    assert_eq!(state.items[0].text, "");
    assert!(!state.items[0].done);
}

#[tokio::test]
async fn items_mirror_remote_changes() {
    let collection = InMemoryCollection::new();
    let app = signed_in(&collection).await;
    let owner = ada().owner_key();

    collection.seed(&owner, NewItem::new("from another device").into_fields());
    let state = converged(&app, &collection, &owner).await;

    assert_eq!(state.count(), 1);
    assert_eq!(state.items[0].text, "from another device");
}

#[tokio::test]
async fn toggle_of_unknown_item_changes_nothing() {
    let collection = InMemoryCollection::new();
    let app = signed_in(&collection).await;

    let mut handle = assert_ok!(app.toggle(ItemId::new("missing")).await);
    assert_ok!(handle.wait_with_timeout(STEP).await);

    assert_eq!(handle.pending(), 0);
    assert_eq!(collection.total_documents(), 0);
}

#[tokio::test]
async fn subscription_errors_are_dropped() {
    let collection = InMemoryCollection::new();
    let owner = ada().owner_key();
    collection.seed(&owner, NewItem::new("first").into_fields());
    let app = signed_in(&collection).await;

    collection.emit_error(&owner, RemoteError::Unavailable("connection reset".to_string()));
    settle().await;
    assert_eq!(app.items().await.len(), 1);

    collection.seed(&owner, NewItem::new("second").into_fields());
    let state = converged(&app, &collection, &owner).await;
    assert_eq!(state.count(), 2);
    assert_eq!(collection.subscriber_count(&owner), 1);
}

#[tokio::test]
async fn failed_writes_are_not_surfaced() {
    let collection = InMemoryCollection::new();
    let owner = ada().owner_key();
    let id = collection.seed(&owner, NewItem::new("keep me").into_fields());
    let app = signed_in(&collection).await;

    collection.set_fail_writes(true);
    let mut toggled = assert_ok!(app.toggle(id.clone()).await);
    let mut deleted = assert_ok!(app.delete(id).await);
    assert_ok!(toggled.wait_with_timeout(STEP).await);
    assert_ok!(deleted.wait_with_timeout(STEP).await);
    settle().await;

    let items = app.items().await;
    assert_eq!(items.len(), 1);
    assert!(!items[0].done);
}

#[tokio::test]
async fn mutations_without_session_are_ignored() {
    let collection = InMemoryCollection::new();
    let id = collection.seed(&ada().owner_key(), NewItem::new("untouched").into_fields());
    let app = launch(ScriptedIdentityProvider::new(), collection.clone()).await;
    assert_eq!(app.wait_until_ready().await, Err(AppError::Terminated));

    assert_ok!(app.add("nobody").await);
    assert_ok!(app.toggle(id.clone()).await);
    assert_ok!(app.delete(id).await);
    settle().await;

    assert_eq!(collection.total_documents(), 1);
    assert!(!collection.items(&ada().owner_key())[0].done);
}

#[tokio::test]
async fn teardown_cancels_subscription_and_rejects_actions() {
    let collection = InMemoryCollection::new();
    let app = signed_in(&collection).await;
    let store = app.store().clone();

    assert_ok!(app.teardown().await);

    eventually(|| collection.subscriber_count(&ada().owner_key()) == 0).await;
    assert_eq!(
        store.send(todosync::AppAction::AddItem { text: "late".to_string() }).await.err(),
        Some(StoreError::ShutdownInProgress)
    );
    assert_eq!(store.pending_effects(), 0);
}

#[tokio::test]
async fn concurrent_adds_all_arrive() {
    let collection = InMemoryCollection::new();
    let app = signed_in(&collection).await;

    let adds = (0..10).map(|n| app.add(format!("item {n}")));
    for result in futures::future::join_all(adds).await {
        assert_ok!(result);
    }

    let state = assert_ok!(app.wait_for(|state| state.count() == 10, STEP).await);
    assert_eq!(state.completed_count(), 0);
}
