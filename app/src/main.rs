//! Demo binary
//!
//! Runs a scripted session against the in-memory backend: sign in, add and
//! toggle a few items, sign out into a second account, then tear down.

use anyhow::{Context, bail};
use std::time::Duration;
use todosync::mocks::{InMemoryCollection, ScriptedIdentityProvider};
use todosync::{AppConfig, Identity, Row, RowEvent, TodoApp, TodoEnvironment};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const STEP_TIMEOUT: Duration = Duration::from_secs(2);

fn print_rows(rows: &[Row]) {
    if rows.is_empty() {
        println!("  (empty)");
    }
    for row in rows {
        let mark = if row.struck_through { "x" } else { " " };
        println!("  [{mark}] {}", row.text);
    }
}

async fn next_rows(app: &mut TodoApp<ScriptedIdentityProvider, InMemoryCollection>) -> anyhow::Result<Vec<Row>> {
    tokio::time::timeout(STEP_TIMEOUT, app.next_rows())
        .await
        .context("list did not update in time")?
        .context("observation channel closed")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todosync=info,todosync_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== todosync: scripted session ===\n");

    let identity = ScriptedIdentityProvider::new()
        .then_sign_in_as(Identity::new("ada", "ada@example.com"))
        .then_sign_in_as(Identity::new("grace", "grace@example.com"));
    let collection = InMemoryCollection::new();
    let env = TodoEnvironment::new(identity, collection.clone());

    let mut app = TodoApp::launch(env, AppConfig::default().with_ready_timeout(STEP_TIMEOUT)).await?;
    let user = app.wait_until_ready().await?;
    println!("Signed in as {}", user.email);

    for text in ["buy milk", "walk the dog"] {
        println!("\n>>> add {text:?}");
        app.add(text).await?;
        print_rows(&next_rows(&mut app).await?);
    }

    let Some(first) = app.rows().first().map(|row| row.id.clone()) else {
        bail!("added items never showed up");
    };

    println!("\n>>> tap first row");
    app.dispatch(RowEvent::Tapped(first.clone())).await?;
    print_rows(&next_rows(&mut app).await?);

    println!("\n>>> delete first row");
    app.dispatch(RowEvent::DeleteTapped(first)).await?;
    print_rows(&next_rows(&mut app).await?);

    println!("\n>>> sign out");
    app.sign_out().await?;
    print_rows(&next_rows(&mut app).await?);
    let user = app.wait_until_ready().await?;
    println!("Signed in as {}", user.email);

    println!("\n{} document(s) stored across all users", collection.total_documents());

    app.teardown().await?;
    println!("\n=== Session complete ===");
    Ok(())
}
