//! # todosync Testing
//!
//! Testing utilities and helpers for todosync.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then builder for reducers
//! - [`assertions`]: Helpers for inspecting returned effects
//! - [`init_test_tracing`]: Log output for tests, routed through the test harness
//!
//! ## Example
//!
//! ```ignore
//! use todosync_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(ListReducer)
//!     .with_env(test_environment())
//!     .given_state(AppState::default())
//!     .when_action(AppAction::AddItem { text: "buy milk".into() })
//!     .then_state(|state| assert!(state.items.is_empty()))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber for tests
///
/// Output goes through the test writer so it only shows for failing tests.
/// The filter comes from `RUST_LOG` and defaults to `debug`. Safe to call
/// from every test; only the first call installs anything.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));

        // Another subscriber may already be installed by the test binary
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
