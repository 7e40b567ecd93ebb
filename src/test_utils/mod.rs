//! Test utilities for dashvars
//!
//! Logging setup shared by unit and integration tests, plus sample dashboard
//! snapshots.

pub mod fixtures;

pub use fixtures::SnapshotFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `None`, logging is enabled only
/// when `RUST_LOG` is set:
///
/// ```bash
/// RUST_LOG=dashvars=debug cargo test session
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
