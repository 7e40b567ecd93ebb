//! Global constants used throughout the dashvars codebase.
//!
//! This module contains the sentinel values, default timings, and user-facing
//! guidance text shared by the resolver, the commit gate, and the
//! configuration layer. Defining them centrally keeps the defaults in
//! [`ResolverConfig`](crate::config::ResolverConfig) and the tests in sync.

use std::time::Duration;

/// Sentinel value a presentation layer sends when the user picks "ALL".
///
/// The commit gate never stores this value; it is always expanded to the full
/// option set with `all_selected = true`.
pub const ALL_SELECTED_VALUE: &str = "__ALL__";

/// Default quiet period for textbox edits (300ms).
///
/// Only the value present when no further edit arrived within this window is
/// committed to the variable set.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default debounce window as a [`Duration`].
pub fn default_debounce() -> Duration {
    Duration::from_millis(DEFAULT_DEBOUNCE_MS)
}

/// First component of every query cache key.
pub const DEFAULT_CACHE_NAMESPACE: &str = "dashboard-variable";

/// Maximum number of successful query results kept in the result cache.
pub const DEFAULT_MAX_CACHED_RESULTS: usize = 256;

/// Replacement message for executor failures in the syntax-error class.
///
/// A query that references a dependency with no selection yet usually renders
/// into an invalid query, so the raw executor message is rarely useful.
pub const SYNTAX_ERROR_GUIDANCE: &str =
    "Please make sure the query is valid and dependent variables are selected";

/// Marker searched for (case-insensitively) in executor failure messages.
pub const SYNTAX_ERROR_MARKER: &str = "syntax error";

/// Environment variable that overrides the configuration file location.
pub const CONFIG_PATH_ENV: &str = "DASHVARS_CONFIG_PATH";
