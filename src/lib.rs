//! dashvars - templated dashboard variables
//!
//! A dashboard exposes named variables. A variable gets its options from a
//! query template, a static comma-separated list, or free text. Query
//! templates reference other variables as `{{.name}}`, which makes the
//! variables of a dashboard a dependency graph: when an upstream selection
//! changes, downstream queries re-run and downstream selections may be reset
//! to a sensible default.
//!
//! # Architecture Overview
//!
//! The pure pieces are free functions over plain data:
//!
//! - [`templating::extract_dependencies`] finds the `{{.name}}` references
//! - [`templating::build_key`] derives the cache key of a query given the
//!   current selections of its dependencies
//! - [`options::reconcile`] decides whether a refreshed option list differs
//!   from the stored one
//! - [`cascade::on_option_set_changed`] decides whether a variable takes a new
//!   default selection
//! - [`commit::CommitGate`] normalizes picks and debounces textbox edits
//!
//! [`session::DashboardSession`] wires them together around a
//! [`executor::QueryExecutor`], owning the variable set and all transient
//! state on a single task.
//!
//! # Core Modules
//!
//! - [`variable`] - variable definitions, selections, and the variable set
//! - [`templating`] - dependency extraction, rendering, cache keys, result cache
//! - [`options`] - option sets, sorting, parsing, reconciliation
//! - [`cascade`] - default reselection policy
//! - [`commit`] - commit gate
//! - [`executor`] - executor seam and the fixture executor
//! - [`resolver`] - dependency graph and load order
//! - [`session`] - the session actor and its handle
//!
//! ## Supporting Modules
//!
//! - [`cli`] - command-line interface over dashboard snapshot files
//! - [`config`] - resolver configuration
//! - [`constants`] - sentinels and defaults
//! - [`core`] - error types and user-facing error formatting

pub mod cascade;
pub mod cli;
pub mod commit;
pub mod config;
pub mod constants;
pub mod core;
pub mod executor;
pub mod options;
pub mod resolver;
pub mod session;
pub mod templating;
pub mod variable;

// test_utils is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
