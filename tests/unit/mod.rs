//! Unit tests of the resolution building blocks through the public API
//!
//! ```bash
//! cargo test --test unit
//! ```
//!
//! - **templating**: reference extraction and cache keys
//! - **selection**: option reconciliation, cascade defaults, and the commit gate

mod selection;
mod templating;
