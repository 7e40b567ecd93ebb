//! Integration test suite for dashvars
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **cli**: the `dashvars` binary against snapshot files
//! - **session_flow**: multi-step sessions through the library API

mod cli;
mod session_flow;
