//! Core types shared by every dashvars module.
//!
//! Currently this is the error system: [`DashvarError`] for structural
//! failures and [`ErrorContext`] for presenting them with suggestions.

pub mod error;

pub use error::{DashvarError, ErrorContext, user_friendly_error};
