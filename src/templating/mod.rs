//! Template analysis for dashboard variable queries.
//!
//! Query templates reference other variables as `{{.name}}`. This module
//! extracts those references ([`extract_dependencies`]), renders a template
//! against the current selections ([`render_template`]), and derives the
//! identity of a variable's effective query ([`build_key`]).

pub mod cache;
pub mod dependencies;

pub use cache::{QueryCache, QueryCacheKey, build_key};
pub use dependencies::{extract_dependencies, render_template};
