//! Static analysis of a variable set.
//!
//! [`DependencyGraph`] answers the questions a session needs before it can
//! run: is the set acyclic, and in what order must variables load so that
//! every dependency is populated before the variables that reference it.

pub mod dependency_graph;

pub use dependency_graph::DependencyGraph;
