//! Configuration for the variable resolver.
//!
//! Settings live in a single optional TOML file. The location is, in order:
//!
//! 1. the `--config` command-line flag
//! 2. the `DASHVARS_CONFIG_PATH` environment variable
//! 3. `<platform config dir>/dashvars/config.toml`
//!
//! A missing file is not an error; every setting has a default.

mod resolver;

pub use resolver::ResolverConfig;
