//! Dashboard snapshot files read by the CLI.
//!
//! A snapshot is a TOML file holding the variable definitions of one
//! dashboard, optionally with current selections, plus the canned query
//! responses the fixture executor answers with:
//!
//! ```toml
//! [[variables]]
//! name = "region"
//! type = "custom"
//! custom_values = "eu, us"
//!
//! [[variables]]
//! name = "host"
//! type = "query"
//! query_template = "hosts({{.region}})"
//!
//! [fixtures]
//! "hosts(eu)" = ["h1", "h2"]
//! "hosts(us)" = { values = ["h3"], delay_ms = 20 }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::core::DashvarError;
use crate::executor::{FixtureExecutor, FixtureResponse};
use crate::variable::VariableSet;

#[derive(Debug, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub variables: VariableSet,

    #[serde(default)]
    pub fixtures: BTreeMap<String, FixtureResponse>,
}

impl DashboardSnapshot {
    /// Reads and parses a snapshot file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, or with
    /// [`DashvarError::SnapshotParseError`] if it is not a valid snapshot.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot = Self::parse(&content).map_err(|e| match e {
            DashvarError::TomlError(e) => DashvarError::SnapshotParseError {
                file: path.display().to_string(),
                reason: e.message().to_string(),
            },
            other => other,
        })?;
        debug!(
            variables = snapshot.variables.len(),
            fixtures = snapshot.fixtures.len(),
            "Loaded snapshot from {}",
            path.display()
        );
        Ok(snapshot)
    }

    /// Parses snapshot text.
    ///
    /// # Errors
    ///
    /// Returns [`DashvarError::TomlError`] for malformed TOML or invalid
    /// variable definitions.
    pub fn parse(content: &str) -> Result<Self, DashvarError> {
        Ok(toml::from_str(content)?)
    }

    /// Executor answering from this snapshot's fixtures.
    pub fn executor(&self) -> FixtureExecutor {
        FixtureExecutor::new(self.fixtures.clone())
    }
}
