//! Print the cache key of every query variable in a snapshot.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::snapshot::DashboardSnapshot;
use crate::config::ResolverConfig;
use crate::templating::build_key;
use crate::variable::VariableSet;

/// Show the cache keys queries would run under with the snapshot's selections.
#[derive(Args, Debug)]
pub struct KeysCommand {
    /// Dashboard snapshot file
    file: PathBuf,
}

impl KeysCommand {
    pub async fn execute(self, config: &ResolverConfig) -> Result<()> {
        let snapshot = DashboardSnapshot::load(&self.file).await?;
        for line in render(&snapshot.variables, &config.cache_namespace) {
            println!("{line}");
        }
        Ok(())
    }
}

fn render(variables: &VariableSet, namespace: &str) -> Vec<String> {
    variables
        .iter()
        .filter_map(|variable| build_key(namespace, variable, variables))
        .map(|key| format!("{}\t{key}", key.variable_name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::{SelectedValue, Variable};

    #[test]
    fn test_keys_for_queries_only() {
        let variables = VariableSet::from_variables([
            Variable::custom("region", "eu, us").with_selection(SelectedValue::single("eu")),
            Variable::query("host", "hosts({{.region}})"),
            Variable::textbox("search"),
        ])
        .unwrap();

        assert_eq!(render(&variables, "ns"), vec!["host\tns/host/regioneu"]);
    }
}
