//! Show load order and dependency trees of a dashboard snapshot.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::PathBuf;

use super::snapshot::DashboardSnapshot;
use crate::resolver::DependencyGraph;
use crate::variable::VariableSet;

/// Print the order variables load in and what each one references.
#[derive(Args, Debug)]
pub struct DepsCommand {
    /// Dashboard snapshot file
    file: PathBuf,

    /// Only show the tree below this variable
    #[arg(long)]
    variable: Option<String>,
}

impl DepsCommand {
    pub async fn execute(self) -> Result<()> {
        let snapshot = DashboardSnapshot::load(&self.file).await?;
        print!("{}", render(&snapshot.variables, self.variable.as_deref())?);
        Ok(())
    }
}

fn render(variables: &VariableSet, only: Option<&str>) -> Result<String> {
    let graph = DependencyGraph::from_variables(variables);
    let order = graph.load_order()?;
    let mut out = String::new();

    writeln!(out, "{}", "Load order:".cyan().bold())?;
    for (i, name) in order.iter().enumerate() {
        let kind = variables.get(name).map_or("", |variable| variable.kind.label());
        writeln!(out, "  {}. {name} ({kind})", i + 1)?;
    }

    let roots = match only {
        Some(name) => vec![variables.require(name)?.name.clone()],
        None => graph.roots(),
    };
    writeln!(out)?;
    writeln!(out, "{}", "Dependency tree:".cyan().bold())?;
    for root in roots {
        out.push_str(&graph.to_tree_string(&root));
    }

    for (name, missing) in graph.unresolved() {
        writeln!(
            out,
            "{} '{name}' references undeclared {}",
            "warning:".yellow().bold(),
            missing.join(", ")
        )?;
    }
    Ok(out)
}
