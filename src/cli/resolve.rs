//! Resolve a dashboard snapshot against its fixtures.
//!
//! Runs a full session: custom lists are parsed, every query is executed
//! through the snapshot's fixture table, and defaults cascade exactly as they
//! would in a live dashboard. Each `--select` is applied in order once the
//! previous one has fully propagated.
//!
//! ```bash
//! dashvars resolve dashboard.toml --select region=us --select host=__ALL__
//! dashvars resolve dashboard.toml --format json
//! ```

use anyhow::{Context, Result, anyhow};
use clap::Args;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::snapshot::DashboardSnapshot;
use crate::config::ResolverConfig;
use crate::session::{DashboardSession, VariableView};
use crate::variable::{SelectedValue, Variable, VariableKind};

/// Resolve every variable and print the resulting state.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Dashboard snapshot file
    file: PathBuf,

    /// Apply a selection, e.g. `region=eu`; multi-select values are comma separated
    #[arg(short, long = "select", value_name = "NAME=VALUE", value_parser = parse_selection)]
    selections: Vec<(String, String)>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,
}

impl ResolveCommand {
    pub async fn execute(self, config: ResolverConfig) -> Result<()> {
        self.validate_arguments()?;
        let snapshot = DashboardSnapshot::load(&self.file).await?;
        let executor = Arc::new(snapshot.executor());
        let (mut session, _handle) = DashboardSession::new(snapshot.variables, executor, config)?;

        session.run_until_idle().await;
        for (name, raw) in &self.selections {
            let variable = session.variables().require(name)?.clone();
            info!(variable = %name, value = %raw, "Applying selection");
            match variable.kind {
                VariableKind::Textbox => session.type_text(name, raw.clone())?,
                _ => session
                    .select(name, selection_value(&variable, raw))
                    .with_context(|| format!("Cannot select '{raw}' for '{name}'"))?,
            }
            session.run_until_idle().await;
        }

        let views = session.snapshot();
        if self.format == "json" {
            println!("{}", serde_json::to_string_pretty(&views)?);
        } else {
            print!("{}", render_text(&views)?);
        }
        Ok(())
    }

    fn validate_arguments(&self) -> Result<()> {
        match self.format.as_str() {
            "text" | "json" => Ok(()),
            _ => Err(anyhow!("Invalid format '{}'. Valid formats are: text, json", self.format)),
        }
    }
}

fn parse_selection(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

fn selection_value(variable: &Variable, raw: &str) -> SelectedValue {
    if variable.multi_select {
        SelectedValue::multi(raw.split(',').map(str::trim).filter(|value| !value.is_empty()))
    } else {
        SelectedValue::single(raw)
    }
}

fn render_text(views: &[VariableView]) -> Result<String> {
    let mut out = String::new();
    for view in views {
        let mut value = view.selected_value_string();
        if view.all_selected {
            value.push_str(" (all)");
        }
        writeln!(out, "{} [{}] = {value}", view.name.bold(), view.kind)?;

        if view.kind != "textbox" {
            let options: Vec<String> = view.option_set.iter().map(ToString::to_string).collect();
            writeln!(out, "  options: {}", options.join(", "))?;
        }
        if let Some(error) = &view.error_message {
            writeln!(out, "  {} {error}", "error:".red().bold())?;
        }
        if view.is_locked {
            writeln!(out, "  {}", "locked".yellow())?;
        }
    }
    Ok(out)
}
