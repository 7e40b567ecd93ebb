//! The query executor seam.
//!
//! The resolver never talks to a data source itself. It hands a query
//! template plus the current variable set to a [`QueryExecutor`] and gets back
//! either raw option values or an [`ExecutionFailure`]. [`FixtureExecutor`] is
//! a table-driven implementation used by the CLI and the tests.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::constants::SYNTAX_ERROR_MARKER;
use crate::templating::render_template;
use crate::variable::VariableSet;

/// A failed query execution, as reported by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExecutionFailure {
    pub message: String,
}

impl ExecutionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// True for the syntax-error class, usually caused by a dependency that has
    /// no selection yet.
    pub fn is_syntax_error(&self) -> bool {
        self.message.to_lowercase().contains(SYNTAX_ERROR_MARKER)
    }

    /// The message shown to the user: verbatim, except that syntax errors are
    /// replaced by `guidance`.
    pub fn user_message(&self, guidance: &str) -> String {
        if self.is_syntax_error() {
            guidance.to_string()
        } else {
            self.message.clone()
        }
    }
}

/// Executes a variable's query template.
///
/// `bindings` holds the current selections of every variable, not only the
/// ones the template references; implementations may ignore the rest. The
/// returned values are raw JSON scalars in the order the source produced them.
pub trait QueryExecutor {
    fn execute(
        &self,
        template: &str,
        bindings: &VariableSet,
    ) -> impl Future<Output = Result<Vec<JsonValue>, ExecutionFailure>>;
}

/// A canned response for one rendered query.
///
/// In a snapshot file either a bare list of values or a table:
///
/// ```toml
/// [fixtures]
/// "hosts(eu)" = ["h1", "h2"]
/// "hosts(us)" = { values = ["h3"], delay_ms = 50 }
/// "broken" = { error = "Syntax error: unexpected end of input" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixtureResponse {
    Values(Vec<JsonValue>),
    Detailed {
        #[serde(default)]
        values: Vec<JsonValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        /// Simulated latency
        #[serde(default)]
        delay_ms: u64,
    },
}

/// Executor answering from a fixed table keyed by rendered query text.
///
/// The template is rendered against the bindings first, so
/// `hosts({{.region}})` with `region = eu` looks up `hosts(eu)`. The raw
/// template is tried when the rendered text has no entry. Every executed
/// query is recorded for inspection.
#[derive(Debug, Default)]
pub struct FixtureExecutor {
    responses: BTreeMap<String, FixtureResponse>,
    calls: Mutex<Vec<String>>,
}

impl FixtureExecutor {
    pub fn new(responses: BTreeMap<String, FixtureResponse>) -> Self {
        Self {
            responses,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Adds or replaces the values answered for `query`.
    #[must_use]
    pub fn with_values<I, V>(mut self, query: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<JsonValue>,
    {
        self.responses.insert(
            query.into(),
            FixtureResponse::Values(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Adds a response with simulated latency.
    #[must_use]
    pub fn with_delayed_values<I, V>(
        mut self,
        query: impl Into<String>,
        values: I,
        delay: Duration,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<JsonValue>,
    {
        self.responses.insert(
            query.into(),
            FixtureResponse::Detailed {
                values: values.into_iter().map(Into::into).collect(),
                error: None,
                delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            },
        );
        self
    }

    /// Adds a failing response.
    #[must_use]
    pub fn with_error(mut self, query: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses.insert(
            query.into(),
            FixtureResponse::Detailed {
                values: Vec::new(),
                error: Some(message.into()),
                delay_ms: 0,
            },
        );
        self
    }

    /// Rendered queries executed so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, query: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(query.to_string());
        }
    }
}

impl QueryExecutor for FixtureExecutor {
    async fn execute(
        &self,
        template: &str,
        bindings: &VariableSet,
    ) -> Result<Vec<JsonValue>, ExecutionFailure> {
        let rendered = render_template(template, bindings);
        self.record(&rendered);
        debug!(query = %rendered, "Executing fixture query");

        let response = self
            .responses
            .get(&rendered)
            .or_else(|| self.responses.get(template))
            .ok_or_else(|| ExecutionFailure::new(format!("no fixture for query '{rendered}'")))?;

        match response {
            FixtureResponse::Values(values) => Ok(values.clone()),
            FixtureResponse::Detailed {
                values,
                error,
                delay_ms,
            } => {
                if *delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                }
                match error {
                    Some(message) => Err(ExecutionFailure::new(message.clone())),
                    None => Ok(values.clone()),
                }
            }
        }
    }
}
