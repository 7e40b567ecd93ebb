//! Dashboard variable definitions and the variable set they live in.
//!
//! A [`Variable`] is an immutable declaration plus its transient selection.
//! Its [`VariableKind`] carries the data that only makes sense for that kind:
//! a query template for [`VariableKind::Query`], a raw comma list for
//! [`VariableKind::Custom`], nothing for [`VariableKind::Textbox`]. A variable
//! therefore can never carry both a template and a custom list.
//!
//! # Snapshot format
//!
//! Variables deserialize from TOML or JSON with the kind as an internal `type`
//! tag:
//!
//! ```toml
//! [[variables]]
//! name = "region"
//! type = "custom"
//! custom_values = "eu, us, ap"
//!
//! [[variables]]
//! name = "host"
//! type = "query"
//! query_template = "SELECT host FROM hosts WHERE region = '{{.region}}'"
//! multi_select = true
//! sort_mode = "lexical"
//! ```

mod set;
mod value;

pub use set::VariableSet;
pub use value::{Scalar, SelectedValue};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::DashvarError;
use crate::options::SortMode;
use crate::templating::extract_dependencies;

/// How a variable obtains its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariableKind {
    /// Options come from executing a query template.
    Query {
        /// Template that may reference other variables as `{{.name}}`
        query_template: String,
    },
    /// Options come from a static comma-separated list.
    Custom {
        /// Raw list, e.g. `"eu, us, \"ap,south\""`
        custom_values: String,
    },
    /// Free text, no options.
    Textbox,
}

impl VariableKind {
    /// Short lowercase label used in logs and CLI output.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Query {
                ..
            } => "query",
            Self::Custom {
                ..
            } => "custom",
            Self::Textbox => "textbox",
        }
    }
}

/// A named, typed dashboard parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Opaque stable identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Name referenced by templates as `{{.name}}`
    pub name: String,

    /// Optional help text for the presentation layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Kind plus its kind-specific source
    #[serde(flatten)]
    pub kind: VariableKind,

    /// Current selection; `None` until something has been selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_value: Option<SelectedValue>,

    /// The implicit ALL wildcard is selected (multi-select only)
    #[serde(default)]
    pub all_selected: bool,

    #[serde(default)]
    pub multi_select: bool,

    #[serde(default)]
    pub show_all_option: bool,

    #[serde(default)]
    pub sort_mode: SortMode,
}

impl Variable {
    fn with_kind(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            kind,
            selected_value: None,
            all_selected: false,
            multi_select: false,
            show_all_option: false,
            sort_mode: SortMode::default(),
        }
    }

    /// Creates a query variable.
    pub fn query(name: impl Into<String>, query_template: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            VariableKind::Query {
                query_template: query_template.into(),
            },
        )
    }

    /// Creates a custom-list variable.
    pub fn custom(name: impl Into<String>, custom_values: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            VariableKind::Custom {
                custom_values: custom_values.into(),
            },
        )
    }

    /// Creates a free-text variable.
    pub fn textbox(name: impl Into<String>) -> Self {
        Self::with_kind(name, VariableKind::Textbox)
    }

    #[must_use]
    pub fn with_multi_select(mut self, multi_select: bool) -> Self {
        self.multi_select = multi_select;
        self
    }

    #[must_use]
    pub fn with_show_all_option(mut self, show_all_option: bool) -> Self {
        self.show_all_option = show_all_option;
        self
    }

    #[must_use]
    pub fn with_sort_mode(mut self, sort_mode: SortMode) -> Self {
        self.sort_mode = sort_mode;
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selected_value: SelectedValue) -> Self {
        self.selected_value = Some(selected_value);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The query template, for query variables only.
    pub fn query_template(&self) -> Option<&str> {
        match &self.kind {
            VariableKind::Query {
                query_template,
            } => Some(query_template),
            _ => None,
        }
    }

    /// True for kinds whose options are a list (query and custom).
    pub const fn produces_options(&self) -> bool {
        !matches!(self.kind, VariableKind::Textbox)
    }

    pub const fn is_query(&self) -> bool {
        matches!(self.kind, VariableKind::Query { .. })
    }

    /// Names referenced by this variable's template, in first-occurrence order.
    ///
    /// Only query variables have dependencies.
    pub fn dependencies(&self) -> Vec<String> {
        self.query_template().map(extract_dependencies).unwrap_or_default()
    }

    /// True if this variable's template references `name` directly.
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies().iter().any(|dep| dep == name)
    }

    /// True once a non-empty selection exists.
    pub fn has_selection(&self) -> bool {
        self.selected_value.as_ref().is_some_and(|value| !value.is_empty())
    }

    /// String form of the selection used for bindings and cache keys.
    ///
    /// An unset selection renders as the empty string.
    pub fn selected_value_string(&self) -> String {
        self.selected_value.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    /// Checks that the name can be referenced from a template.
    ///
    /// # Errors
    ///
    /// Returns [`DashvarError::InvalidVariableName`] for an empty name or a
    /// name containing whitespace or braces.
    pub fn validate(&self) -> Result<(), DashvarError> {
        let reason = if self.name.is_empty() {
            Some("name is empty")
        } else if self.name.chars().any(char::is_whitespace) {
            Some("name contains whitespace")
        } else if self.name.contains(['{', '}']) {
            Some("name contains braces")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DashvarError::InvalidVariableName {
                name: self.name.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_only_for_queries() {
        let query = Variable::query("host", "SELECT * WHERE r = {{.region}} AND e = {{ .env }}");
        assert_eq!(query.dependencies(), vec!["region", "env"]);
        assert!(query.depends_on("env"));
        assert!(!query.depends_on("host"));

        let custom = Variable::custom("region", "{{.env}}");
        assert!(custom.dependencies().is_empty());
    }

    #[test]
    fn test_validate_rejects_unreferenceable_names() {
        assert!(Variable::textbox("ok_name.1").validate().is_ok());

        for bad in ["", "has space", "br{ace", "tab\there"] {
            let err = Variable::textbox(bad).validate().unwrap_err();
            assert!(
                matches!(err, DashvarError::InvalidVariableName { .. }),
                "expected invalid name for {bad:?}"
            );
        }
    }

    #[test]
    fn test_selected_value_string() {
        let var = Variable::query("a", "q");
        assert_eq!(var.selected_value_string(), "");
        assert!(!var.has_selection());

        let var = var.with_selection(SelectedValue::multi(["x", "y"]));
        assert_eq!(var.selected_value_string(), "x,y");
        assert!(var.has_selection());

        let var = Variable::query("a", "q").with_selection(SelectedValue::Multi(vec![]));
        assert!(!var.has_selection());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let var: Variable = toml::from_str(
            r#"
name = "host"
type = "query"
query_template = "hosts({{.region}})"
multi_select = true
sort_mode = "numeric"
selected_value = ["a", "b"]
"#,
        )
        .unwrap();

        assert_eq!(var.query_template(), Some("hosts({{.region}})"));
        assert!(var.multi_select);
        assert_eq!(var.sort_mode, SortMode::Numeric);
        assert_eq!(var.selected_value, Some(SelectedValue::multi(["a", "b"])));
        assert!(!var.all_selected);
    }

    #[test]
    fn test_kind_label() {
        assert_eq!(Variable::textbox("t").kind.label(), "textbox");
        assert_eq!(Variable::custom("c", "a").kind.label(), "custom");
        assert_eq!(Variable::query("q", "").kind.label(), "query");
    }
}
