//! What a session exposes about each variable.

use serde::Serialize;

use crate::options::OptionSet;
use crate::templating::QueryCacheKey;
use crate::variable::SelectedValue;

/// Transient per-variable state owned by the session.
#[derive(Debug, Default)]
pub(crate) struct VariableState {
    pub options: OptionSet,
    pub loading: bool,
    pub error_message: Option<String>,
    /// Key of the most recent request; completions for any other key are stale
    pub current_key: Option<QueryCacheKey>,
    /// Upstream variable whose commit is waiting for this variable's next options
    pub cascade_trigger: Option<String>,
}

/// Read-only snapshot of one variable, as a presentation layer would render it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableView {
    pub name: String,
    pub kind: &'static str,
    pub option_set: OptionSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_value: Option<SelectedValue>,
    pub all_selected: bool,
    pub show_all_option: bool,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// A dependency is loading or has nothing selected yet
    pub is_locked: bool,
}

impl VariableView {
    /// Selection rendered the way templates see it.
    pub fn selected_value_string(&self) -> String {
        self.selected_value.as_ref().map(ToString::to_string).unwrap_or_default()
    }
}

/// A selection committed to the variable set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableChange {
    pub name: String,
    pub selected_value: Option<SelectedValue>,
    pub all_selected: bool,
}
