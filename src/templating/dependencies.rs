//! Variable references inside query templates.
//!
//! A reference is written `{{.name}}`. Whitespace is allowed between the
//! braces and the name (`{{ .name }}`), and a name is any run of characters
//! that are neither whitespace nor braces.

use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::variable::VariableSet;

static VARIABLE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*\.([^\s{}]+)\s*\}\}").expect("variable reference pattern is valid")
});

/// Returns the names referenced by `template`.
///
/// Names appear in first-occurrence order with duplicates removed. An empty
/// template, or one without references, yields an empty list.
///
/// # Examples
///
/// ```
/// use dashvars::templating::extract_dependencies;
///
/// assert_eq!(extract_dependencies("{{ .a }}{{.a}}"), vec!["a"]);
/// assert_eq!(
///     extract_dependencies("SELECT x WHERE env = '{{.env}}' AND r IN ({{ .region }})"),
///     vec!["env", "region"],
/// );
/// assert!(extract_dependencies("").is_empty());
/// ```
pub fn extract_dependencies(template: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    VARIABLE_REFERENCE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Substitutes every reference with the current selection of that variable.
///
/// Multi selections render comma-joined; references to unknown or unset
/// variables render as the empty string. Used by fixture executors that
/// look queries up by their rendered text.
pub fn render_template(template: &str, bindings: &VariableSet) -> String {
    VARIABLE_REFERENCE
        .replace_all(template, |caps: &Captures<'_>| bindings.selected_value_string(&caps[1]))
        .into_owned()
}
