//! Default reselection when an upstream variable changes.
//!
//! A refreshed option list alone never overrides a selection. A query variable
//! is reselected only when its own template references the variable whose
//! commit caused the refresh. The session tracks that trigger per dependent,
//! so sibling dependents cascade independently of each other. A variable two hops away is reselected
//! later, when its direct dependency commits its own new selection, so a
//! cascade advances one hop per propagation step and stops as soon as a hop
//! leaves its selection unchanged.

use tracing::debug;

use crate::commit::CommittedSelection;
use crate::variable::{Scalar, SelectedValue, Variable};

/// Decides whether `variable` takes a new default after its options changed.
///
/// Returns `None` unless `variable` is a query variable that directly
/// references `last_updated`. When triggered, a multi-select variable selects
/// every option with `all_selected`, a single-select variable the first option.
pub fn on_option_set_changed(
    variable: &Variable,
    new_options: &[Scalar],
    last_updated: Option<&str>,
) -> Option<CommittedSelection> {
    let last_updated = last_updated?;
    if !variable.is_query() || !variable.depends_on(last_updated) {
        return None;
    }

    debug!(
        variable = %variable.name,
        trigger = last_updated,
        options = new_options.len(),
        "Cascading default selection"
    );
    Some(default_selection(variable, new_options))
}

/// Default for a variable that has never been given a selection.
///
/// Existing selections are left alone, and an empty option list has nothing
/// to select.
pub fn initial_selection(variable: &Variable, options: &[Scalar]) -> Option<CommittedSelection> {
    if !variable.produces_options() || variable.has_selection() || options.is_empty() {
        return None;
    }
    Some(default_selection(variable, options))
}

/// The selection a cascade assigns for `options`.
///
/// No options clears the selection.
pub fn default_selection(variable: &Variable, options: &[Scalar]) -> CommittedSelection {
    match options.first() {
        None => CommittedSelection::cleared(),
        Some(_) if variable.multi_select => CommittedSelection {
            selected_value: Some(SelectedValue::Multi(options.to_vec())),
            all_selected: true,
        },
        Some(first) => CommittedSelection {
            selected_value: Some(SelectedValue::Single(first.clone())),
            all_selected: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<Scalar> {
        vec![Scalar::from("r1"), Scalar::from("r2")]
    }

    #[test]
    fn test_single_select_takes_first_option() {
        let y = Variable::query("Y", "{{.X}}");
        let selection = on_option_set_changed(&y, &options(), Some("X")).unwrap();
        assert_eq!(selection.selected_value, Some(SelectedValue::single("r1")));
        assert!(!selection.all_selected);
    }

    #[test]
    fn test_multi_select_takes_everything() {
        let y = Variable::query("Y", "{{.X}}").with_multi_select(true);
        let selection = on_option_set_changed(&y, &options(), Some("X")).unwrap();
        assert_eq!(selection.selected_value, Some(SelectedValue::multi(["r1", "r2"])));
        assert!(selection.all_selected);
    }

    #[test]
    fn test_containment_for_indirect_dependents() {
        let z = Variable::query("Z", "{{.Y}}").with_selection(SelectedValue::single("manual"));
        assert!(on_option_set_changed(&z, &options(), Some("X")).is_none());
        assert!(on_option_set_changed(&z, &options(), Some("Y")).is_some());
    }

    #[test]
    fn test_no_trigger_without_last_update_or_for_non_queries() {
        let y = Variable::query("Y", "{{.X}}");
        assert!(on_option_set_changed(&y, &options(), None).is_none());

        let custom = Variable::custom("C", "{{.X}}");
        assert!(on_option_set_changed(&custom, &options(), Some("X")).is_none());
    }

    #[test]
    fn test_empty_options_clear_selection() {
        let y = Variable::query("Y", "{{.X}}").with_selection(SelectedValue::single("old"));
        let selection = on_option_set_changed(&y, &[], Some("X")).unwrap();
        assert_eq!(selection, CommittedSelection::cleared());
    }

    #[test]
    fn test_initial_selection_only_when_unset() {
        let fresh = Variable::custom("env", "a,b");
        assert_eq!(
            initial_selection(&fresh, &options()).unwrap().selected_value,
            Some(SelectedValue::single("r1"))
        );

        let chosen = fresh.clone().with_selection(SelectedValue::single("r2"));
        assert!(initial_selection(&chosen, &options()).is_none());
        assert!(initial_selection(&fresh, &[]).is_none());
        assert!(initial_selection(&Variable::textbox("t"), &options()).is_none());
    }
}
