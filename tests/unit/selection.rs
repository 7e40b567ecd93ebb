use std::time::Duration;

use dashvars::cascade::{initial_selection, on_option_set_changed};
use dashvars::commit::{CommitAction, CommitGate, CommittedSelection, UserInput};
use dashvars::constants::ALL_SELECTED_VALUE;
use dashvars::core::DashvarError;
use dashvars::options::{Reconciliation, SortMode, parse_custom_list, reconcile};
use dashvars::variable::{Scalar, SelectedValue, Variable};

fn scalars(values: &[&str]) -> Vec<Scalar> {
    values.iter().map(|v| Scalar::from(*v)).collect()
}

#[test]
fn test_numeric_reorder_is_unchanged() {
    let new_raw = vec![Scalar::from(3_i64), Scalar::from(1_i64), Scalar::from(2_i64)];
    let previous = vec![Scalar::from(1_i64), Scalar::from(2_i64), Scalar::from(3_i64)];
    assert_eq!(reconcile(new_raw, &previous, SortMode::Numeric), Reconciliation::Unchanged);
}

#[test]
fn test_lexical_addition_is_changed() {
    let outcome = reconcile(scalars(&["b", "a"]), &scalars(&["a"]), SortMode::Lexical);
    assert_eq!(outcome, Reconciliation::Changed(scalars(&["a", "b"])));
}

#[test]
fn test_unsorted_order_difference_is_changed() {
    let outcome = reconcile(scalars(&["b", "a"]), &scalars(&["a", "b"]), SortMode::Disabled);
    assert!(outcome.is_changed());
}

#[test]
fn test_cascade_single_and_multi() {
    let options = scalars(&["r1", "r2"]);

    let single = Variable::query("Y", "ys({{.X}})");
    let selection = on_option_set_changed(&single, &options, Some("X")).unwrap();
    assert_eq!(selection.selected_value, Some(SelectedValue::single("r1")));
    assert!(!selection.all_selected);

    let multi = Variable::query("Y", "ys({{.X}})").with_multi_select(true);
    let selection = on_option_set_changed(&multi, &options, Some("X")).unwrap();
    assert_eq!(selection.selected_value, Some(SelectedValue::multi(["r1", "r2"])));
    assert!(selection.all_selected);
}

#[test]
fn test_cascade_is_contained_to_direct_dependents() {
    let z = Variable::query("Z", "zs({{.Y}})").with_selection(SelectedValue::single("z9"));
    let options = scalars(&["z1", "z2"]);

    assert!(on_option_set_changed(&z, &options, Some("X")).is_none());
    assert!(on_option_set_changed(&z, &options, None).is_none());
    assert_eq!(
        on_option_set_changed(&z, &options, Some("Y")).unwrap().selected_value,
        Some(SelectedValue::single("z1"))
    );
}

#[test]
fn test_initial_selection_only_when_unset() {
    let options = scalars(&["a", "b"]);
    let fresh = Variable::custom("c", "a, b");
    assert_eq!(
        initial_selection(&fresh, &options),
        Some(CommittedSelection {
            selected_value: Some(SelectedValue::single("a")),
            all_selected: false,
        })
    );

    let chosen = fresh.with_selection(SelectedValue::single("b"));
    assert!(initial_selection(&chosen, &options).is_none());
}

#[test]
fn test_all_sentinel_and_empty_multi_select_everything() {
    let gate = CommitGate::new(Duration::from_millis(300), ALL_SELECTED_VALUE);
    let options = scalars(&["a", "b", "c"]);
    let variable = Variable::query("v", "vs()").with_multi_select(true);

    for pick in [SelectedValue::multi([ALL_SELECTED_VALUE]), SelectedValue::Multi(Vec::new())] {
        let selection = gate.normalize_pick(&variable, pick, &options).unwrap();
        assert!(selection.all_selected);
        assert_eq!(selection.selected_value, Some(SelectedValue::Multi(options.clone())));
    }
}

#[test]
fn test_pick_outside_options_is_rejected() {
    let gate = CommitGate::new(Duration::from_millis(300), ALL_SELECTED_VALUE);
    let variable = Variable::custom("region", "eu, us");
    let err = gate
        .normalize_pick(&variable, SelectedValue::single("asia"), &scalars(&["eu", "us"]))
        .unwrap_err();
    assert!(matches!(err, DashvarError::SelectionNotInOptions { .. }));
}

#[test]
fn test_three_rapid_edits_settle_once() {
    let mut gate = CommitGate::new(Duration::from_millis(300), ALL_SELECTED_VALUE);
    let search = Variable::textbox("search");

    let mut generations = Vec::new();
    for text in ["w", "we", "web"] {
        match gate.commit(&search, UserInput::Text(text.to_string()), &[]).unwrap() {
            CommitAction::Deferred {
                generation,
            } => generations.push(generation),
            CommitAction::Immediate(_) => panic!("textbox edits are deferred"),
        }
    }

    assert_eq!(gate.settle("search", generations[0]), None);
    assert_eq!(gate.settle("search", generations[1]), None);
    assert_eq!(gate.settle("search", generations[2]).as_deref(), Some("web"));
    assert_eq!(gate.settle("search", generations[2]), None);
    assert!(!gate.is_pending("search"));
}

#[test]
fn test_custom_list_parsing() {
    assert_eq!(parse_custom_list(" a, \"b, c\" ,d,,").unwrap(), scalars(&["a", "b, c", "d"]));
    assert!(parse_custom_list("a, \"b").is_err());
}
