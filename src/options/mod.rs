//! Option sets and their reconciliation.
//!
//! Every refresh of a query or custom variable produces a raw list of values.
//! [`reconcile`] decides whether that list is observably different from the
//! stored one. Both lists are sorted with the variable's [`SortMode`] first,
//! so a server answering in a different order does not count as a change and
//! does not trigger a cascade or a re-render.

mod formatter;

pub use formatter::{ParseFailure, SortMode, parse_custom_list, parse_payload, sort_values};

use crate::variable::Scalar;

/// Ordered list of selectable values. Duplicates are allowed.
pub type OptionSet = Vec<Scalar>;

/// Outcome of comparing a fresh option list with the stored one.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// Same content after sorting; keep the stored set untouched
    Unchanged,
    /// Different content; the sorted fresh set replaces the stored one
    Changed(OptionSet),
}

impl Reconciliation {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

/// Compares `new_raw` with `previous` after sorting both by `sort_mode`.
///
/// Equality is positional: same length and the same value at every index.
/// With [`SortMode::Disabled`] nothing is sorted, so order differences count.
///
/// # Examples
///
/// ```
/// use dashvars::options::{Reconciliation, SortMode, reconcile};
/// use dashvars::variable::Scalar;
///
/// let previous = vec![Scalar::from("a")];
/// let outcome = reconcile(vec![Scalar::from("b"), Scalar::from("a")], &previous, SortMode::Lexical);
/// assert_eq!(outcome, Reconciliation::Changed(vec![Scalar::from("a"), Scalar::from("b")]));
/// ```
pub fn reconcile(new_raw: Vec<Scalar>, previous: &[Scalar], sort_mode: SortMode) -> Reconciliation {
    let sorted_new = sort_values(new_raw, sort_mode);
    let sorted_previous = sort_values(previous.to_vec(), sort_mode);

    if sorted_new == sorted_previous {
        Reconciliation::Unchanged
    } else {
        Reconciliation::Changed(sorted_new)
    }
}
