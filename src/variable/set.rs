//! The dashboard's full variable context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strsim::levenshtein;

use super::{SelectedValue, Variable};
use crate::core::DashvarError;

/// Maximum Levenshtein distance, as a percentage of the requested name length,
/// for a name to be offered as a suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Mapping from variable name to [`Variable`], names unique.
///
/// Resolution reads the whole set; only the session mutates it, through
/// [`VariableSet::apply_selection`]. A `BTreeMap` keeps iteration
/// deterministic, which keeps load order and CLI output stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Variable>", into = "Vec<Variable>")]
pub struct VariableSet {
    variables: BTreeMap<String, Variable>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set, validating every variable.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid name or duplicate.
    pub fn from_variables<I>(variables: I) -> Result<Self, DashvarError>
    where
        I: IntoIterator<Item = Variable>,
    {
        let mut set = Self::new();
        for variable in variables {
            set.insert(variable)?;
        }
        Ok(set)
    }

    /// Adds a fully populated variable.
    ///
    /// # Errors
    ///
    /// Returns [`DashvarError::InvalidVariableName`] or
    /// [`DashvarError::DuplicateVariable`].
    pub fn insert(&mut self, variable: Variable) -> Result<(), DashvarError> {
        variable.validate()?;
        if self.variables.contains_key(&variable.name) {
            return Err(DashvarError::DuplicateVariable {
                name: variable.name,
            });
        }
        self.variables.insert(variable.name.clone(), variable);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Looks a variable up, suggesting similar names when it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`DashvarError::VariableNotFound`] with up to three suggestions.
    pub fn require(&self, name: &str) -> Result<&Variable, DashvarError> {
        self.variables.get(name).ok_or_else(|| DashvarError::VariableNotFound {
            name: name.to_string(),
            suggestions: self.similar_names(name),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Query variables whose template references `name` directly.
    pub fn direct_dependents<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Variable> {
        self.variables.values().filter(move |variable| variable.depends_on(name))
    }

    /// String form of the named variable's selection, empty when the
    /// variable is absent or unset.
    pub fn selected_value_string(&self, name: &str) -> String {
        self.variables.get(name).map(Variable::selected_value_string).unwrap_or_default()
    }

    /// Writes a selection. Returns `false` if nothing changed.
    ///
    /// # Errors
    ///
    /// Returns [`DashvarError::VariableNotFound`] for an unknown name.
    pub(crate) fn apply_selection(
        &mut self,
        name: &str,
        selected_value: Option<SelectedValue>,
        all_selected: bool,
    ) -> Result<bool, DashvarError> {
        let suggestions = if self.variables.contains_key(name) {
            Vec::new()
        } else {
            self.similar_names(name)
        };
        let variable =
            self.variables.get_mut(name).ok_or_else(|| DashvarError::VariableNotFound {
                name: name.to_string(),
                suggestions,
            })?;

        if variable.selected_value == selected_value && variable.all_selected == all_selected {
            return Ok(false);
        }
        variable.selected_value = selected_value;
        variable.all_selected = all_selected;
        Ok(true)
    }

    fn similar_names(&self, target: &str) -> Vec<String> {
        let mut scored: Vec<_> =
            self.variables.keys().map(|name| (name.clone(), levenshtein(target, name))).collect();

        scored.sort_by_key(|(_, dist)| *dist);

        scored
            .into_iter()
            .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(name, _)| name)
            .collect()
    }
}

impl TryFrom<Vec<Variable>> for VariableSet {
    type Error = DashvarError;

    fn try_from(variables: Vec<Variable>) -> Result<Self, Self::Error> {
        Self::from_variables(variables)
    }
}

impl From<VariableSet> for Vec<Variable> {
    fn from(set: VariableSet) -> Self {
        set.variables.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a VariableSet {
    type Item = &'a Variable;
    type IntoIter = std::collections::btree_map::Values<'a, String, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.values()
    }
}
