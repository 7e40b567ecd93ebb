//! The commit gate between user input and the shared variable set.
//!
//! Discrete picks on query and custom variables commit immediately, after
//! normalization. Free-text edits on textbox variables are coalesced: every
//! edit replaces the pending value and restarts the quiet period, and only the
//! value still pending when its timer fires is committed. Timers are not
//! cancelled; a timer whose generation is no longer the latest settles to
//! nothing.

use std::collections::HashMap;
use std::time::Duration;

use crate::core::DashvarError;
use crate::variable::{Scalar, SelectedValue, Variable, VariableKind};

/// Raw input from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    /// A keystroke-level edit of a text field
    Text(String),
    /// A discrete pick from a dropdown
    Pick(SelectedValue),
}

/// Selection written into the variable set.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedSelection {
    pub selected_value: Option<SelectedValue>,
    pub all_selected: bool,
}

impl CommittedSelection {
    /// No selection.
    pub const fn cleared() -> Self {
        Self {
            selected_value: None,
            all_selected: false,
        }
    }

    /// Every option selected through the ALL wildcard.
    pub fn all(options: &[Scalar]) -> Self {
        Self {
            selected_value: Some(SelectedValue::Multi(options.to_vec())),
            all_selected: true,
        }
    }

    /// Text typed into a textbox; empty text clears the selection.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::cleared();
        }
        Self {
            selected_value: Some(SelectedValue::Single(Scalar::String(text))),
            all_selected: false,
        }
    }
}

/// What the session must do with an input.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitAction {
    /// Write this selection now
    Immediate(CommittedSelection),
    /// Start (or restart) the quiet period; settle `generation` when it ends
    Deferred {
        generation: u64,
    },
}

#[derive(Debug)]
struct PendingEdit {
    generation: u64,
    text: String,
}

/// Debounce bookkeeping for textbox edits plus pick normalization.
#[derive(Debug)]
pub struct CommitGate {
    window: Duration,
    all_sentinel: String,
    pending: HashMap<String, PendingEdit>,
    next_generation: u64,
}

impl CommitGate {
    pub fn new(window: Duration, all_sentinel: impl Into<String>) -> Self {
        Self {
            window,
            all_sentinel: all_sentinel.into(),
            pending: HashMap::new(),
            next_generation: 0,
        }
    }

    /// The quiet period textbox edits wait for.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Routes `input` for `variable`, whose current options are `options`.
    ///
    /// # Errors
    ///
    /// Returns an error when a pick does not fit the variable; see
    /// [`normalize_pick`](Self::normalize_pick).
    pub fn commit(
        &mut self,
        variable: &Variable,
        input: UserInput,
        options: &[Scalar],
    ) -> Result<CommitAction, DashvarError> {
        match (&variable.kind, input) {
            (VariableKind::Textbox, UserInput::Text(text)) => Ok(CommitAction::Deferred {
                generation: self.submit(&variable.name, text),
            }),
            (VariableKind::Textbox, UserInput::Pick(SelectedValue::Single(value))) => {
                Ok(CommitAction::Deferred {
                    generation: self.submit(&variable.name, value.to_string()),
                })
            }
            (VariableKind::Textbox, UserInput::Pick(SelectedValue::Multi(_))) => {
                Err(DashvarError::InvalidSelection {
                    variable: variable.name.clone(),
                    reason: "textbox variables take a single text value".to_string(),
                })
            }
            (_, UserInput::Text(text)) => self
                .normalize_pick(variable, SelectedValue::Single(Scalar::String(text)), options)
                .map(CommitAction::Immediate),
            (_, UserInput::Pick(value)) => {
                self.normalize_pick(variable, value, options).map(CommitAction::Immediate)
            }
        }
    }

    /// Records a textbox edit, replacing any pending one.
    ///
    /// Returns the generation the caller's timer must present to
    /// [`settle`](Self::settle).
    pub fn submit(&mut self, name: &str, text: String) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.pending.insert(
            name.to_string(),
            PendingEdit {
                generation,
                text,
            },
        );
        generation
    }

    /// Ends a quiet period. Returns the text to commit only if `generation`
    /// is still the latest edit for `name`.
    pub fn settle(&mut self, name: &str, generation: u64) -> Option<String> {
        match self.pending.get(name) {
            Some(edit) if edit.generation == generation => {
                self.pending.remove(name).map(|edit| edit.text)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.contains_key(name)
    }

    /// Normalizes a discrete pick against the current options.
    ///
    /// - On a multi-select variable, the ALL sentinel or an empty pick
    ///   becomes every option with `all_selected`.
    /// - A single value on a multi-select variable becomes a one-element list.
    /// - Picked values are matched to options by string form and replaced by
    ///   the option itself, so `"3"` selects the option `3`.
    ///
    /// # Errors
    ///
    /// [`DashvarError::SelectionNotInOptions`] for a value that is not an
    /// option, [`DashvarError::InvalidSelection`] for several values on a
    /// single-select variable, an empty single-select pick, or the ALL
    /// sentinel on a single-select variable.
    pub fn normalize_pick(
        &self,
        variable: &Variable,
        value: SelectedValue,
        options: &[Scalar],
    ) -> Result<CommittedSelection, DashvarError> {
        if value.contains_str(&self.all_sentinel) {
            if !variable.multi_select {
                return Err(DashvarError::InvalidSelection {
                    variable: variable.name.clone(),
                    reason: "ALL can only be selected on multi-select variables".to_string(),
                });
            }
            return Ok(CommittedSelection::all(options));
        }
        if variable.multi_select && value.is_empty() {
            return Ok(CommittedSelection::all(options));
        }

        let mut picked = Vec::with_capacity(value.values().len());
        for candidate in value.values() {
            let rendered = candidate.to_string();
            let option = options
                .iter()
                .find(|option| *option == candidate || option.to_string() == rendered)
                .ok_or_else(|| DashvarError::SelectionNotInOptions {
                    variable: variable.name.clone(),
                    value: rendered.clone(),
                })?;
            picked.push(option.clone());
        }

        if variable.multi_select {
            return Ok(CommittedSelection {
                selected_value: Some(SelectedValue::Multi(picked)),
                all_selected: false,
            });
        }

        match picked.len() {
            1 => Ok(CommittedSelection {
                selected_value: picked.pop().map(SelectedValue::Single),
                all_selected: false,
            }),
            n => Err(DashvarError::InvalidSelection {
                variable: variable.name.clone(),
                reason: format!("single-select variable received {n} values"),
            }),
        }
    }
}
