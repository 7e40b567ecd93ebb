//! Value formatting: sort modes, static list parsing, payload parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use thiserror::Error;

use super::OptionSet;
use crate::variable::Scalar;

/// Declared sort order of a variable's options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Keep the order the values arrived in
    #[default]
    #[serde(alias = "none")]
    Disabled,
    /// Ascending by string form
    #[serde(alias = "asc")]
    Lexical,
    /// Descending by string form
    #[serde(alias = "desc")]
    LexicalDesc,
    /// Ascending by numeric value; non-numeric values last, lexically
    Numeric,
    /// Descending by numeric value; non-numeric values first, lexically reversed
    NumericDesc,
}

/// Why raw option data could not be turned into an [`OptionSet`].
///
/// Parse failures are logged and the previous options are kept; they are never
/// shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("unterminated quote starting at byte {position}")]
    UnterminatedQuote {
        position: usize,
    },

    #[error("option {index} is {found}, expected a string, number, or boolean")]
    UnexpectedShape {
        index: usize,
        found: &'static str,
    },
}

/// Sorts `values` according to `mode`. The sort is stable.
///
/// # Examples
///
/// ```
/// use dashvars::options::{SortMode, sort_values};
/// use dashvars::variable::Scalar;
///
/// let sorted = sort_values(vec![Scalar::from("10"), Scalar::from("9")], SortMode::Numeric);
/// assert_eq!(sorted, vec![Scalar::from("9"), Scalar::from("10")]);
/// ```
pub fn sort_values(mut values: Vec<Scalar>, mode: SortMode) -> Vec<Scalar> {
    match mode {
        SortMode::Disabled => {}
        SortMode::Lexical => values.sort_by(lexical),
        SortMode::LexicalDesc => values.sort_by(|a, b| lexical(b, a)),
        SortMode::Numeric => values.sort_by(numeric),
        SortMode::NumericDesc => values.sort_by(|a, b| numeric(b, a)),
    }
    values
}

fn lexical(a: &Scalar, b: &Scalar) -> Ordering {
    a.to_string().cmp(&b.to_string())
}

fn numeric(a: &Scalar, b: &Scalar) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => lexical(a, b),
    }
}

/// Parses a static comma-separated list.
///
/// Items are trimmed and empty items dropped. Double quotes group an item so it
/// may contain commas: `a, "b, c"` yields `a` and `b, c`. Items stay strings.
///
/// # Errors
///
/// Returns [`ParseFailure::UnterminatedQuote`] when a quote is never closed.
pub fn parse_custom_list(raw: &str) -> Result<OptionSet, ParseFailure> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quote_start = 0;

    for (idx, ch) in raw.char_indices() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                if in_quotes {
                    quote_start = idx;
                }
            }
            ',' if !in_quotes => {
                push_item(&mut items, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if in_quotes {
        return Err(ParseFailure::UnterminatedQuote {
            position: quote_start,
        });
    }
    push_item(&mut items, &current);
    Ok(items)
}

fn push_item(items: &mut OptionSet, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        items.push(Scalar::from(trimmed));
    }
}

/// Converts an executor payload into scalars.
///
/// `null` entries are skipped. Objects and nested arrays are rejected.
///
/// # Errors
///
/// Returns [`ParseFailure::UnexpectedShape`] for the first non-scalar entry.
pub fn parse_payload(values: &[JsonValue]) -> Result<OptionSet, ParseFailure> {
    let mut options = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        match value {
            JsonValue::Null => {}
            JsonValue::Bool(b) => options.push(Scalar::Bool(*b)),
            JsonValue::Number(n) => match n.as_f64() {
                Some(n) => options.push(Scalar::Number(n)),
                None => {
                    return Err(ParseFailure::UnexpectedShape {
                        index,
                        found: "an unrepresentable number",
                    });
                }
            },
            JsonValue::String(s) => options.push(Scalar::String(s.clone())),
            JsonValue::Array(_) => {
                return Err(ParseFailure::UnexpectedShape {
                    index,
                    found: "an array",
                });
            }
            JsonValue::Object(_) => {
                return Err(ParseFailure::UnexpectedShape {
                    index,
                    found: "an object",
                });
            }
        }
    }
    Ok(options)
}
