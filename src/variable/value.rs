//! Scalar values and selections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single option value: string, number, or boolean.
///
/// Serialized untagged, so `"eu"`, `3` and `true` map directly onto the
/// matching variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    /// Numeric view of the value.
    ///
    /// Strings that parse as numbers count as numeric so that `"10"` sorts
    /// after `"9"` under a numeric sort mode.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(s) => s.trim().parse::<f64>().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Returns the string slice for string values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Current selection of a variable: one scalar or an ordered sequence.
///
/// The untagged representation tries the sequence form first, so a TOML or
/// JSON array always becomes [`SelectedValue::Multi`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectedValue {
    Multi(Vec<Scalar>),
    Single(Scalar),
}

impl SelectedValue {
    /// Builds a multi selection from anything convertible to scalars.
    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        Self::Multi(values.into_iter().map(Into::into).collect())
    }

    /// Builds a single selection.
    pub fn single(value: impl Into<Scalar>) -> Self {
        Self::Single(value.into())
    }

    /// All scalars contained in the selection, in order.
    pub fn values(&self) -> &[Scalar] {
        match self {
            Self::Multi(values) => values,
            Self::Single(value) => std::slice::from_ref(value),
        }
    }

    /// True for an empty multi selection.
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// True if any contained value is the string `needle`.
    pub fn contains_str(&self, needle: &str) -> bool {
        self.values().iter().any(|v| v.as_str() == Some(needle))
    }
}

/// Multi values are joined with `,` (no spaces), matching how bindings are
/// rendered into query templates.
impl fmt::Display for SelectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => write!(f, "{value}"),
            Self::Multi(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::from("eu-west").to_string(), "eu-west");
        assert_eq!(Scalar::from(3.0).to_string(), "3");
        assert_eq!(Scalar::from(2.5).to_string(), "2.5");
        assert_eq!(Scalar::from(true).to_string(), "true");
    }

    #[test]
    fn test_scalar_as_number() {
        assert_eq!(Scalar::from(" 10 ").as_number(), Some(10.0));
        assert_eq!(Scalar::from("ten").as_number(), None);
        assert_eq!(Scalar::from(false).as_number(), None);
    }

    #[test]
    fn test_selected_value_display_joins_without_spaces() {
        let value = SelectedValue::multi(["a", "b", "c"]);
        assert_eq!(value.to_string(), "a,b,c");
        assert_eq!(SelectedValue::single(7_i64).to_string(), "7");
    }

    #[test]
    fn test_selected_value_deserializes_untagged() {
        let multi: SelectedValue = serde_json::from_str(r#"["a", 1, true]"#).unwrap();
        assert_eq!(
            multi,
            SelectedValue::Multi(vec![
                Scalar::from("a"),
                Scalar::from(1.0),
                Scalar::from(true)
            ])
        );

        let single: SelectedValue = serde_json::from_str(r#""eu""#).unwrap();
        assert_eq!(single, SelectedValue::single("eu"));
    }

    #[test]
    fn test_contains_str() {
        let value = SelectedValue::multi(["x", "__ALL__"]);
        assert!(value.contains_str("__ALL__"));
        assert!(!SelectedValue::single(1_i64).contains_str("1"));
    }
}
