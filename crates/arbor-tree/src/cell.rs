use std::fmt;

use crate::raw::RawValue;

/// A normalized attribute value.
///
/// Every raw field is converted independently: finite numbers become
/// [`Cell::Numeric`], anything else non-empty stays [`Cell::Categorical`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Cell {
    /// A finite floating point value.
    Numeric(f64),
    /// Text that did not parse as a finite number.
    Categorical(String),
    /// The field was empty or absent.
    Missing,
}

impl Cell {
    /// Convert a raw field into a cell.
    #[must_use]
    pub fn from_raw(raw: &RawValue) -> Self {
        match raw {
            RawValue::Number(v) if v.is_finite() => Cell::Numeric(*v),
            RawValue::Number(_) | RawValue::Empty => Cell::Missing,
            RawValue::Text(s) => Cell::parse(s),
        }
    }

    /// Parse a text field: trimmed, numeric when it parses as a finite float.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Numeric(v),
            _ => Cell::Categorical(trimmed.to_string()),
        }
    }

    /// Return the numeric value, if this cell is numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    /// Return `true` if the cell is missing.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Numeric(v) => write!(f, "{v}"),
            Cell::Categorical(s) => f.write_str(s),
            Cell::Missing => f.write_str("?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_becomes_numeric() {
        assert_eq!(Cell::parse(" 85 "), Cell::Numeric(85.0));
        assert_eq!(Cell::parse("-2.5e1"), Cell::Numeric(-25.0));
    }

    #[test]
    fn non_finite_text_stays_categorical() {
        assert_eq!(Cell::parse("NaN"), Cell::Categorical("NaN".into()));
        assert_eq!(Cell::parse("inf"), Cell::Categorical("inf".into()));
    }

    #[test]
    fn empty_text_is_missing() {
        assert!(Cell::parse("").is_missing());
        assert!(Cell::from_raw(&RawValue::Empty).is_missing());
        let infinite = RawValue::Number(f64::INFINITY);
        assert!(Cell::from_raw(&infinite).is_missing());
    }

    #[test]
    fn display_uses_shortest_number_form() {
        assert_eq!(Cell::Numeric(85.0).to_string(), "85");
        assert_eq!(Cell::Numeric(77.5).to_string(), "77.5");
        assert_eq!(Cell::Categorical("sunny".into()).to_string(), "sunny");
    }
}
