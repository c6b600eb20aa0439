//! Cell values and their canonical text form.
//!
//! Every stage that compares cell contents against rule keys goes through
//! [`canonical_string`], so the value index and the rule lookup always agree
//! on how a number or boolean is spelled.

use std::borrow::Cow;
use std::fmt;

/// A single spreadsheet cell.
///
/// `Empty` marks an absent cell. An empty string is `Text("")` and is a
/// present value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True only for [`CellValue::Empty`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// True for absent cells and empty strings.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match canonical_string(self) {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

/// Canonical text of a cell, or `None` for an absent cell.
///
/// Text is returned verbatim (including the empty string). Integral numbers
/// print without a fractional part, other numbers use the shortest decimal
/// that round-trips. Booleans print as `true` / `false`.
pub fn canonical_string(cell: &CellValue) -> Option<Cow<'_, str>> {
    match cell {
        CellValue::Empty => None,
        CellValue::Text(text) => Some(Cow::Borrowed(text.as_str())),
        CellValue::Number(number) => Some(Cow::Owned(format_number(*number))),
        CellValue::Bool(true) => Some(Cow::Borrowed("true")),
        CellValue::Bool(false) => Some(Cow::Borrowed("false")),
    }
}

/// Integral values below this magnitude print through `i64`.
const INTEGRAL_LIMIT: f64 = 1e15;

#[allow(clippy::cast_possible_truncation)]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < INTEGRAL_LIMIT {
        return (value as i64).to_string();
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn canon(cell: &CellValue) -> Option<String> {
        canonical_string(cell).map(Cow::into_owned)
    }

    #[test]
    fn numbers_use_natural_form() {
        assert_eq!(canon(&CellValue::Number(3.0)).as_deref(), Some("3"));
        assert_eq!(canon(&CellValue::Number(3.5)).as_deref(), Some("3.5"));
        assert_eq!(canon(&CellValue::Number(-0.0)).as_deref(), Some("0"));
        assert_eq!(canon(&CellValue::Number(-42.0)).as_deref(), Some("-42"));
        assert_eq!(canon(&CellValue::Number(0.1 + 0.2)).as_deref(), Some("0.30000000000000004"));
    }

    #[test]
    fn non_finite_numbers() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn booleans_and_text() {
        assert_eq!(canon(&CellValue::Bool(true)).as_deref(), Some("true"));
        assert_eq!(canon(&CellValue::Bool(false)).as_deref(), Some("false"));
        assert_eq!(canon(&CellValue::text("  HR ")).as_deref(), Some("  HR "));
    }

    #[test]
    fn empty_string_is_present() {
        let cell = CellValue::text("");
        assert!(!cell.is_absent());
        assert!(cell.is_blank());
        assert_eq!(canon(&cell).as_deref(), Some(""));
        assert_eq!(canon(&CellValue::Empty), None);
    }

    #[test]
    fn option_conversion() {
        assert_eq!(CellValue::from(None::<&str>), CellValue::Empty);
        assert_eq!(CellValue::from(Some("HR")), CellValue::text("HR"));
    }

    proptest! {
        #[test]
        fn integral_numbers_match_integer_text(n in -999_999_999_999_i64..999_999_999_999_i64) {
            #[allow(clippy::cast_precision_loss)]
            let cell = CellValue::Number(n as f64);
            prop_assert_eq!(canon(&cell), Some(n.to_string()));
        }

        #[test]
        fn finite_numbers_round_trip(value in proptest::num::f64::NORMAL) {
            let text = format_number(value);
            let parsed: f64 = text.parse().expect("canonical number parses");
            prop_assert_eq!(parsed, value);
        }
    }
}
