use std::fmt;

use serde::{Serialize, Serializer};

/// Text of a missing cell once it takes part in a key or a message.
pub const MISSING_TEXT: &str = "nan";

/// A raw scalar read from an input table.
///
/// Spreadsheet integers arrive as `Number`. Dates are carried as text so they
/// never take part in numeric tolerance.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Empty cells and NaN numbers count as missing. Empty text does not.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Plain text form for headers and exported cells. `Empty` is `""`.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Text form used for keys, tie-break strings and diff messages.
    /// Missing values read [`MISSING_TEXT`].
    pub fn to_key_text(&self) -> String {
        if self.is_missing() {
            MISSING_TEXT.to_string()
        } else {
            self.to_string()
        }
    }

    /// Same value, cast to text. Missing values become [`MISSING_TEXT`].
    pub fn into_text(self) -> Self {
        match self {
            Self::Text(s) => Self::Text(s),
            other => Self::Text(other.to_key_text()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            // Integers without decimals
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Self::Number(n) => serializer.serialize_str(&n.to_string()),
            Self::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}
