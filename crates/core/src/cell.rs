use serde::{Deserialize, Serialize};

/// One value of an input record.
///
/// Serialized untagged so host datasets can be plain JSON arrays
/// (`[12, "Berlin", null]`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Parse raw text the way a CSV or clipboard import would.
    ///
    /// Empty input is Null, anything `f64` accepts (and is finite) is a
    /// Number, everything else stays Text.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Cell::Null;
        }

        if let Ok(num) = trimmed.parse::<f64>() {
            if num.is_finite() {
                return Cell::Number(num);
            }
        }

        Cell::Text(trimmed.to_string())
    }

    /// Numeric value for measure sums. Text never counts, even if it looks numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}
