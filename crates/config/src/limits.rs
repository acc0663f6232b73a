use serde::{Deserialize, Serialize};

/// Hard limits past which a cycle renders a message instead of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Rows accepted per update cycle.
    pub max_rows: usize,
    /// Distinct bin-column values accepted per update cycle.
    pub max_bin_values: usize,
    /// Optional cap on undo entries; the oldest entry is dropped past it.
    /// Unset keeps every entry until undone.
    pub history_depth: Option<usize>,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_rows: 20_000,
            max_bin_values: 1_200,
            history_depth: None,
        }
    }
}
