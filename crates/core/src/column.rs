use serde::{Deserialize, Serialize};

/// Whether a column is offered as a category axis or a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Category,
    Measure,
}

/// Column metadata for one update cycle.
///
/// `ordinal` is the column's position in the host's column list for this
/// cycle only; it may point elsewhere next cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub display_name: String,
    pub role: ColumnRole,
    #[serde(default)]
    pub format: String,
    pub ordinal: usize,
}

impl Column {
    pub fn new(display_name: impl Into<String>, role: ColumnRole, ordinal: usize) -> Self {
        Self {
            display_name: display_name.into(),
            role,
            format: String::new(),
            ordinal,
        }
    }

    pub fn is_measure(&self) -> bool {
        self.role == ColumnRole::Measure
    }
}
