//! Fact Store: the immutable per-cycle snapshot of input records.

use binchart_config::EngineLimits;
use binchart_core::{Cell, Column, Key};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Host-issued cross-filter token. Threaded through, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrossFilterRef(pub String);

impl CrossFilterRef {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

/// One raw row as delivered by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub cross_filter_ref: CrossFilterRef,
}

/// Everything the host sends for one update cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

// ---------------------------------------------------------------------------
// Facts
// ---------------------------------------------------------------------------

/// One input record. `index` is its position in the full store for this cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    pub index: usize,
    pub cells: Vec<Cell>,
    pub cross_filter_ref: CrossFilterRef,
}

impl Fact {
    /// Key for a column. Missing cells read as Blank.
    pub fn key(&self, column: usize) -> Key {
        self.cells.get(column).map(Key::from_cell).unwrap_or(Key::Blank)
    }

    /// Measure value; null, text and missing cells are `None`.
    pub fn measure(&self, column: usize) -> Option<f64> {
        self.cells.get(column).and_then(Cell::as_number)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FactSet {
    pub columns: Vec<Column>,
    pub facts: Vec<Fact>,
}

impl FactSet {
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn column(&self, ordinal: usize) -> Result<&Column, EngineError> {
        self.columns
            .get(ordinal)
            .ok_or(EngineError::InvalidColumnReference {
                ordinal,
                column_count: self.columns.len(),
            })
    }

    /// Subset keeping the column list and fact indices.
    pub fn filtered<F>(&self, mut keep: F) -> FactSet
    where
        F: FnMut(&Fact) -> bool,
    {
        FactSet {
            columns: self.columns.clone(),
            facts: self.facts.iter().filter(|f| keep(*f)).cloned().collect(),
        }
    }
}

/// Build the cycle's fact set. Only the row limit is checked here; the
/// bin-cardinality limit is checked while binning.
pub fn load(dataset: Dataset, limits: &EngineLimits) -> Result<FactSet, EngineError> {
    let rows = dataset.rows.len();
    if rows > limits.max_rows {
        return Err(EngineError::RowLimitExceeded {
            rows,
            limit: limits.max_rows,
        });
    }

    let facts = dataset
        .rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| Fact {
            index,
            cells: row.cells,
            cross_filter_ref: row.cross_filter_ref,
        })
        .collect();

    Ok(FactSet {
        columns: dataset.columns,
        facts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use binchart_core::ColumnRole;

    fn dataset(rows: usize) -> Dataset {
        Dataset {
            columns: vec![Column::new("n", ColumnRole::Measure, 0)],
            rows: (0..rows)
                .map(|i| Row {
                    cells: vec![Cell::Number(i as f64)],
                    cross_filter_ref: CrossFilterRef::new(format!("row-{i}")),
                })
                .collect(),
        }
    }

    #[test]
    fn load_keeps_order_and_indices() {
        let facts = load(dataset(3), &EngineLimits::default()).unwrap();
        assert_eq!(facts.len(), 3);
        assert_eq!(facts.facts[2].index, 2);
        assert_eq!(facts.facts[2].cross_filter_ref, CrossFilterRef::new("row-2"));
    }

    #[test]
    fn row_limit_is_inclusive() {
        let limits = EngineLimits::default();
        assert!(load(dataset(20_000), &limits).is_ok());
        let err = load(dataset(20_001), &limits).unwrap_err();
        assert_eq!(
            err,
            EngineError::RowLimitExceeded {
                rows: 20_001,
                limit: 20_000
            }
        );
        assert!(err.is_terminal());
    }

    #[test]
    fn missing_cells_are_blank() {
        let facts = load(dataset(1), &EngineLimits::default()).unwrap();
        assert!(facts.facts[0].key(5).is_blank());
        assert_eq!(facts.facts[0].measure(5), None);
        assert!(matches!(
            facts.column(3),
            Err(EngineError::InvalidColumnReference { ordinal: 3, column_count: 1 })
        ));
    }
}
