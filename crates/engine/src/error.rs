use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// More input rows than the cycle accepts.
    RowLimitExceeded { rows: usize, limit: usize },
    /// More distinct bin-column values than the cycle accepts.
    BinCardinalityExceeded { distinct: usize, limit: usize },
    /// A stored column ordinal does not exist in this cycle's column list.
    InvalidColumnReference { ordinal: usize, column_count: usize },
    /// Undo requested with nothing recorded.
    HistoryUnderflow,
}

impl EngineError {
    /// Limit errors end the cycle; everything else is absorbed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::RowLimitExceeded { .. } | Self::BinCardinalityExceeded { .. }
        )
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowLimitExceeded { rows, limit } => {
                write!(f, "{rows} rows exceeds the limit of {limit}")
            }
            Self::BinCardinalityExceeded { distinct, limit } => {
                write!(f, "more than {limit} distinct bin values (found at least {distinct})")
            }
            Self::InvalidColumnReference { ordinal, column_count } => {
                write!(f, "column {ordinal} does not exist ({column_count} columns)")
            }
            Self::HistoryUnderflow => write!(f, "nothing to undo"),
        }
    }
}

impl std::error::Error for EngineError {}
