//! `binchart-engine`: binning, aggregation and undo core for interactive charts.
//!
//! Pure engine crate: receives a pre-loaded dataset and a configuration,
//! returns a view model. No IO dependencies.

pub mod aggregate;
pub mod binning;
pub mod error;
pub mod fact;
pub mod history;
pub mod isolation;
pub mod palette;
pub mod resolve;
pub mod session;
pub mod view_model;

pub use aggregate::{aggregate, AggregatedLeaf, BinAggregate, BinStatistics};
pub use binning::{partition, Bin, BinPlan};
pub use error::EngineError;
pub use fact::{load, CrossFilterRef, Dataset, Fact, FactSet, Row};
pub use history::{ConfigEntry, EntryKind, HistoryEntry, HistoryLog};
pub use isolation::{effective_facts, IsolationState, LeafRef};
pub use resolve::{resolve, resolve_snapshot};
pub use session::{ChartSession, UndoOutcome, UpdateOrigin};
pub use view_model::{Validation, ViewModel};
