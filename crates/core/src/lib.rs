//! `binchart-core`: value types shared by the chart engine and its config.
//!
//! Cells arrive from the host data source, keys are what the engine compares.
//! Every equality or ordering test between keys goes through
//! [`key::NormalizedKey`]; nothing else in the workspace compares raw values.

pub mod cell;
pub mod column;
pub mod key;

pub use cell::Cell;
pub use column::{Column, ColumnRole};
pub use key::{keys_match, ColumnKind, Key, NormalizedKey};
