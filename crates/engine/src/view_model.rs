//! View Model Assembler: the object the external renderer consumes.

use binchart_config::{ChartConfig, ChartKind, Color};
use binchart_core::Key;
use serde::Serialize;

use crate::aggregate::{AggregatedLeaf, BinAggregate, BinStatistics, GroupTotal};
use crate::binning::Bin;
use crate::error::EngineError;
use crate::fact::FactSet;
use crate::isolation::{IsolationState, IsolationSummary, LeafRef};
use crate::palette::{assign_colors, color_for, ColorAssignment};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Validation {
    Ok,
    RowLimitExceeded { rows: usize, limit: usize },
    BinCardinalityExceeded { distinct: usize, limit: usize },
}

impl Validation {
    /// Only the two limit errors are user-visible; anything else renders normally.
    pub fn from_error(err: &EngineError) -> Self {
        match *err {
            EngineError::RowLimitExceeded { rows, limit } => Self::RowLimitExceeded { rows, limit },
            EngineError::BinCardinalityExceeded { distinct, limit } => {
                Self::BinCardinalityExceeded { distinct, limit }
            }
            EngineError::InvalidColumnReference { .. } | EngineError::HistoryUnderflow => Self::Ok,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Fixed text shown instead of the chart.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Ok => None,
            Self::RowLimitExceeded { .. } => {
                Some("Too many rows to display. Filter the data and try again.")
            }
            Self::BinCardinalityExceeded { .. } => {
                Some("Too many distinct values in the bin column. Choose another bin column.")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Output shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LeafView {
    pub leaf_index: usize,
    #[serde(flatten)]
    pub leaf: AggregatedLeaf,
    pub color: Color,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BinView {
    pub index: usize,
    pub label: String,
    pub keys: Vec<Key>,
    pub fact_count: usize,
    /// Indices into the cycle's full fact store, for table rendering.
    pub fact_indices: Vec<usize>,
    pub is_empty: bool,
    pub groups: Vec<GroupTotal>,
    pub leaves: Vec<LeafView>,
}

/// Display names of the configured columns, when they resolve.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AxisNames {
    pub group: Option<String>,
    pub target: Option<String>,
    pub bin: Option<String>,
    pub color_by: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub chart_kind: ChartKind,
    pub validation: Validation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub axes: AxisNames,
    pub bins: Vec<BinView>,
    pub per_bin_stats: Vec<BinStatistics>,
    pub isolation: IsolationSummary,
    pub color_assignments: Vec<ColorAssignment>,
    pub label_color: Color,
    /// Every leaf of this cycle in bin order; `leaf_refs[i].leaf_index == i`.
    #[serde(skip)]
    pub leaf_refs: Vec<LeafRef>,
}

impl ViewModel {
    /// "Cannot render" output: no bins, just the validation result.
    pub fn rejected(config: &ChartConfig, validation: Validation, isolation: &IsolationState) -> Self {
        Self {
            chart_kind: config.chart_kind,
            message: validation.message(),
            validation,
            axes: AxisNames::default(),
            bins: Vec::new(),
            per_bin_stats: Vec::new(),
            isolation: isolation.summary(),
            color_assignments: Vec::new(),
            label_color: config.text_palette.label_color(),
            leaf_refs: Vec::new(),
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_refs.len()
    }

    pub fn leaf(&self, leaf_index: usize) -> Option<&LeafRef> {
        self.leaf_refs.get(leaf_index)
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn axis_name(facts: &FactSet, ordinal: Option<usize>) -> Option<String> {
    let ordinal = ordinal?;
    match facts.column(ordinal) {
        Ok(column) => Some(column.display_name.clone()),
        Err(err) => {
            log::debug!("axis name unavailable: {err}");
            None
        }
    }
}

/// Combine bins and their aggregates (same order, same length) into the view model.
pub fn assemble(
    config: &ChartConfig,
    facts: &FactSet,
    bins: Vec<Bin>,
    aggregates: Vec<BinAggregate>,
    isolation: &IsolationState,
) -> ViewModel {
    let color_assignments = match config.color_by_column {
        Some(_) => assign_colors(
            aggregates
                .iter()
                .flat_map(|a| a.leaves.iter())
                .filter_map(|l| l.color_key.as_ref()),
            config.palette,
        ),
        None => Vec::new(),
    };
    let series_color = config.palette.color_at(0);

    let mut leaf_refs = Vec::new();
    let mut per_bin_stats = Vec::with_capacity(bins.len());
    let mut bin_views = Vec::with_capacity(bins.len());

    for (bin, aggregate) in bins.into_iter().zip(aggregates) {
        let is_empty = aggregate.is_empty();
        per_bin_stats.push(aggregate.stats);

        let mut leaves = Vec::with_capacity(aggregate.leaves.len());
        for leaf in aggregate.leaves {
            let leaf_ref = LeafRef {
                leaf_index: leaf_refs.len(),
                bin_keys: bin.keys.clone(),
                group_key: leaf.group_key.clone(),
                color_key: leaf.color_key.clone(),
                refs: leaf.refs.iter().cloned().collect(),
            };
            let color = leaf
                .color_key
                .as_ref()
                .and_then(|k| color_for(&color_assignments, k))
                .unwrap_or(series_color);
            leaves.push(LeafView {
                leaf_index: leaf_ref.leaf_index,
                selected: isolation.covers(&leaf_ref),
                leaf,
                color,
            });
            leaf_refs.push(leaf_ref);
        }

        bin_views.push(BinView {
            index: bin.index,
            fact_count: bin.facts.len(),
            fact_indices: bin.facts.iter().map(|f| f.index).collect(),
            label: bin.label,
            keys: bin.keys,
            is_empty,
            groups: aggregate.groups,
            leaves,
        });
    }

    ViewModel {
        chart_kind: config.chart_kind,
        validation: Validation::Ok,
        message: None,
        axes: AxisNames {
            group: axis_name(facts, Some(config.group_column)),
            target: axis_name(facts, Some(config.target_column)),
            bin: axis_name(facts, config.bin_column),
            color_by: axis_name(facts, config.color_by_column),
        },
        bins: bin_views,
        per_bin_stats,
        isolation: isolation.summary(),
        color_assignments,
        label_color: config.text_palette.label_color(),
        leaf_refs,
    }
}
