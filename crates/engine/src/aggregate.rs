use std::collections::BTreeSet;

use binchart_core::{Key, NormalizedKey};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::fact::{CrossFilterRef, Fact};

/// One (group, color) cell of a bin.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedLeaf {
    pub group_key: Key,
    /// `None` when color-by is off.
    pub color_key: Option<Key>,
    pub sum: f64,
    /// Set by any strictly positive numeric contribution.
    pub has_positive_value: bool,
    pub fact_count: usize,
    pub refs: BTreeSet<CrossFilterRef>,
}

/// A group's total across its color leaves.
#[derive(Debug, Clone, Serialize)]
pub struct GroupTotal {
    pub key: Key,
    pub total: f64,
    pub has_positive_value: bool,
}

/// min/max/average over a bin's group totals. All zero for an empty bin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BinStatistics {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BinAggregate {
    /// Group first-seen order, then color first-seen order within the group.
    pub leaves: Vec<AggregatedLeaf>,
    pub groups: Vec<GroupTotal>,
    pub stats: BinStatistics,
}

impl BinAggregate {
    /// Nothing positive to draw: the renderer lays it out as an empty unit.
    pub fn is_empty(&self) -> bool {
        !self.leaves.iter().any(|l| l.has_positive_value)
    }
}

struct GroupAcc {
    key: Key,
    total: f64,
    has_positive_value: bool,
    leaves: Vec<AggregatedLeaf>,
    color_index: FxHashMap<Option<NormalizedKey>, usize>,
}

/// Nest a bin's facts by group key, then (when `color_by_column` is set) by
/// color key, summing the measure column.
///
/// Null, text and missing measure cells contribute 0 and never set
/// `has_positive_value`.
pub fn aggregate(
    facts: &[Fact],
    group_column: usize,
    color_by_column: Option<usize>,
    measure_column: usize,
) -> BinAggregate {
    let mut groups: Vec<GroupAcc> = Vec::new();
    let mut group_index: FxHashMap<NormalizedKey, usize> = FxHashMap::default();

    for fact in facts {
        let group_key = fact.key(group_column);
        let g = *group_index
            .entry(group_key.normalized())
            .or_insert_with(|| {
                groups.push(GroupAcc {
                    key: group_key.clone(),
                    total: 0.0,
                    has_positive_value: false,
                    leaves: Vec::new(),
                    color_index: FxHashMap::default(),
                });
                groups.len() - 1
            });
        let group = &mut groups[g];

        let color_key = color_by_column.map(|c| fact.key(c));
        let leaf_slot = color_key.as_ref().map(Key::normalized);
        let l = match group.color_index.get(&leaf_slot) {
            Some(&l) => l,
            None => {
                group.leaves.push(AggregatedLeaf {
                    group_key: group.key.clone(),
                    color_key,
                    sum: 0.0,
                    has_positive_value: false,
                    fact_count: 0,
                    refs: BTreeSet::new(),
                });
                let l = group.leaves.len() - 1;
                group.color_index.insert(leaf_slot, l);
                l
            }
        };

        let value = fact.measure(measure_column).unwrap_or(0.0);
        let positive = value > 0.0;

        let leaf = &mut group.leaves[l];
        leaf.sum += value;
        leaf.has_positive_value |= positive;
        leaf.fact_count += 1;
        leaf.refs.insert(fact.cross_filter_ref.clone());

        group.total += value;
        group.has_positive_value |= positive;
    }

    let totals: Vec<GroupTotal> = groups
        .iter()
        .map(|g| GroupTotal {
            key: g.key.clone(),
            total: g.total,
            has_positive_value: g.has_positive_value,
        })
        .collect();
    let stats = statistics(&totals);
    let leaves = groups.into_iter().flat_map(|g| g.leaves).collect();

    BinAggregate {
        leaves,
        groups: totals,
        stats,
    }
}

/// Statistics over per-group totals, never over individual color leaves.
fn statistics(totals: &[GroupTotal]) -> BinStatistics {
    if totals.is_empty() {
        return BinStatistics::default();
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for t in totals {
        min = min.min(t.total);
        max = max.max(t.total);
        sum += t.total;
    }
    BinStatistics {
        min,
        max,
        average: sum / totals.len() as f64,
    }
}
