//! Isolation: drill into a user-selected subset of rendered leaves.
//!
//! A selection is a set of `LeafRef`s taken from a previous view model.
//! While it is non-empty, the next cycle aggregates only the facts whose
//! group key is among the selected group keys AND whose bin (under the full
//! fact set's bin plan) is one of the selected leaves' bins.
//!
//! Leaf identity is (bin keys, group key, color key) compared through the
//! canonical key comparator, so a leaf still matches after a re-render
//! numbered it differently.

use std::collections::HashSet;

use binchart_core::{Key, NormalizedKey};
use serde::{Deserialize, Serialize};

use crate::binning::BinPlan;
use crate::fact::{CrossFilterRef, FactSet};

/// Handle for one rendered leaf, passed back by the UI on click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafRef {
    /// Position in the flat leaf enumeration of the cycle that produced it.
    pub leaf_index: usize,
    pub bin_keys: Vec<Key>,
    pub group_key: Key,
    pub color_key: Option<Key>,
    pub refs: Vec<CrossFilterRef>,
}

impl LeafRef {
    /// Same rendered element, regardless of enumeration index.
    pub fn same_leaf(&self, other: &LeafRef) -> bool {
        self.group_key == other.group_key
            && self.color_key == other.color_key
            && self.bin_keys == other.bin_keys
    }
}

impl PartialEq for LeafRef {
    fn eq(&self, other: &Self) -> bool {
        self.same_leaf(other)
    }
}

/// Current isolation. Empty means "use the full fact store".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsolationState {
    selected: Vec<LeafRef>,
}

impl IsolationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn selected(&self) -> &[LeafRef] {
        &self.selected
    }

    pub fn contains(&self, leaf: &LeafRef) -> bool {
        self.selected.iter().any(|s| s.same_leaf(leaf))
    }

    /// True when `leaf` renders part of a selected leaf: same group and
    /// color, and all of its bin keys inside that leaf's bin. Isolated
    /// cycles re-bin the narrowed facts, so a drilled-into leaf usually
    /// comes back with fewer bin keys than were selected.
    pub fn covers(&self, leaf: &LeafRef) -> bool {
        self.covering(leaf).is_some()
    }

    /// The selected leaf that `leaf` renders part of, if any.
    pub fn covering(&self, leaf: &LeafRef) -> Option<&LeafRef> {
        self.selected.iter().find(|s| {
            s.group_key == leaf.group_key
                && s.color_key == leaf.color_key
                && leaf.bin_keys.iter().all(|k| s.bin_keys.contains(k))
        })
    }

    /// Leaf indices in selection order.
    pub fn selected_leaf_indices(&self) -> Vec<usize> {
        self.selected.iter().map(|s| s.leaf_index).collect()
    }

    /// Distinct bin keys of all selected leaves, first-seen order.
    pub fn isolated_bin_keys(&self) -> Vec<Key> {
        distinct(self.selected.iter().flat_map(|s| s.bin_keys.iter()))
    }

    /// Distinct group keys of all selected leaves, first-seen order.
    pub fn isolated_group_keys(&self) -> Vec<Key> {
        distinct(self.selected.iter().map(|s| &s.group_key))
    }

    /// Toggle a leaf.
    ///
    /// - single (`multi == false`): clicking the only selected leaf clears
    ///   the selection, anything else replaces it with that leaf
    /// - multi: add the leaf, or remove it if already selected
    pub fn toggled(&self, leaf: &LeafRef, multi: bool) -> IsolationState {
        let already = self.contains(leaf);
        let selected = if multi {
            if already {
                self.selected.iter().filter(|s| !s.same_leaf(leaf)).cloned().collect()
            } else {
                let mut next = self.selected.clone();
                next.push(leaf.clone());
                next
            }
        } else if already && self.selected.len() == 1 {
            Vec::new()
        } else {
            vec![leaf.clone()]
        };
        IsolationState { selected }
    }

    pub fn cleared(&self) -> IsolationState {
        IsolationState::default()
    }

    pub fn summary(&self) -> IsolationSummary {
        IsolationSummary {
            active: !self.is_empty(),
            selected_leaf_indices: self.selected_leaf_indices(),
            isolated_bin_keys: self.isolated_bin_keys(),
            isolated_group_keys: self.isolated_group_keys(),
        }
    }
}

/// Serializable view of the isolation for the renderer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IsolationSummary {
    pub active: bool,
    pub selected_leaf_indices: Vec<usize>,
    pub isolated_bin_keys: Vec<Key>,
    pub isolated_group_keys: Vec<Key>,
}

fn distinct<'a, I>(keys: I) -> Vec<Key>
where
    I: Iterator<Item = &'a Key>,
{
    let mut seen = HashSet::new();
    keys.filter(|k| seen.insert(k.normalized()))
        .cloned()
        .collect()
}

/// Facts the next cycle should aggregate.
///
/// `full_plan` must be built from `full` with the current bin settings;
/// bin membership is decided by `full_plan.bin_index`, the same mapping the
/// binning engine uses.
pub fn effective_facts(
    full: &FactSet,
    isolation: &IsolationState,
    full_plan: &BinPlan,
    group_column: usize,
) -> FactSet {
    if isolation.is_empty() {
        return full.clone();
    }

    let groups: HashSet<NormalizedKey> = isolation
        .isolated_group_keys()
        .iter()
        .map(Key::normalized)
        .collect();
    let bins: HashSet<usize> = isolation
        .isolated_bin_keys()
        .iter()
        .filter_map(|k| full_plan.bin_index(&k.normalized()))
        .collect();

    full.filtered(|fact| {
        if !groups.contains(&fact.key(group_column).normalized()) {
            return false;
        }
        if full_plan.is_unbinned() {
            return true;
        }
        full_plan.bin_of(fact).is_some_and(|b| bins.contains(&b))
    })
}
