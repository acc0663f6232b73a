//! Binning Engine: partition facts by the bin column's value.
//!
//! `BinPlan` holds the distinct bin keys in bin order and the chunk size.
//! Partitioning and isolation both map a key to its bin through
//! [`BinPlan::bin_index`], so the `rank / chunk_size` rule exists once.
//!
//! Key invariants:
//! - every fact lands in exactly one bin
//! - numeric/date columns: distinct keys sorted ascending, Blank first,
//!   chunked into groups of `number_of_bins` keys (last chunk may be short)
//! - categorical columns: one bin per distinct key, first-seen order
//! - no hash-map iteration order leaks into bin order or labels

use binchart_config::chart::clamp_bins;
use binchart_core::{ColumnKind, Key, NormalizedKey};
use rustc_hash::FxHashMap;

use crate::error::EngineError;
use crate::fact::{Fact, FactSet};

/// Label of the implicit bin used when no bin column is configured.
pub const UNBINNED_LABEL: &str = "All";

/// One partition of the fact set.
#[derive(Debug, Clone)]
pub struct Bin {
    pub index: usize,
    pub label: String,
    /// Distinct bin-column keys covered by this bin, in bin order.
    /// Empty for the implicit bin.
    pub keys: Vec<Key>,
    pub facts: Vec<Fact>,
}

// =============================================================================
// BinPlan
// =============================================================================

#[derive(Debug, Clone)]
pub struct BinPlan {
    column: Option<usize>,
    kind: ColumnKind,
    chunk_size: usize,
    /// Distinct keys in bin order: first-seen raw key + canonical form.
    distinct: Vec<(Key, NormalizedKey)>,
    ranks: FxHashMap<NormalizedKey, usize>,
}

impl BinPlan {
    /// Scan the bin column and fix the bin layout.
    ///
    /// Fails as soon as more than `max_distinct` distinct keys have been seen.
    pub fn build(
        facts: &FactSet,
        bin_column: Option<usize>,
        number_of_bins: u8,
        max_distinct: usize,
    ) -> Result<Self, EngineError> {
        let Some(column) = bin_column else {
            return Ok(Self::unbinned());
        };

        let mut distinct: Vec<(Key, NormalizedKey)> = Vec::new();
        let mut seen: FxHashMap<NormalizedKey, usize> = FxHashMap::default();

        for fact in &facts.facts {
            let key = fact.key(column);
            let normalized = key.normalized();
            if seen.contains_key(&normalized) {
                continue;
            }
            if distinct.len() == max_distinct {
                return Err(EngineError::BinCardinalityExceeded {
                    distinct: max_distinct + 1,
                    limit: max_distinct,
                });
            }
            seen.insert(normalized.clone(), distinct.len());
            distinct.push((key, normalized));
        }

        let kind = ColumnKind::detect(distinct.iter().map(|(_, n)| n));
        let chunk_size = if kind.is_ordered() {
            // Stable sort: ties cannot occur between distinct canonical keys.
            distinct.sort_by(|a, b| a.1.cmp(&b.1));
            clamp_bins(number_of_bins as i64) as usize
        } else {
            1
        };

        let ranks = distinct
            .iter()
            .enumerate()
            .map(|(rank, (_, n))| (n.clone(), rank))
            .collect();

        Ok(Self {
            column: Some(column),
            kind,
            chunk_size,
            distinct,
            ranks,
        })
    }

    fn unbinned() -> Self {
        Self {
            column: None,
            kind: ColumnKind::Categorical,
            chunk_size: 1,
            distinct: Vec::new(),
            ranks: FxHashMap::default(),
        }
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn is_unbinned(&self) -> bool {
        self.column.is_none()
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn distinct_count(&self) -> usize {
        self.distinct.len()
    }

    pub fn bin_count(&self) -> usize {
        if self.is_unbinned() {
            1
        } else {
            self.distinct.len().div_ceil(self.chunk_size)
        }
    }

    /// Bin index for a key: `rank / chunk_size`. `None` when the key was not
    /// seen while building the plan.
    pub fn bin_index(&self, key: &NormalizedKey) -> Option<usize> {
        if self.is_unbinned() {
            return Some(0);
        }
        self.ranks.get(key).map(|rank| rank / self.chunk_size)
    }

    /// Bin index of a fact under this plan.
    pub fn bin_of(&self, fact: &Fact) -> Option<usize> {
        match self.column {
            None => Some(0),
            Some(column) => self.bin_index(&fact.key(column).normalized()),
        }
    }

    fn chunk(&self, bin: usize) -> &[(Key, NormalizedKey)] {
        let start = (bin * self.chunk_size).min(self.distinct.len());
        let end = (start + self.chunk_size).min(self.distinct.len());
        &self.distinct[start..end]
    }

    pub fn bin_keys(&self, bin: usize) -> Vec<Key> {
        self.chunk(bin).iter().map(|(k, _)| k.clone()).collect()
    }

    /// `(first - last)` for multi-key bins, `(only)` for single-key bins.
    pub fn label(&self, bin: usize) -> String {
        if self.is_unbinned() {
            return UNBINNED_LABEL.to_string();
        }
        match self.chunk(bin) {
            [] => String::new(),
            [(only, _)] => format!("({})", only.display()),
            [(first, _), .., (last, _)] => format!("({} - {})", first.display(), last.display()),
        }
    }

    /// Split facts into this plan's bins, preserving fact order inside each bin.
    ///
    /// Facts whose key the plan never saw cannot occur when the plan was built
    /// from the same fact set; if they do, they are dropped and logged.
    pub fn partition(&self, facts: &FactSet) -> Vec<Bin> {
        let mut bins: Vec<Bin> = (0..self.bin_count())
            .map(|index| Bin {
                index,
                label: self.label(index),
                keys: self.bin_keys(index),
                facts: Vec::new(),
            })
            .collect();

        for fact in &facts.facts {
            match self.bin_of(fact) {
                Some(b) => bins[b].facts.push(fact.clone()),
                None => log::warn!("fact {} has a bin key outside the plan", fact.index),
            }
        }

        bins
    }
}

/// Plan and partition in one step.
pub fn partition(
    facts: &FactSet,
    bin_column: Option<usize>,
    number_of_bins: u8,
    max_distinct: usize,
) -> Result<Vec<Bin>, EngineError> {
    let plan = BinPlan::build(facts, bin_column, number_of_bins, max_distinct)?;
    Ok(plan.partition(facts))
}

// =============================================================================
// Tests
// =============================================================================
