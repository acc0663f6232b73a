//! The long-lived chart session.
//!
//! Owns the three pieces of state that outlive an update cycle (the
//! configuration, the isolation and the history log) and runs the
//! recompute-from-scratch pipeline:
//!
//! resolve columns -> load facts -> isolate -> bin -> aggregate -> assemble
//!
//! Commands (`apply_configuration`, `toggle_select`, `clear_selection`)
//! push exactly one history entry before changing state; `undo` never
//! pushes. Edits that leave the seven undoable configuration fields alone
//! (text palette, table columns) apply without an entry. None of them re-render; call [`ChartSession::render`] (or
//! `update` with fresh data) afterwards.

use binchart_config::{ChartConfig, ConfigPatch, ConfigSnapshot};

use crate::aggregate::aggregate;
use crate::binning::BinPlan;
use crate::error::EngineError;
use crate::fact::{self, Dataset, FactSet};
use crate::history::{HistoryEntry, HistoryLog};
use crate::isolation::{effective_facts, IsolationState, LeafRef};
use crate::resolve::{resolve_config, resolve_snapshot};
use crate::view_model::{assemble, Validation, ViewModel};

/// Who triggered an update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateOrigin {
    /// Direct user input.
    #[default]
    User,
    /// Host-driven re-render (resize, data refresh). Never recorded.
    Host,
}

/// What an undo restored.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    Configuration(ConfigSnapshot),
    Selection(IsolationState),
    /// Nothing to undo; the UI should disable its control.
    Underflow,
}

impl UndoOutcome {
    pub fn applied(&self) -> bool {
        !matches!(self, UndoOutcome::Underflow)
    }
}

#[derive(Debug)]
pub struct ChartSession {
    config: ChartConfig,
    isolation: IsolationState,
    history: HistoryLog,
    dataset: Dataset,
    previous_columns: Option<Vec<binchart_core::Column>>,
    last_leaf_refs: Vec<LeafRef>,
}

impl Default for ChartSession {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

impl ChartSession {
    pub fn new(config: ChartConfig) -> Self {
        let history = HistoryLog::new(config.limits.history_depth);
        Self {
            config,
            isolation: IsolationState::new(),
            history,
            dataset: Dataset::default(),
            previous_columns: None,
            last_leaf_refs: Vec::new(),
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn isolation(&self) -> &IsolationState {
        &self.isolation
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Leaves of the most recent view model, in leaf-index order.
    pub fn leaf_refs(&self) -> &[LeafRef] {
        &self.last_leaf_refs
    }

    // -------------------------------------------------------------------------
    // Update cycle
    // -------------------------------------------------------------------------

    /// Take a new snapshot of the host's data and recompute everything.
    pub fn update(&mut self, dataset: Dataset, origin: UpdateOrigin) -> ViewModel {
        self.dataset = dataset;
        if origin == UpdateOrigin::Host {
            self.history.suppress();
        }
        let view = self.render();
        if origin == UpdateOrigin::Host {
            self.history.resume();
        }
        view
    }

    /// Recompute from the last dataset with the current state.
    pub fn render(&mut self) -> ViewModel {
        let columns = self.dataset.columns.clone();
        self.config = resolve_config(self.previous_columns.as_deref(), &columns, &self.config);
        self.previous_columns = Some(columns);

        let view = match self.run_pipeline() {
            Ok(view) => view,
            Err(err) => {
                log::warn!("chart cannot render: {err}");
                ViewModel::rejected(&self.config, Validation::from_error(&err), &self.isolation)
            }
        };

        log::debug!(
            "cycle: {} rows, {} bins, {} leaves, isolation {}",
            self.dataset.rows.len(),
            view.bins.len(),
            view.leaf_count(),
            if self.isolation.is_empty() { "off" } else { "on" },
        );
        self.last_leaf_refs = view.leaf_refs.clone();
        view
    }

    fn run_pipeline(&self) -> Result<ViewModel, EngineError> {
        let config = &self.config;
        let limits = &config.limits;
        let full = fact::load(self.dataset.clone(), limits)?;

        let full_plan = BinPlan::build(
            &full,
            config.bin_column,
            config.number_of_bins,
            limits.max_bin_values,
        )?;

        let (bins, effective): (_, FactSet) = if self.isolation.is_empty() {
            (full_plan.partition(&full), full)
        } else {
            let effective = effective_facts(&full, &self.isolation, &full_plan, config.group_column);
            let plan = BinPlan::build(
                &effective,
                config.bin_column,
                config.number_of_bins,
                limits.max_bin_values,
            )?;
            (plan.partition(&effective), effective)
        };

        let aggregates = bins
            .iter()
            .map(|bin| {
                aggregate(
                    &bin.facts,
                    config.group_column,
                    config.color_by_column,
                    config.target_column,
                )
            })
            .collect();

        Ok(assemble(config, &effective, bins, aggregates, &self.isolation))
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Apply a property-pane edit. Returns true if the configuration changed.
    pub fn apply_configuration(&mut self, patch: &ConfigPatch) -> bool {
        let next = self.config.apply(patch);
        if next == self.config {
            return false;
        }
        if next.snapshot() == self.config.snapshot() {
            log::debug!("history: edit outside the undoable fields, not recorded");
        } else {
            self.history
                .push_configuration(self.config.snapshot(), self.previous_columns.clone());
        }
        self.config = next;
        true
    }

    /// Apply a configuration change the host made on its own.
    pub fn apply_host_configuration(&mut self, patch: &ConfigPatch) -> bool {
        self.history.suppress();
        let changed = self.apply_configuration(patch);
        self.history.resume();
        changed
    }

    /// Toggle a leaf in or out of the isolation.
    ///
    /// A leaf drawn inside a selected leaf (isolated cycles re-bin, so it
    /// usually has fewer bin keys) toggles that selected leaf.
    pub fn toggle_select(&mut self, leaf: &LeafRef, multi: bool) {
        let target = self.isolation.covering(leaf).unwrap_or(leaf).clone();
        self.history.push_selection(self.isolation.clone());
        self.isolation = self.isolation.toggled(&target, multi);
    }

    /// Toggle by position in the last view model. False when out of range.
    pub fn select_leaf(&mut self, leaf_index: usize, multi: bool) -> bool {
        let Some(leaf) = self.last_leaf_refs.get(leaf_index).cloned() else {
            log::warn!(
                "leaf {leaf_index} does not exist ({} leaves)",
                self.last_leaf_refs.len()
            );
            return false;
        };
        self.toggle_select(&leaf, multi);
        true
    }

    /// Drop the isolation. Returns false if there was none.
    pub fn clear_selection(&mut self) -> bool {
        if self.isolation.is_empty() {
            return false;
        }
        self.history.push_selection(self.isolation.clone());
        self.isolation = self.isolation.cleared();
        true
    }

    /// Revert the most recent command, whichever kind it was.
    pub fn undo(&mut self) -> UndoOutcome {
        self.history.suppress();
        let outcome = match self.history.undo() {
            Ok(HistoryEntry::Configuration(entry)) => {
                // Ordinals index the layout of their own cycle; the live
                // configuration indexes the last rendered one.
                let snapshot = match (entry.columns.as_deref(), self.previous_columns.as_deref()) {
                    (Some(then), Some(now)) => resolve_snapshot(then, now, &entry.snapshot),
                    _ => entry.snapshot,
                };
                self.config.restore(&snapshot);
                UndoOutcome::Configuration(snapshot)
            }
            Ok(HistoryEntry::Selection(state)) => {
                self.isolation = state.clone();
                UndoOutcome::Selection(state)
            }
            Err(err) => {
                log::debug!("undo: {err}");
                UndoOutcome::Underflow
            }
        };
        self.history.resume();
        outcome
    }
}
