//! Undo history for configuration and selection changes
//!
//! One ordered log of entry kinds decides pop order; two typed stacks hold
//! the snapshots. Undo pops the newest kind, then the newest snapshot of
//! that kind, so configuration and selection undo interleave in exactly
//! the reverse order the user acted.

use binchart_config::ConfigSnapshot;
use binchart_core::Column;
use serde::Serialize;

use crate::error::EngineError;
use crate::isolation::IsolationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Configuration,
    Selection,
}

/// A configuration snapshot plus the column layout its ordinals index.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    pub snapshot: ConfigSnapshot,
    /// `None` when taken before the first cycle.
    pub columns: Option<Vec<Column>>,
}

/// A snapshot popped by undo; the caller restores it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    Configuration(ConfigEntry),
    Selection(IsolationState),
}

impl HistoryEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            HistoryEntry::Configuration(_) => EntryKind::Configuration,
            HistoryEntry::Selection(_) => EntryKind::Selection,
        }
    }
}

#[derive(Debug)]
pub struct HistoryLog {
    order: Vec<EntryKind>,
    configurations: Vec<ConfigEntry>,
    selections: Vec<IsolationState>,
    /// `None` keeps every entry until it is undone.
    max_entries: Option<usize>,
    /// Nesting depth of suppression scopes (undo in progress, host update).
    suppressed: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HistoryLog {
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            order: Vec::new(),
            configurations: Vec::new(),
            selections: Vec::new(),
            max_entries: max_entries.map(|n| n.max(1)),
            suppressed: 0,
        }
    }

    /// Record the configuration as it was before a user change, with the
    /// column list its ordinals refer to. Returns false when recording is
    /// suppressed.
    pub fn push_configuration(
        &mut self,
        snapshot: ConfigSnapshot,
        columns: Option<Vec<Column>>,
    ) -> bool {
        if self.is_suppressed() {
            log::debug!("history: configuration push suppressed");
            return false;
        }
        self.configurations.push(ConfigEntry { snapshot, columns });
        self.push_kind(EntryKind::Configuration);
        true
    }

    /// Record the isolation as it was before a user change.
    /// Returns false when recording is suppressed.
    pub fn push_selection(&mut self, snapshot: IsolationState) -> bool {
        if self.is_suppressed() {
            log::debug!("history: selection push suppressed");
            return false;
        }
        self.selections.push(snapshot);
        self.push_kind(EntryKind::Selection);
        true
    }

    fn push_kind(&mut self, kind: EntryKind) {
        self.order.push(kind);

        // Opt-in cap: drop the oldest entry and its snapshot together
        if self.max_entries.is_some_and(|max| self.order.len() > max) {
            match self.order.remove(0) {
                EntryKind::Configuration => {
                    self.configurations.remove(0);
                }
                EntryKind::Selection => {
                    self.selections.remove(0);
                }
            }
        }
    }

    /// Pop the most recent entry.
    pub fn undo(&mut self) -> Result<HistoryEntry, EngineError> {
        let kind = self.order.pop().ok_or(EngineError::HistoryUnderflow)?;
        let entry = match kind {
            EntryKind::Configuration => self.configurations.pop().map(HistoryEntry::Configuration),
            EntryKind::Selection => self.selections.pop().map(HistoryEntry::Selection),
        };
        entry.ok_or_else(|| {
            log::error!("history: {kind:?} tag without a snapshot");
            EngineError::HistoryUnderflow
        })
    }

    pub fn can_undo(&self) -> bool {
        !self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Kinds, oldest first.
    pub fn kinds(&self) -> &[EntryKind] {
        &self.order
    }

    pub fn suppress(&mut self) {
        self.suppressed += 1;
    }

    pub fn resume(&mut self) {
        self.suppressed = self.suppressed.saturating_sub(1);
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed > 0
    }
}
