//! Re-resolve stored column ordinals when the host's column list changes shape.

use binchart_config::{ChartConfig, ConfigSnapshot};
use binchart_core::Column;

use crate::error::EngineError;

/// Keep `stored` if the column there still has the same display name;
/// otherwise adopt the first column in `current` carrying the previous
/// name; otherwise fall back to 0.
pub fn resolve(previous: &[Column], current: &[Column], stored: usize) -> usize {
    let Some(prev) = previous.get(stored) else {
        let err = EngineError::InvalidColumnReference {
            ordinal: stored,
            column_count: previous.len(),
        };
        log::warn!("{err}; falling back to column 0");
        return 0;
    };

    if current
        .get(stored)
        .is_some_and(|c| c.display_name == prev.display_name)
    {
        return stored;
    }

    match current
        .iter()
        .position(|c| c.display_name == prev.display_name)
    {
        Some(found) => {
            log::debug!(
                "column '{}' moved from {stored} to {found}",
                prev.display_name
            );
            found
        }
        None => {
            log::warn!(
                "column '{}' is gone; falling back to column 0",
                prev.display_name
            );
            0
        }
    }
}

/// Optional columns stay unset when unset.
pub fn resolve_optional(
    previous: &[Column],
    current: &[Column],
    stored: Option<usize>,
) -> Option<usize> {
    stored.map(|ordinal| resolve(previous, current, ordinal))
}

/// Map an undo snapshot's four column ordinals from the layout it was
/// taken under into `current`.
pub fn resolve_snapshot(
    previous: &[Column],
    current: &[Column],
    snapshot: &ConfigSnapshot,
) -> ConfigSnapshot {
    ConfigSnapshot {
        group_column: resolve(previous, current, snapshot.group_column),
        target_column: resolve(previous, current, snapshot.target_column),
        bin_column: resolve_optional(previous, current, snapshot.bin_column),
        color_by_column: resolve_optional(previous, current, snapshot.color_by_column),
        ..*snapshot
    }
}

/// Resolve every column reference of a configuration in one pass.
///
/// On the first cycle there is no previous list; the current list stands
/// in for it, which keeps valid ordinals and resets invalid ones to 0.
pub fn resolve_config(
    previous: Option<&[Column]>,
    current: &[Column],
    config: &ChartConfig,
) -> ChartConfig {
    let previous = previous.unwrap_or(current);
    let mut resolved = config.clone();
    resolved.restore(&resolve_snapshot(previous, current, &config.snapshot()));
    resolved.selected_table_columns = config
        .selected_table_columns
        .iter()
        .filter_map(|&c| {
            previous
                .get(c)
                .and_then(|p| current.iter().position(|n| n.display_name == p.display_name))
        })
        .collect();
    resolved
}
