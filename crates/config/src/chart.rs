// Chart configuration
// Loaded from the host's property pane (JSON) or a chart TOML file

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::limits::EngineLimits;
use crate::palette::{PaletteChoice, TextPaletteChoice};
use crate::ConfigError;

pub const MIN_BINS: u8 = 1;
pub const MAX_BINS: u8 = 10;

/// Clamp a requested bin count into [MIN_BINS, MAX_BINS].
pub fn clamp_bins(requested: i64) -> u8 {
    requested.clamp(MIN_BINS as i64, MAX_BINS as i64) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Bar,
    Column,
    Brick,
    Table,
}

// ---------------------------------------------------------------------------
// Full configuration
// ---------------------------------------------------------------------------

/// Live chart configuration. Column fields are ordinals into the current
/// cycle's column list; `None` is the host's `-1` ("not set").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub chart_kind: ChartKind,
    pub group_column: usize,
    pub target_column: usize,
    #[serde(with = "column_sentinel")]
    pub bin_column: Option<usize>,
    #[serde(with = "column_sentinel")]
    pub color_by_column: Option<usize>,
    #[serde(deserialize_with = "deserialize_bins")]
    pub number_of_bins: u8,
    pub palette: PaletteChoice,
    pub text_palette: TextPaletteChoice,
    pub selected_table_columns: Vec<usize>,
    pub limits: EngineLimits,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            chart_kind: ChartKind::Bar,
            group_column: 0,
            target_column: 0,
            bin_column: None,
            color_by_column: None,
            number_of_bins: MIN_BINS,
            palette: PaletteChoice::Default,
            text_palette: TextPaletteChoice::Dark,
            selected_table_columns: Vec::new(),
            limits: EngineLimits::default(),
        }
    }
}

impl ChartConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: ChartConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: ChartConfig =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BINS..=MAX_BINS).contains(&self.number_of_bins) {
            return Err(ConfigError::Validation(format!(
                "number_of_bins must be between {MIN_BINS} and {MAX_BINS}, got {}",
                self.number_of_bins
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for col in &self.selected_table_columns {
            if !seen.insert(*col) {
                return Err(ConfigError::Validation(format!(
                    "selected_table_columns lists column {col} twice"
                )));
            }
        }

        if self.limits.max_rows == 0 || self.limits.max_bin_values == 0 {
            return Err(ConfigError::Validation(
                "limits must allow at least one row and one bin value".into(),
            ));
        }

        Ok(())
    }

    /// Patched copy. Fields absent from the patch keep their value.
    pub fn apply(&self, patch: &ConfigPatch) -> ChartConfig {
        let mut next = self.clone();
        if let Some(kind) = patch.chart_kind {
            next.chart_kind = kind;
        }
        if let Some(col) = patch.group_column {
            next.group_column = col;
        }
        if let Some(col) = patch.target_column {
            next.target_column = col;
        }
        if let Some(col) = patch.bin_column {
            next.bin_column = col;
        }
        if let Some(col) = patch.color_by_column {
            next.color_by_column = col;
        }
        if let Some(bins) = patch.number_of_bins {
            next.number_of_bins = clamp_bins(bins);
        }
        if let Some(palette) = patch.palette {
            next.palette = palette;
        }
        if let Some(text_palette) = patch.text_palette {
            next.text_palette = text_palette;
        }
        if let Some(cols) = &patch.selected_table_columns {
            next.selected_table_columns = cols.clone();
        }
        next
    }

    /// The undoable part of the configuration.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            chart_kind: self.chart_kind,
            group_column: self.group_column,
            target_column: self.target_column,
            bin_column: self.bin_column,
            color_by_column: self.color_by_column,
            number_of_bins: self.number_of_bins,
            palette: self.palette,
        }
    }

    /// Replace all seven undoable fields at once.
    pub fn restore(&mut self, snapshot: &ConfigSnapshot) {
        self.chart_kind = snapshot.chart_kind;
        self.group_column = snapshot.group_column;
        self.target_column = snapshot.target_column;
        self.bin_column = snapshot.bin_column;
        self.color_by_column = snapshot.color_by_column;
        self.number_of_bins = snapshot.number_of_bins;
        self.palette = snapshot.palette;
    }
}

// ---------------------------------------------------------------------------
// Snapshot + Patch
// ---------------------------------------------------------------------------

/// Immutable copy of the seven fields a configuration undo restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub chart_kind: ChartKind,
    pub group_column: usize,
    pub target_column: usize,
    #[serde(with = "column_sentinel")]
    pub bin_column: Option<usize>,
    #[serde(with = "column_sentinel")]
    pub color_by_column: Option<usize>,
    pub number_of_bins: u8,
    pub palette: PaletteChoice,
}

/// Partial update from the property pane. `bin_column: -1` clears the
/// bin column; omitting it leaves it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub chart_kind: Option<ChartKind>,
    pub group_column: Option<usize>,
    pub target_column: Option<usize>,
    #[serde(deserialize_with = "column_sentinel::deserialize_patch")]
    pub bin_column: Option<Option<usize>>,
    #[serde(deserialize_with = "column_sentinel::deserialize_patch")]
    pub color_by_column: Option<Option<usize>>,
    pub number_of_bins: Option<i64>,
    pub palette: Option<PaletteChoice>,
    pub text_palette: Option<TextPaletteChoice>,
    pub selected_table_columns: Option<Vec<usize>>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        *self == ConfigPatch::default()
    }
}

fn deserialize_bins<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(clamp_bins(raw))
}

/// `-1` on the wire, `None` in Rust.
mod column_sentinel {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(col) => serializer.serialize_i64(*col as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok())
    }

    pub fn deserialize_patch<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<usize>>, D::Error> {
        deserialize(deserializer).map(Some)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
