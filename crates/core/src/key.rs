//! Comparable keys for bin, group and color-by values.
//!
//! A key can reach the engine as a number, as a formatted string, or as a
//! date string, and the same logical value must compare equal in all three
//! forms. `Key` keeps the raw value for display; `NormalizedKey` is the one
//! canonical form used for equality, ordering and hashing:
//!
//! 1. numeric parse (`"10"` and `10.0` are the same key)
//! 2. date parse (`"2024-03-01"` and `"03/01/2024"` are the same key)
//! 3. exact text
//!
//! `Key` implements `Eq`, `Ord` and `Hash` by delegating to
//! `normalized()`, so a `HashSet<Key>` or `BTreeMap<Key, _>` already uses
//! the canonical comparison.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// Date layouts accepted by the date fallback, tried in order.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

// =============================================================================
// Key: raw value as seen in the data
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Blank,
    Number(OrderedFloat<f64>),
    Text(String),
}

impl Key {
    pub fn from_cell(cell: &Cell) -> Self {
        match cell {
            Cell::Null => Key::Blank,
            Cell::Number(n) if n.is_nan() => Key::Blank,
            Cell::Number(n) => Key::Number(OrderedFloat(*n)),
            Cell::Text(s) => Key::Text(s.clone()),
        }
    }

    pub fn number(n: f64) -> Self {
        Key::from_cell(&Cell::Number(n))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Key::Text(s.into())
    }

    /// Canonical form: numeric parse, then date parse, then exact text.
    pub fn normalized(&self) -> NormalizedKey {
        match self {
            Key::Blank => NormalizedKey::Blank,
            Key::Number(n) => NormalizedKey::Number(*n),
            Key::Text(s) => {
                if let Some(n) = parse_number(s) {
                    NormalizedKey::Number(OrderedFloat(n))
                } else if let Some(dt) = parse_date(s) {
                    NormalizedKey::Date(dt)
                } else {
                    NormalizedKey::Text(s.clone())
                }
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Key::Blank)
    }

    /// Label text. Raw text is shown as the host sent it.
    pub fn display(&self) -> String {
        match self {
            Key::Blank => "(Blank)".to_string(),
            Key::Number(n) => format_number(n.0),
            Key::Text(s) => s.clone(),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized().cmp(&other.normalized())
    }
}

/// The single equality test for keys coming from different representations.
pub fn keys_match(a: &Key, b: &Key) -> bool {
    a.normalized() == b.normalized()
}

// =============================================================================
// NormalizedKey: canonical comparison form
// =============================================================================

/// Canonical key. Variant order is the cross-type sort order:
/// Blank < Number < Date < Text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NormalizedKey {
    Blank,
    Number(OrderedFloat<f64>),
    Date(NaiveDateTime),
    Text(String),
}

impl NormalizedKey {
    pub fn display(&self) -> String {
        match self {
            NormalizedKey::Blank => "(Blank)".to_string(),
            NormalizedKey::Number(n) => format_number(n.0),
            NormalizedKey::Date(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            NormalizedKey::Text(s) => s.clone(),
        }
    }
}

// =============================================================================
// ColumnKind: how a column's keys should be ordered
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Date,
    Categorical,
}

impl ColumnKind {
    /// All non-blank keys numeric → Numeric, all dates → Date, otherwise
    /// Categorical. A column with no non-blank keys is Categorical.
    pub fn detect<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a NormalizedKey>,
    {
        let mut kind: Option<ColumnKind> = None;
        for key in keys {
            let this = match key {
                NormalizedKey::Blank => continue,
                NormalizedKey::Number(_) => ColumnKind::Numeric,
                NormalizedKey::Date(_) => ColumnKind::Date,
                NormalizedKey::Text(_) => return ColumnKind::Categorical,
            };
            match kind {
                None => kind = Some(this),
                Some(k) if k != this => return ColumnKind::Categorical,
                Some(_) => {}
            }
        }
        kind.unwrap_or(ColumnKind::Categorical)
    }

    /// Numeric and date columns are sorted; categorical ones keep first-seen order.
    pub fn is_ordered(self) -> bool {
        !matches!(self, ColumnKind::Categorical)
    }
}

// =============================================================================
// Parsing helpers
// =============================================================================

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d.and_time(chrono::NaiveTime::MIN));
        }
    }
    None
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn numeric_text_matches_number() {
        assert!(keys_match(&Key::text("10"), &Key::number(10.0)));
        assert!(keys_match(&Key::text(" 10.0 "), &Key::number(10.0)));
        assert!(!keys_match(&Key::text("10a"), &Key::number(10.0)));
    }

    #[test]
    fn date_forms_match() {
        assert!(keys_match(&Key::text("2024-03-01"), &Key::text("03/01/2024")));
        assert!(keys_match(
            &Key::text("2024-03-01T00:00:00"),
            &Key::text("2024-03-01")
        ));
        assert!(!keys_match(&Key::text("2024-03-01"), &Key::text("2024-03-02")));
    }

    #[test]
    fn text_is_exact() {
        assert!(keys_match(&Key::text("Berlin"), &Key::text("Berlin")));
        assert!(!keys_match(&Key::text("Berlin"), &Key::text("berlin")));
        assert!(!keys_match(&Key::text("Berlin"), &Key::Blank));
    }

    #[test]
    fn nan_is_blank() {
        assert!(Key::number(f64::NAN).is_blank());
    }

    #[test]
    fn ordering_blank_first_then_numbers() {
        let mut keys = vec![
            Key::text("zeta"),
            Key::number(3.0),
            Key::Blank,
            Key::text("2020-01-01"),
            Key::text("1"),
        ];
        keys.sort();
        assert!(keys[0].is_blank());
        assert_eq!(keys[1], Key::number(1.0));
        assert_eq!(keys[2], Key::number(3.0));
        assert_eq!(keys[3].normalized().display(), "2020-01-01");
        assert_eq!(keys[4], Key::text("zeta"));
    }

    #[test]
    fn hash_uses_canonical_form() {
        let mut set = HashSet::new();
        set.insert(Key::number(10.0));
        assert!(set.contains(&Key::text("10")));
        assert!(!set.insert(Key::text("10")));
    }

    #[test]
    fn column_kind_detection() {
        let numeric = [Key::number(1.0), Key::Blank, Key::text("2")];
        let normalized: Vec<_> = numeric.iter().map(Key::normalized).collect();
        assert_eq!(ColumnKind::detect(&normalized), ColumnKind::Numeric);

        let dates = [Key::text("2024-01-01"), Key::text("01/02/2024")];
        let normalized: Vec<_> = dates.iter().map(Key::normalized).collect();
        assert_eq!(ColumnKind::detect(&normalized), ColumnKind::Date);

        let mixed = [Key::number(1.0), Key::text("2024-01-01")];
        let normalized: Vec<_> = mixed.iter().map(Key::normalized).collect();
        assert_eq!(ColumnKind::detect(&normalized), ColumnKind::Categorical);

        assert_eq!(ColumnKind::detect(&[NormalizedKey::Blank]), ColumnKind::Categorical);
    }

    #[test]
    fn display() {
        assert_eq!(Key::number(12.0).display(), "12");
        assert_eq!(Key::number(12.5).display(), "12.5");
        assert_eq!(Key::Blank.display(), "(Blank)");
        assert_eq!(Key::text("03/01/2024").display(), "03/01/2024");
        assert_eq!(Key::text("03/01/2024").normalized().display(), "2024-03-01");
    }
}
