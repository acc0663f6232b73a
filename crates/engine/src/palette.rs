//! Deterministic color-by assignment.

use std::collections::BTreeSet;

use binchart_config::{Color, PaletteChoice};
use binchart_core::{keys_match, Key};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorAssignment {
    pub key: Key,
    pub color: Color,
}

/// Sort the distinct color keys canonically and hand out palette colors in
/// that order. Same keys in, same colors out, regardless of input order.
pub fn assign_colors<'a, I>(keys: I, palette: PaletteChoice) -> Vec<ColorAssignment>
where
    I: IntoIterator<Item = &'a Key>,
{
    let distinct: BTreeSet<&Key> = keys.into_iter().collect();
    distinct
        .into_iter()
        .enumerate()
        .map(|(i, key)| ColorAssignment {
            key: key.clone(),
            color: palette.color_at(i),
        })
        .collect()
}

/// Look up the color assigned to a key.
pub fn color_for(assignments: &[ColorAssignment], key: &Key) -> Option<Color> {
    assignments.iter().find(|a| keys_match(&a.key, key)).map(|a| a.color)
}
