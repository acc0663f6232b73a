// Fixed color palettes for color-by series and labels

use crate::Color;
use serde::{Deserialize, Serialize};

const DEFAULT_COLORS: &[u32] = &[
    0x01b8aa, 0x374649, 0xfd625e, 0xf2c80f, 0x5f6b6d, 0x8ad4eb, 0xfe9666, 0xa66999, 0x3599b8,
    0xdfbfbf,
];
const PASTEL_COLORS: &[u32] = &[
    0xa8e6cf, 0xdcedc1, 0xffd3b6, 0xffaaa5, 0xff8b94, 0xb5c7ed, 0xc3aed6, 0xf6eac2,
];
const BOLD_COLORS: &[u32] = &[
    0xe6194b, 0x3cb44b, 0xffe119, 0x4363d8, 0xf58231, 0x911eb4, 0x46f0f0, 0xf032e6,
];
const MONOCHROME_COLORS: &[u32] = &[0x1e293b, 0x334155, 0x475569, 0x64748b, 0x94a3b8, 0xcbd5e1];

/// Palette used for color-by series (and the single series when color-by is off).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteChoice {
    #[default]
    Default,
    Pastel,
    Bold,
    Monochrome,
}

impl PaletteChoice {
    fn hex_values(self) -> &'static [u32] {
        match self {
            Self::Default => DEFAULT_COLORS,
            Self::Pastel => PASTEL_COLORS,
            Self::Bold => BOLD_COLORS,
            Self::Monochrome => MONOCHROME_COLORS,
        }
    }

    pub fn len(self) -> usize {
        self.hex_values().len()
    }

    /// Color for the i-th series. Wraps around when there are more series than colors.
    pub fn color_at(self, index: usize) -> Color {
        let values = self.hex_values();
        Color::from_hex(values[index % values.len()])
    }
}

/// Label color scheme, independent of the series palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPaletteChoice {
    #[default]
    Dark,
    Light,
}

impl TextPaletteChoice {
    pub fn label_color(self) -> Color {
        match self {
            Self::Dark => Color::from_hex(0x252423),
            Self::Light => Color::from_hex(0xf3f2f1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_at_wraps() {
        let p = PaletteChoice::Monochrome;
        assert_eq!(p.color_at(0), p.color_at(p.len()));
        assert_ne!(p.color_at(0), p.color_at(1));
    }

    #[test]
    fn every_palette_non_empty() {
        for p in [
            PaletteChoice::Default,
            PaletteChoice::Pastel,
            PaletteChoice::Bold,
            PaletteChoice::Monochrome,
        ] {
            assert!(p.len() > 0);
        }
    }
}
