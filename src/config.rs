//! Layout profile, loadable from TOML.
//!
//! Lengths are millimetres and font sizes are points. Every key is optional;
//! missing keys keep the defaults below.
//!
//! ```toml
//! paper = "a4"
//! cols = 3
//! rows = 4
//! y_shift_mm = 1.2
//! ```

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::layout::{BackTypography, DeckLayout, Grid, SheetGeometry, mm_to_pt};

const LETTER_WIDTH_IN: f32 = 8.5;
const LETTER_HEIGHT_IN: f32 = 11.0;
const A4_WIDTH_IN: f32 = 8.27;
const A4_HEIGHT_IN: f32 = 11.69;

/// Portrait paper sizes the deck can be printed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    Letter,
    A4,
}

impl PaperSize {
    /// Width and height in points.
    pub fn dimensions_pt(self) -> (f32, f32) {
        let (w, h) = match self {
            PaperSize::Letter => (LETTER_WIDTH_IN, LETTER_HEIGHT_IN),
            PaperSize::A4 => (A4_WIDTH_IN, A4_HEIGHT_IN),
        };
        (w * 72.0, h * 72.0)
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperSize::Letter => write!(f, "letter"),
            PaperSize::A4 => write!(f, "a4"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub paper: PaperSize,
    pub cols: usize,
    pub rows: usize,
    pub card_width_mm: f32,
    pub card_height_mm: f32,
    pub x_start_mm: f32,
    pub y_start_mm: f32,
    /// Back-face vertical correction for printer duplex drift.
    pub y_shift_mm: f32,
    pub code_margin_mm: f32,
    pub border_width_pt: f32,
    pub year_size_pt: f32,
    pub title_size_pt: f32,
    pub artist_size_pt: f32,
    pub year_drop_mm: f32,
    pub title_rise_mm: f32,
    pub title_leading_mm: f32,
    pub artist_leading_mm: f32,
    pub block_gap_mm: f32,
    pub text_padding_mm: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            paper: PaperSize::Letter,
            cols: 3,
            rows: 4,
            card_width_mm: 60.0,
            card_height_mm: 60.0,
            x_start_mm: 18.0,
            y_start_mm: 22.0,
            y_shift_mm: 0.0,
            code_margin_mm: 10.0,
            border_width_pt: 0.5,
            year_size_pt: 22.0,
            title_size_pt: 9.0,
            artist_size_pt: 8.5,
            year_drop_mm: 18.0,
            title_rise_mm: 6.0,
            title_leading_mm: 4.2,
            artist_leading_mm: 4.0,
            block_gap_mm: 2.5,
            text_padding_mm: 6.0,
        }
    }
}

impl LayoutConfig {
    /// Load a profile from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read layout profile {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("failed to parse layout profile {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: LayoutConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Grid::new(self.cols, self.rows)?;
        if self.card_width_mm <= 0.0 || self.card_height_mm <= 0.0 {
            return Err(anyhow!("card dimensions must be positive"));
        }
        let sizes = [self.year_size_pt, self.title_size_pt, self.artist_size_pt];
        if sizes.iter().any(|s| *s <= 0.0) {
            return Err(anyhow!("font sizes must be positive"));
        }
        if 2.0 * self.text_padding_mm >= self.card_width_mm {
            return Err(anyhow!("text padding leaves no room for text"));
        }
        Ok(())
    }

    /// Convert to the point-based layout used for drawing.
    pub fn resolve(&self) -> Result<DeckLayout> {
        self.validate()?;
        let (page_width, page_height) = self.paper.dimensions_pt();
        Ok(DeckLayout {
            grid: Grid::new(self.cols, self.rows)?,
            sheet: SheetGeometry {
                page_width,
                page_height,
                x_start: mm_to_pt(self.x_start_mm),
                y_start: mm_to_pt(self.y_start_mm),
                card_width: mm_to_pt(self.card_width_mm),
                card_height: mm_to_pt(self.card_height_mm),
                y_shift: mm_to_pt(self.y_shift_mm),
            },
            code_margin: mm_to_pt(self.code_margin_mm),
            border_width: self.border_width_pt,
            back: BackTypography {
                year_size: self.year_size_pt,
                title_size: self.title_size_pt,
                artist_size: self.artist_size_pt,
                year_drop: mm_to_pt(self.year_drop_mm),
                title_rise: mm_to_pt(self.title_rise_mm),
                title_leading: mm_to_pt(self.title_leading_mm),
                artist_leading: mm_to_pt(self.artist_leading_mm),
                block_gap: mm_to_pt(self.block_gap_mm),
                text_padding: mm_to_pt(self.text_padding_mm),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_describe_letter_three_by_four() {
        let layout = LayoutConfig::default().resolve().unwrap();
        assert_eq!(layout.grid, Grid::new(3, 4).unwrap());
        assert_eq!(layout.sheet.page_width, 612.0);
        assert_eq!(layout.sheet.page_height, 792.0);
        assert_eq!(layout.sheet.y_shift, 0.0);
        assert!(layout.sheet.fits(layout.grid));
    }

    #[test]
    fn partial_profile_keeps_defaults() {
        let config = LayoutConfig::from_toml("paper = \"a4\"\ny_shift_mm = 1.5\n").unwrap();
        assert_eq!(config.paper, PaperSize::A4);
        assert_eq!(config.y_shift_mm, 1.5);
        assert_eq!(config.cols, 3);
        let layout = config.resolve().unwrap();
        assert!((layout.sheet.y_shift - mm_to_pt(1.5)).abs() < 1e-4);
    }

    #[test]
    fn rejects_empty_grid_and_unknown_keys() {
        assert!(LayoutConfig::from_toml("cols = 0").is_err());
        assert!(LayoutConfig::from_toml("colums = 4").is_err());
    }
}
