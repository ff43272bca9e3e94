//! Page geometry, grid packing and text fitting for card decks.

mod grid;
mod text;

pub use grid::{Grid, GridPosition, Point, Rect, SheetGeometry};
pub use text::{
    DEFAULT_MAX_LINES, FontMetrics, Helvetica, TITLE_MAX_LINES, encode_win_ansi, win_ansi_byte,
    wrap_lines,
};

/// Points per millimetre.
pub const MM: f32 = 72.0 / 25.4;

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM
}

pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM
}

/// Placement of the text blocks on a card back, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackTypography {
    pub year_size: f32,
    pub title_size: f32,
    pub artist_size: f32,
    /// Distance from the top of the cell down to the year baseline.
    pub year_drop: f32,
    /// Height of the first title baseline above the cell's middle.
    pub title_rise: f32,
    pub title_leading: f32,
    pub artist_leading: f32,
    /// Extra space between the title block and the artist block.
    pub block_gap: f32,
    /// Horizontal padding kept clear on each side of wrapped text.
    pub text_padding: f32,
}

/// Everything needed to place and draw both faces of a deck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeckLayout {
    pub grid: Grid,
    pub sheet: SheetGeometry,
    /// Clear margin around the code image inside a front cell.
    pub code_margin: f32,
    pub back: BackTypography,
    pub border_width: f32,
}

impl DeckLayout {
    /// Width available to wrapped text on a card back.
    pub fn text_width(&self) -> f32 {
        self.sheet.card_width - 2.0 * self.back.text_padding
    }
}
