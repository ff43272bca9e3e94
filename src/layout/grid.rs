//! Grid packing and duplex mirroring.
//!
//! All coordinates are PDF points with the origin at the bottom-left corner of
//! the page and Y growing upward.

use anyhow::{Result, anyhow};

/// Position of a card in the paginated grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    pub page: usize,
    pub row: usize,
    pub col: usize,
}

/// Column and row count of one page. Both are at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    rows: usize,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(anyhow!(
                "grid must have at least one row and column (got {cols}x{rows})"
            ));
        }
        Ok(Self { cols, rows })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells_per_page(&self) -> usize {
        self.cols * self.rows
    }

    /// Place a zero-based card index.
    pub fn position(&self, index: usize) -> GridPosition {
        let per_page = self.cells_per_page();
        let slot = index % per_page;
        GridPosition {
            page: index / per_page,
            row: slot / self.cols,
            col: slot % self.cols,
        }
    }

    /// Inverse of [`Grid::position`].
    pub fn index_of(&self, position: GridPosition) -> usize {
        position.page * self.cells_per_page() + position.row * self.cols + position.col
    }

    /// Pages needed for `cards` cards; the last one may be partial.
    pub fn page_count(&self, cards: usize) -> usize {
        cards.div_ceil(self.cells_per_page())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned rectangle anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Largest centered square that keeps `margin` clear on every side.
    pub fn inset_square(&self, margin: f32) -> Rect {
        let side = (self.width.min(self.height) - 2.0 * margin).max(0.0);
        Rect {
            x: self.x + (self.width - side) / 2.0,
            y: self.y + (self.height - side) / 2.0,
            width: side,
            height: side,
        }
    }
}

/// Physical sheet and card dimensions, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Left margin of the first column.
    pub x_start: f32,
    /// Distance from the top edge to the first row.
    pub y_start: f32,
    pub card_width: f32,
    pub card_height: f32,
    /// Vertical registration correction applied to the back face only.
    pub y_shift: f32,
}

impl SheetGeometry {
    /// Cell occupied by the front face.
    pub fn front_cell(&self, position: GridPosition) -> Rect {
        let x = self.x_start + position.col as f32 * self.card_width;
        let y = self.page_height - self.y_start - (position.row + 1) as f32 * self.card_height;
        Rect::new(x, y, self.card_width, self.card_height)
    }

    /// Cell occupied by the back face: the front cell flipped about the
    /// vertical centerline, then shifted by `y_shift`.
    pub fn back_cell(&self, position: GridPosition) -> Rect {
        let front = self.front_cell(position);
        Rect::new(
            self.mirror_x(front.x),
            front.y - self.y_shift,
            self.card_width,
            self.card_height,
        )
    }

    pub fn mirror_x(&self, x: f32) -> f32 {
        self.page_width - x - self.card_width
    }

    /// True when every cell of `grid` lies on the page.
    pub fn fits(&self, grid: Grid) -> bool {
        let right = self.x_start + grid.cols as f32 * self.card_width;
        let bottom = self.page_height - self.y_start - grid.rows as f32 * self.card_height;
        right <= self.page_width && bottom >= 0.0
    }
}
