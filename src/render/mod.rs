//! Drawing card faces onto paginated surfaces.
//!
//! Front and back documents are filled page by page in lock-step so that page
//! `n` of one always carries the counterpart faces of page `n` of the other.

mod duplex;
mod pdf;

pub use duplex::{interleave, write_duplex};
pub use pdf::{PdfSheetWriter, save_document};

use anyhow::{Result, anyhow};
use image::GrayImage;

use crate::deck::{Card, Deck};
use crate::layout::{
    DEFAULT_MAX_LINES, DeckLayout, FontMetrics, Point, Rect, TITLE_MAX_LINES, wrap_lines,
};

/// A page-oriented drawing target in PDF user space.
pub trait Surface {
    fn stroke_rect(&mut self, rect: Rect, line_width: f32);

    fn draw_image(&mut self, image: &GrayImage, rect: Rect) -> Result<()>;

    /// Draw `text` with its baseline starting at `origin`.
    fn draw_text(&mut self, origin: Point, size: f32, text: &str);

    /// Close the current page and start a new one.
    fn finish_page(&mut self) -> Result<()>;
}

/// Draw the front face: code image centered in the cell, then the cut border.
pub fn render_front<S: Surface + ?Sized>(
    surface: &mut S,
    layout: &DeckLayout,
    card: &Card,
    image: &GrayImage,
) -> Result<()> {
    let cell = layout.sheet.front_cell(layout.grid.position(card.index));
    surface.draw_image(image, cell.inset_square(layout.code_margin))?;
    surface.stroke_rect(cell, layout.border_width);
    Ok(())
}

/// Draw the back face at the mirrored cell: year, wrapped title, wrapped artist.
pub fn render_back<S: Surface + ?Sized, M: FontMetrics + ?Sized>(
    surface: &mut S,
    metrics: &M,
    layout: &DeckLayout,
    card: &Card,
) {
    let cell = layout.sheet.back_cell(layout.grid.position(card.index));
    let typo = &layout.back;
    surface.stroke_rect(cell, layout.border_width);

    let mut centered = |y: f32, size: f32, text: &str| {
        let width = metrics.text_width(text, size);
        let x = cell.x + (cell.width - width) / 2.0;
        surface.draw_text(Point { x, y }, size, text);
    };

    let year = card.track.year.trim();
    if !year.is_empty() {
        centered(cell.y + cell.height - typo.year_drop, typo.year_size, year);
    }

    let max_width = layout.text_width();
    let mut y = cell.y + cell.height / 2.0 + typo.title_rise;
    for line in wrap_lines(metrics, &card.track.title, typo.title_size, max_width, TITLE_MAX_LINES) {
        centered(y, typo.title_size, &line);
        y -= typo.title_leading;
    }

    y -= typo.block_gap;
    for line in wrap_lines(metrics, &card.track.artist, typo.artist_size, max_width, DEFAULT_MAX_LINES) {
        centered(y, typo.artist_size, &line);
        y -= typo.artist_leading;
    }
}

/// Render every card of `deck` onto `front` and `back`.
///
/// `images[i]` is the code image of card `i`. Returns the number of pages
/// written to each surface.
pub fn render_deck<F, B, M>(
    deck: &Deck,
    layout: &DeckLayout,
    metrics: &M,
    images: &[GrayImage],
    front: &mut F,
    back: &mut B,
) -> Result<usize>
where
    F: Surface + ?Sized,
    B: Surface + ?Sized,
    M: FontMetrics + ?Sized,
{
    if images.len() != deck.len() {
        return Err(anyhow!(
            "{} code images supplied for {} cards",
            images.len(),
            deck.len()
        ));
    }
    let mut pages = 0;
    for page in deck.pages(layout.grid) {
        for card in page {
            render_front(front, layout, card, &images[card.index])?;
        }
        for card in page {
            render_back(back, metrics, layout, card);
        }
        front.finish_page()?;
        back.finish_page()?;
        pages += 1;
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::Helvetica;
    use crate::track::TrackRecord;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Rect(Rect),
        Image(Rect),
        Text(Point, f32, String),
        Page,
    }

    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<Op>,
    }

    impl RecordingSurface {
        fn pages(&self) -> Vec<Vec<Op>> {
            self.ops
                .split(|op| *op == Op::Page)
                .map(<[Op]>::to_vec)
                .collect()
        }

        fn texts(&self) -> Vec<(Point, f32, String)> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text(p, s, t) => Some((*p, *s, t.clone())),
                    _ => None,
                })
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn stroke_rect(&mut self, rect: Rect, _: f32) {
            self.ops.push(Op::Rect(rect));
        }

        fn draw_image(&mut self, _: &GrayImage, rect: Rect) -> Result<()> {
            self.ops.push(Op::Image(rect));
            Ok(())
        }

        fn draw_text(&mut self, origin: Point, size: f32, text: &str) {
            self.ops.push(Op::Text(origin, size, text.to_string()));
        }

        fn finish_page(&mut self) -> Result<()> {
            self.ops.push(Op::Page);
            Ok(())
        }
    }

    fn deck(n: usize) -> Deck {
        Deck::from_tracks(
            (0..n)
                .map(|i| {
                    TrackRecord::new(
                        format!("spotify:track:{i:0>22}"),
                        format!("Song {i}"),
                        "Artist".to_string(),
                        "1999".to_string(),
                    )
                })
                .collect(),
        )
    }

    fn images(n: usize) -> Vec<GrayImage> {
        (0..n).map(|_| GrayImage::new(1, 1)).collect()
    }

    #[test]
    fn thirteen_cards_fill_two_pages_on_each_side() {
        let layout = LayoutConfig::default().resolve().unwrap();
        let deck = deck(13);
        let mut front = RecordingSurface::default();
        let mut back = RecordingSurface::default();
        let pages =
            render_deck(&deck, &layout, &Helvetica, &images(13), &mut front, &mut back).unwrap();
        assert_eq!(pages, 2);

        let front_pages = front.pages();
        // Trailing empty slice after the final page break.
        assert_eq!(front_pages.len(), 3);
        assert_eq!(front_pages[0].len(), 24);
        assert_eq!(
            front_pages[1],
            vec![
                Op::Image(layout.sheet.front_cell(layout.grid.position(12)).inset_square(layout.code_margin)),
                Op::Rect(layout.sheet.front_cell(layout.grid.position(12))),
            ]
        );
        let back_rects = back.pages()[1]
            .iter()
            .filter(|op| matches!(op, Op::Rect(_)))
            .count();
        assert_eq!(back_rects, 1);
    }

    #[test]
    fn back_text_is_centered_in_mirrored_cell() {
        let layout = LayoutConfig::default().resolve().unwrap();
        let deck = deck(1);
        let mut back = RecordingSurface::default();
        render_back(&mut back, &Helvetica, &layout, &deck.cards()[0]);
        let cell = layout.sheet.back_cell(layout.grid.position(0));
        assert_eq!(back.ops[0], Op::Rect(cell));
        let texts = back.texts();
        assert_eq!(
            texts.iter().map(|t| t.2.as_str()).collect::<Vec<_>>(),
            vec!["1999", "Song 0", "Artist"]
        );
        for (origin, size, text) in &texts {
            let width = Helvetica.text_width(text, *size);
            let left = origin.x - cell.x;
            let right = cell.x + cell.width - (origin.x + width);
            assert!((left - right).abs() < 1e-3, "{text} is off-center");
        }
        let (year, title, artist) = (&texts[0], &texts[1], &texts[2]);
        assert!(year.0.y > title.0.y && title.0.y > artist.0.y);
        assert_eq!(year.1, layout.back.year_size);
    }

    #[test]
    fn blank_fields_draw_fewer_lines() {
        let layout = LayoutConfig::default().resolve().unwrap();
        let deck = Deck::from_tracks(vec![TrackRecord::new(
            "spotify:track:3KkXRkHbMCARz0aVfEt68P",
            "",
            "",
            "",
        )]);
        let mut back = RecordingSurface::default();
        render_back(&mut back, &Helvetica, &layout, &deck.cards()[0]);
        assert!(back.texts().is_empty());
        assert_eq!(back.ops.len(), 1);
    }

    #[test]
    fn y_shift_moves_backs_only() {
        let mut config = LayoutConfig::default();
        config.y_shift_mm = 3.0;
        let layout = config.resolve().unwrap();
        let deck = deck(1);
        let mut front = RecordingSurface::default();
        let mut back = RecordingSurface::default();
        render_deck(&deck, &layout, &Helvetica, &images(1), &mut front, &mut back).unwrap();
        let unshifted = LayoutConfig::default().resolve().unwrap();
        let pos = layout.grid.position(0);
        assert_eq!(front.ops[1], Op::Rect(unshifted.sheet.front_cell(pos)));
        let expected = unshifted.sheet.back_cell(pos);
        assert_eq!(
            back.ops[0],
            Op::Rect(Rect::new(
                expected.x,
                expected.y - layout.sheet.y_shift,
                expected.width,
                expected.height
            ))
        );
    }

    #[test]
    fn image_count_must_match_deck() {
        let layout = LayoutConfig::default().resolve().unwrap();
        let mut front = RecordingSurface::default();
        let mut back = RecordingSurface::default();
        assert!(render_deck(&deck(2), &layout, &Helvetica, &images(1), &mut front, &mut back).is_err());
        assert!(front.ops.is_empty());
    }

    #[test]
    fn title_and_artist_blocks_are_separated_by_gap() {
        let layout = LayoutConfig::default().resolve().unwrap();
        let typo = layout.back;
        let deck = Deck::from_tracks(vec![TrackRecord::new(
            "spotify:track:4uLU6hMCjMI75M1A2tKUQC".to_string(),
            "A Remarkably Long Song Title That Cannot Fit On One Line".to_string(),
            "Somebody and Several Featured Guests Singing Along".to_string(),
            String::new(),
        )]);
        let mut back = RecordingSurface::default();
        render_back(&mut back, &Helvetica, &layout, &deck.cards()[0]);

        let texts = back.texts();
        let titles: Vec<_> = texts.iter().filter(|t| t.1 == typo.title_size).collect();
        let artists: Vec<_> = texts.iter().filter(|t| t.1 == typo.artist_size).collect();
        assert_eq!(titles.len(), TITLE_MAX_LINES);
        assert_eq!(artists.len(), 2);
        assert_eq!(texts.len(), titles.len() + artists.len());

        let close = |a: f32, b: f32| (a - b).abs() < 1e-3;
        assert!(close(titles[0].0.y - titles[1].0.y, typo.title_leading));
        assert!(close(
            titles[1].0.y - artists[0].0.y,
            typo.title_leading + typo.block_gap
        ));
        assert!(close(artists[0].0.y - artists[1].0.y, typo.artist_leading));
    }
}
