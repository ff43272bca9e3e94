//! Measured word wrapping for the text printed on card backs.

/// Line cap used for titles.
pub const TITLE_MAX_LINES: usize = 2;
/// Line cap used for every other text block.
pub const DEFAULT_MAX_LINES: usize = 3;

/// Width measurement for a single font.
pub trait FontMetrics {
    /// Width of `text` set at `size` points, in points.
    fn text_width(&self, text: &str, size: f32) -> f32;
}

/// Metrics of the PDF base-14 Helvetica font under WinAnsiEncoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl Helvetica {
    pub const BASE_FONT: &'static str = "Helvetica";
}

impl FontMetrics for Helvetica {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|ch| glyph_width(win_ansi_byte(ch)) as u32)
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Map a character to its WinAnsiEncoding byte, `?` when it has none.
pub fn win_ansi_byte(ch: char) -> u8 {
    match ch {
        ' '..='~' => ch as u8,
        '\u{00A0}'..='\u{00FF}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

/// Encode a string as WinAnsi bytes for a PDF text operator.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

// Helvetica AFM advance widths for 0x20..=0x7E.
#[rustfmt::skip]
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

// Helvetica AFM advance widths for 0x80..=0xFF. Unassigned bytes are 0.
#[rustfmt::skip]
const HIGH_WIDTHS: [u16; 128] = [
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

fn glyph_width(byte: u8) -> u16 {
    match byte {
        0x20..=0x7E => ASCII_WIDTHS[(byte - 0x20) as usize],
        0x80..=0xFF => HIGH_WIDTHS[(byte - 0x80) as usize],
        _ => 0,
    }
}

/// Greedily wrap `text` into at most `max_lines` lines no wider than
/// `max_width` at `size` points.
///
/// A word that cannot fit on a line of its own is cut into pieces sized by the
/// measured overflow ratio. A single glyph wider than `max_width` ends the
/// wrap: the pieces fitted before it are kept and the remaining text is
/// dropped. Lines past the cap are dropped.
pub fn wrap_lines<M: FontMetrics + ?Sized>(
    metrics: &M,
    text: &str,
    size: f32,
    max_width: f32,
    max_lines: usize,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if lines.len() >= max_lines {
            break;
        }
        if metrics.text_width(word, size) > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let (mut pieces, complete) = split_word(metrics, word, size, max_width);
            if !complete {
                lines.extend(pieces);
                break;
            }
            if let Some(last) = pieces.pop() {
                lines.extend(pieces);
                current = last;
            }
            continue;
        }
        if current.is_empty() {
            current = word.to_string();
            continue;
        }
        let trial = format!("{current} {word}");
        if metrics.text_width(&trial, size) <= max_width {
            current = trial;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.truncate(max_lines);
    lines
}

/// Cut an oversized word into pieces that each fit `max_width`.
///
/// The flag is false when a single character is wider than the bound and the
/// pieces stop short of the whole word.
fn split_word<M: FontMetrics + ?Sized>(
    metrics: &M,
    word: &str,
    size: f32,
    max_width: f32,
) -> (Vec<String>, bool) {
    let mut pieces = Vec::new();
    let mut rest: Vec<char> = word.chars().collect();
    while !rest.is_empty() {
        let whole: String = rest.iter().collect();
        let width = metrics.text_width(&whole, size);
        if width <= max_width {
            pieces.push(whole);
            return (pieces, true);
        }
        let upper = rest.len().saturating_sub(1).max(1);
        let guess = (rest.len() as f32 * max_width / width).floor() as usize;
        let mut take = guess.clamp(1, upper);
        let piece_width = |n: usize| metrics.text_width(&rest[..n].iter().collect::<String>(), size);
        while take > 0 && piece_width(take) > max_width {
            take -= 1;
        }
        if take == 0 {
            return (pieces, false);
        }
        while take < upper && piece_width(take + 1) <= max_width {
            take += 1;
        }
        pieces.push(rest.drain(..take).collect());
    }
    (pieces, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Every character is half an em wide.
    struct Mono;

    impl FontMetrics for Mono {
        fn text_width(&self, text: &str, size: f32) -> f32 {
            text.chars().count() as f32 * size * 0.5
        }
    }

    #[test]
    fn helvetica_matches_afm_widths() {
        assert_eq!(Helvetica.text_width("Hi", 1000.0), 722.0 + 222.0);
        assert_eq!(Helvetica.text_width(" ", 10.0), 2.78);
        assert_eq!(Helvetica.text_width("", 12.0), 0.0);
        for (ch, width) in [
            ('©', 737.0),
            ('®', 737.0),
            ('°', 400.0),
            ('·', 278.0),
            ('×', 584.0),
            ('÷', 584.0),
            ('½', 834.0),
            ('Þ', 667.0),
            ('Ö', 778.0),
            ('Ü', 722.0),
            ('ø', 611.0),
            ('€', 556.0),
            ('œ', 944.0),
        ] {
            assert_eq!(Helvetica.text_width(&ch.to_string(), 1000.0), width, "{ch}");
        }
    }

    #[test]
    fn symbol_runs_stay_inside_bound() {
        let text = "©".repeat(40);
        let lines = wrap_lines(&Helvetica, &text, 9.0, 146.0, DEFAULT_MAX_LINES);
        // 146 pt holds 22 copyright signs at 6.633 pt each.
        assert_eq!(lines[0].chars().count(), 22);
        for line in &lines {
            assert!(Helvetica.text_width(line, 9.0) <= 146.0);
        }
    }

    #[test]
    fn unmapped_characters_measure_as_question_mark() {
        assert_eq!(win_ansi_byte('é'), 0xE9);
        assert_eq!(win_ansi_byte('’'), 0x92);
        assert_eq!(win_ansi_byte('世'), b'?');
        assert_eq!(
            Helvetica.text_width("世", 10.0),
            Helvetica.text_width("?", 10.0)
        );
        assert_eq!(encode_win_ansi("Beyoncé"), b"Beyonc\xE9".to_vec());
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_lines(&Mono, "", 10.0, 50.0, 3).is_empty());
        assert!(wrap_lines(&Mono, "   \t ", 10.0, 50.0, 3).is_empty());
    }

    #[test]
    fn short_word_is_returned_unchanged() {
        assert_eq!(wrap_lines(&Helvetica, "Yesterday", 9.0, 130.0, 2), vec!["Yesterday"]);
    }

    #[test]
    fn forty_character_title_stops_at_two_lines() {
        let title = "alpha bravo charlie delta echo foxtrot a";
        assert_eq!(title.len(), 40);
        // 15 characters per line at 5 points each.
        let lines = wrap_lines(&Mono, title, 10.0, 75.0, TITLE_MAX_LINES);
        assert_eq!(lines, vec!["alpha bravo", "charlie delta"]);
    }

    #[test]
    fn oversized_word_is_split_within_bound() {
        let lines = wrap_lines(&Mono, "Supercalifragilistic is long", 10.0, 40.0, 5);
        assert_eq!(lines, vec!["Supercal", "ifragili", "stic is", "long"]);
        for line in &lines {
            assert!(Mono.text_width(line, 10.0) <= 40.0);
        }
    }

    #[test]
    fn lines_never_exceed_width_or_cap() {
        let samples = [
            "Bohemian Rhapsody - Remastered 2011",
            "Don't Stop Me Now",
            "Llanfairpwllgwyngyllgogerychwyrndrobwllllantysiliogogogoch Station Blues",
            "A B C D E F G H I J K L M N O P Q R S T U V W X Y Z",
            "Sigur Rós — Hoppípolla",
        ];
        for text in samples {
            for max_width in [20.0, 55.0, 90.0, 146.0] {
                for cap in [1, TITLE_MAX_LINES, DEFAULT_MAX_LINES] {
                    let lines = wrap_lines(&Helvetica, text, 9.0, max_width, cap);
                    assert!(lines.len() <= cap);
                    for line in &lines {
                        assert!(
                            Helvetica.text_width(line, 9.0) <= max_width,
                            "{line:?} exceeds {max_width}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn glyph_wider_than_bound_truncates() {
        assert!(wrap_lines(&Mono, "abc", 10.0, 4.0, 3).is_empty());
        // 'W' is 8.496 pt at 9 pt; nothing after it is wrapped.
        assert_eq!(wrap_lines(&Helvetica, "il W li", 9.0, 8.0, 3), vec!["il"]);
        assert_eq!(
            wrap_lines(&Helvetica, "il liW ll", 9.0, 8.0, 3),
            vec!["il", "li"]
        );
    }
}
