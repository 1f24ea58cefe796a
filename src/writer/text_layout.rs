//! Greedy word wrapping and line alignment.
//!
//! Text is split into paragraphs on line feeds, then each paragraph is
//! broken at whitespace so that no line exceeds the wrap width. A single
//! word wider than the wrap width gets a line of its own and is never split.
//! Runs of whitespace collapse to one space.

use crate::error::{Error, Result};
use crate::fonts::{units_to_points, StandardFont};

/// Horizontal alignment of wrapped lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Flush left
    #[default]
    Left,
    /// Flush right
    Right,
    /// Centred in the wrap width
    Center,
    /// Stretch word gaps to fill the wrap width, except on the last line of
    /// each paragraph
    Justify,
    /// Like `Justify`, but the last line is stretched too
    JustifyAll,
    /// Lay out and report the height without drawing anything
    NoWrite,
}

impl TextAlign {
    /// Numeric alignment code (0-5).
    pub fn code(&self) -> i32 {
        match self {
            TextAlign::Left => 0,
            TextAlign::Right => 1,
            TextAlign::Center => 2,
            TextAlign::Justify => 3,
            TextAlign::JustifyAll => 4,
            TextAlign::NoWrite => 5,
        }
    }

    /// Alignment from its numeric code.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(TextAlign::Left),
            1 => Ok(TextAlign::Right),
            2 => Ok(TextAlign::Center),
            3 => Ok(TextAlign::Justify),
            4 => Ok(TextAlign::JustifyAll),
            5 => Ok(TextAlign::NoWrite),
            _ => Err(Error::InvalidArgument(format!("unknown text alignment {}", code))),
        }
    }
}

/// One laid-out line.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    /// Encoded bytes of the line, words joined by single spaces
    pub bytes: Vec<u8>,
    /// Measured width in points (natural spacing)
    pub width: f32,
    /// Number of inter-word gaps
    pub gaps: usize,
    /// Whether this line ends its paragraph
    pub ends_paragraph: bool,
}

/// Where and how to draw a line relative to the layout origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePlacement {
    /// Offset along the baseline from the origin
    pub dx: f32,
    /// Offset perpendicular to the baseline (negative is downwards)
    pub dy: f32,
    /// Extra space added at each word gap (`Tw`)
    pub word_spacing: f32,
}

/// Lays out text in one standard font at one size.
#[derive(Debug, Clone, Copy)]
pub struct TextLayout {
    font: StandardFont,
    size: f32,
}

impl TextLayout {
    /// Create a layout helper for `font` at `size` points.
    pub fn new(font: StandardFont, size: f32) -> Self {
        Self { font, size }
    }

    /// Vertical distance between consecutive baselines.
    pub fn line_advance(&self) -> f32 {
        self.size
    }

    /// Break `text` into lines no wider than `max_width`.
    ///
    /// Every paragraph yields at least one line, so empty input still
    /// produces one (empty) line.
    pub fn wrap(&self, text: &str, max_width: f32) -> Vec<LayoutLine> {
        // Lines are summed in glyph units and scaled once, exactly as
        // `measure_text` does.
        let space_units = self.font.encoded_units(b" ");
        let fits = |units: u32| units_to_points(units, self.size) <= max_width;
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
            let first_line = lines.len();
            let mut current: Vec<u8> = Vec::new();
            let mut current_units = 0u32;
            let mut gaps = 0;

            for word in paragraph.split_whitespace() {
                let encoded = self.font.encode(word);
                let word_units = self.font.encoded_units(&encoded);

                if current.is_empty() {
                    current = encoded;
                    current_units = word_units;
                } else if fits(current_units + space_units + word_units) {
                    current.push(b' ');
                    current.extend_from_slice(&encoded);
                    current_units += space_units + word_units;
                    gaps += 1;
                } else {
                    lines.push(LayoutLine {
                        bytes: std::mem::replace(&mut current, encoded),
                        width: units_to_points(current_units, self.size),
                        gaps,
                        ends_paragraph: false,
                    });
                    current_units = word_units;
                    gaps = 0;
                }
            }

            if !current.is_empty() || lines.len() == first_line {
                lines.push(LayoutLine {
                    bytes: current,
                    width: units_to_points(current_units, self.size),
                    gaps,
                    ends_paragraph: true,
                });
            }
        }

        lines
    }

    /// Position of line `index` under `align` within `wrap_width`.
    pub fn place(
        &self,
        line: &LayoutLine,
        index: usize,
        wrap_width: f32,
        align: TextAlign,
    ) -> LinePlacement {
        let slack = (wrap_width - line.width).max(0.0);
        let stretch = line.gaps > 0
            && match align {
                TextAlign::Justify => !line.ends_paragraph,
                TextAlign::JustifyAll => true,
                _ => false,
            };

        let dx = match align {
            TextAlign::Right => slack,
            TextAlign::Center => slack / 2.0,
            _ => 0.0,
        };

        LinePlacement {
            dx,
            dy: -(index as f32) * self.line_advance(),
            word_spacing: if stretch { slack / line.gaps as f32 } else { 0.0 },
        }
    }

    /// Total vertical extent of `lines`.
    pub fn height(&self, lines: &[LayoutLine]) -> f32 {
        lines.len() as f32 * self.line_advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TextLayout {
        TextLayout::new(StandardFont::Courier, 10.0) // 6pt per glyph
    }

    fn texts(lines: &[LayoutLine]) -> Vec<String> {
        lines.iter().map(|l| String::from_utf8_lossy(&l.bytes).to_string()).collect()
    }

    #[test]
    fn test_single_line_when_it_fits() {
        let lines = layout().wrap("one two three", 1000.0);
        assert_eq!(texts(&lines), vec!["one two three"]);
        assert_eq!(lines[0].gaps, 2);
        assert!((lines[0].width - 78.0).abs() < 1e-4);
        assert_eq!(layout().height(&lines), 10.0);
    }

    #[test]
    fn test_measured_width_is_one_line() {
        let sentence = "The quick brown fox jumps over the lazy dog";
        let words: Vec<&str> = sentence.split(' ').collect();
        for font in StandardFont::ALL {
            for size in [7.3, 9.7, 10.0, 12.1, 17.9] {
                for n in 1..=words.len() {
                    let text = words[..n].join(" ");
                    let width = font.text_width(&text, size);
                    let lines = TextLayout::new(font, size).wrap(&text, width);
                    assert_eq!(lines.len(), 1, "{} {} {:?}", font, size, text);
                    assert_eq!(lines[0].width, width);
                }
            }
        }
    }

    #[test]
    fn test_greedy_breaks() {
        // "aaa bbb" is 42pt; limit 45 keeps it, the third word overflows.
        let lines = layout().wrap("aaa bbb ccc", 45.0);
        assert_eq!(texts(&lines), vec!["aaa bbb", "ccc"]);
        assert!(!lines[0].ends_paragraph);
        assert!(lines[1].ends_paragraph);
    }

    #[test]
    fn test_overlong_word_stays_whole() {
        let lines = layout().wrap("a supercalifragilistic b", 30.0);
        assert_eq!(texts(&lines), vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_whitespace_collapses() {
        let lines = layout().wrap("  a \t  b  ", 1000.0);
        assert_eq!(texts(&lines), vec!["a b"]);
    }

    #[test]
    fn test_paragraphs_and_empty_lines() {
        let lines = layout().wrap("a\r\n\nb", 1000.0);
        assert_eq!(texts(&lines), vec!["a", "", "b"]);
        assert!(lines.iter().all(|l| l.ends_paragraph));
        assert_eq!(layout().wrap("", 100.0).len(), 1);
    }

    #[test]
    fn test_alignment_offsets() {
        let l = layout();
        let line = &l.wrap("abcd", 100.0)[0]; // 24pt wide
        assert_eq!(l.place(line, 0, 100.0, TextAlign::Left).dx, 0.0);
        assert_eq!(l.place(line, 0, 100.0, TextAlign::Right).dx, 76.0);
        assert_eq!(l.place(line, 0, 100.0, TextAlign::Center).dx, 38.0);
        assert_eq!(l.place(line, 2, 100.0, TextAlign::Left).dy, -20.0);
    }

    #[test]
    fn test_justify_skips_last_line() {
        let l = layout();
        let lines = l.wrap("aa bb cc dd", 33.0); // "aa bb" = 30pt per line
        assert_eq!(lines.len(), 2);
        let first = l.place(&lines[0], 0, 33.0, TextAlign::Justify);
        assert!((first.word_spacing - 3.0).abs() < 1e-4);
        let last = l.place(&lines[1], 1, 33.0, TextAlign::Justify);
        assert_eq!(last.word_spacing, 0.0);
        let last_all = l.place(&lines[1], 1, 33.0, TextAlign::JustifyAll);
        assert!((last_all.word_spacing - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_align_codes() {
        for code in 0..=5 {
            assert_eq!(TextAlign::from_code(code).unwrap().code(), code);
        }
        assert!(TextAlign::from_code(9).is_err());
    }
}
