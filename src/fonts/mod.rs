//! The 14 standard PDF fonts.
//!
//! Every conforming reader ships these fonts, so documents reference them by
//! name without embedding. Text measurement uses fixed advance-width tables;
//! no kerning pairs are applied.

pub mod encoding;
pub mod metrics;

use crate::error::{Error, Result};
use metrics::{WidthTable, FIRST_CHAR, LAST_CHAR};

/// One of the 14 standard Type 1 fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    /// Courier
    Courier,
    /// Courier Bold
    CourierBold,
    /// Courier Oblique
    CourierOblique,
    /// Courier Bold Oblique
    CourierBoldOblique,
    /// Helvetica (sans-serif)
    Helvetica,
    /// Helvetica Bold
    HelveticaBold,
    /// Helvetica Oblique (italic)
    HelveticaOblique,
    /// Helvetica Bold Oblique
    HelveticaBoldOblique,
    /// Times Roman (serif)
    TimesRoman,
    /// Times Bold
    TimesBold,
    /// Times Italic
    TimesItalic,
    /// Times Bold Italic
    TimesBoldItalic,
    /// Symbol (mathematical symbols)
    Symbol,
    /// Zapf Dingbats (decorative symbols)
    ZapfDingbats,
}

impl StandardFont {
    /// All 14 fonts.
    pub const ALL: [StandardFont; 14] = [
        StandardFont::Courier,
        StandardFont::CourierBold,
        StandardFont::CourierOblique,
        StandardFont::CourierBoldOblique,
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
        StandardFont::TimesRoman,
        StandardFont::TimesBold,
        StandardFont::TimesItalic,
        StandardFont::TimesBoldItalic,
        StandardFont::Symbol,
        StandardFont::ZapfDingbats,
    ];

    /// The PostScript name used as `/BaseFont`.
    pub fn name(&self) -> &'static str {
        match self {
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Symbol => "Symbol",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Look up a font by its exact PostScript name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Check if this is a fixed-width font.
    pub fn is_fixed_width(&self) -> bool {
        matches!(
            self,
            StandardFont::Courier
                | StandardFont::CourierBold
                | StandardFont::CourierOblique
                | StandardFont::CourierBoldOblique
        )
    }

    /// Symbol and ZapfDingbats carry their own encoding.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, StandardFont::Symbol | StandardFont::ZapfDingbats)
    }

    fn widths(&self) -> &'static WidthTable {
        match self {
            StandardFont::Courier
            | StandardFont::CourierBold
            | StandardFont::CourierOblique
            | StandardFont::CourierBoldOblique => &metrics::COURIER,
            StandardFont::Helvetica | StandardFont::HelveticaOblique => &metrics::HELVETICA,
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => {
                &metrics::HELVETICA_BOLD
            },
            StandardFont::TimesRoman => &metrics::TIMES_ROMAN,
            StandardFont::TimesBold => &metrics::TIMES_BOLD,
            StandardFont::TimesItalic => &metrics::TIMES_ITALIC,
            StandardFont::TimesBoldItalic => &metrics::TIMES_BOLD_ITALIC,
            StandardFont::Symbol => &metrics::SYMBOL,
            StandardFont::ZapfDingbats => &metrics::ZAPF_DINGBATS,
        }
    }

    /// Width used for encoded bytes above the ASCII range.
    pub fn fallback_width(&self) -> u16 {
        match self {
            f if f.is_fixed_width() => 600,
            StandardFont::ZapfDingbats => 788,
            _ => 500,
        }
    }

    /// Advance width of one encoded byte, in 1/1000 em.
    ///
    /// Control characters (0x00-0x1F, 0x7F) have no width.
    pub fn glyph_width(&self, code: u8) -> u16 {
        match code {
            FIRST_CHAR..=LAST_CHAR => self.widths()[(code - FIRST_CHAR) as usize],
            0x00..=0x1F | 0x7F => 0,
            _ => self.fallback_width(),
        }
    }

    /// Encode text into the byte codes this font is written with.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        if self.is_symbolic() {
            encoding::encode_builtin(text)
        } else {
            encoding::encode_winansi(text)
        }
    }

    /// Summed advance of already-encoded bytes, in 1/1000 em.
    pub fn encoded_units(&self, bytes: &[u8]) -> u32 {
        bytes.iter().map(|&b| self.glyph_width(b) as u32).sum()
    }

    /// Width of already-encoded bytes at `size` points.
    pub fn encoded_width(&self, bytes: &[u8], size: f32) -> f32 {
        units_to_points(self.encoded_units(bytes), size)
    }

    /// Width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        self.encoded_width(&self.encode(text), size)
    }
}

impl std::fmt::Display for StandardFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for StandardFont {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| Error::UnknownFont(s.to_string()))
    }
}

/// Scale a width in 1/1000 em to points at `size`.
pub fn units_to_points(units: u32, size: f32) -> f32 {
    units as f32 * size / 1000.0
}

/// Measure `text` in the font called `font_name` at `size` points.
pub fn measure_text(font_name: &str, text: &str, size: f32) -> Result<f32> {
    let font: StandardFont = font_name.parse()?;
    if !size.is_finite() || size < 0.0 {
        return Err(Error::InvalidArgument(format!("invalid font size {}", size)));
    }
    Ok(font.text_width(text, size))
}
