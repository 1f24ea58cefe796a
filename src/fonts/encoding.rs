//! Text encoding for the standard fonts.
//!
//! The twelve text fonts are written with `/WinAnsiEncoding` (Windows-1252),
//! so UTF-8 input is mapped to single bytes here before it is measured or
//! emitted. Symbol and ZapfDingbats use their built-in encodings and only
//! accept ASCII codes.

/// Byte substituted for characters the target encoding cannot represent.
pub const REPLACEMENT: u8 = b'?';

/// Map a Unicode scalar to its WinAnsi byte.
///
/// Maps Unicode codepoints to WinAnsi byte values for the range 0x80-0x9F
/// which differs from Latin-1.
pub fn unicode_to_winansi(ch: char) -> Option<u8> {
    let codepoint = ch as u32;
    // Direct mapping for 0x00-0x7F and 0xA0-0xFF
    if codepoint < 0x80 || (0xA0..=0xFF).contains(&codepoint) {
        return Some(codepoint as u8);
    }

    match codepoint {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation mark
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation mark
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}

/// Encode text as WinAnsi bytes, substituting [`REPLACEMENT`] for
/// unmappable characters.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    encode_with(text, unicode_to_winansi)
}

/// Encode text for a font with a built-in encoding: ASCII passes through,
/// everything else becomes [`REPLACEMENT`].
pub fn encode_builtin(text: &str) -> Vec<u8> {
    encode_with(text, |ch| ch.is_ascii().then_some(ch as u8))
}

fn encode_with(text: &str, map: impl Fn(char) -> Option<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut replaced = 0usize;
    for ch in text.chars() {
        match map(ch) {
            Some(b) => out.push(b),
            None => {
                replaced += 1;
                out.push(REPLACEMENT);
            },
        }
    }
    if replaced > 0 {
        log::warn!(
            "{} character(s) not representable in the font encoding were replaced",
            replaced
        );
    }
    out
}

/// Append bytes as the body of a PDF literal string (without parentheses).
///
/// Delimiters are escaped; bytes outside printable ASCII are written as
/// octal escapes so content streams stay 7-bit clean.
pub fn escape_literal(out: &mut Vec<u8>, bytes: &[u8]) {
    for &b in bytes {
        match b {
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            0x0A => out.extend_from_slice(b"\\n"),
            0x0D => out.extend_from_slice(b"\\r"),
            0x09 => out.extend_from_slice(b"\\t"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0C => out.extend_from_slice(b"\\f"),
            0x20..=0x7E => out.push(b),
            _ => out.extend_from_slice(format!("\\{:03o}", b).as_bytes()),
        }
    }
}
