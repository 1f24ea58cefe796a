//! Barcode generation for PDF documents.
//!
//! Payloads are encoded into a module pattern (one byte per module, 1 = bar,
//! 0 = space) and drawn as filled vector rectangles, so barcodes stay sharp
//! at any zoom level.
//!
//! ## Supported Barcode Types
//!
//! ### Via the `barcoders` crate
//! - Code 128 (character set A)
//! - Code 39
//! - EAN-13
//! - EAN-8
//! - UPC-A (as EAN-13 with a leading 0)
//!
//! ### Built in
//! - UPC-E (zero-suppressed UPC-A)

use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::ean8::EAN8;

use crate::error::{Error, Result};
use crate::writer::content_stream::ContentStreamBuilder;

/// Types of 1D barcodes supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeType {
    /// Code 128 restricted to character set A (upper case and controls)
    Code128A,
    /// Code 39 (alphanumeric)
    Code39,
    /// EAN-13 (13 digits, European Article Number)
    Ean13,
    /// UPC-A (12 digits, Universal Product Code)
    UpcA,
    /// EAN-8 (8 digits, compact EAN)
    Ean8,
    /// UPC-E (8 digits, zero-suppressed UPC-A)
    UpcE,
}

impl BarcodeType {
    /// Numeric symbology code.
    pub fn code(&self) -> i32 {
        match self {
            BarcodeType::Code128A => 0,
            BarcodeType::Code39 => 1,
            BarcodeType::Ean13 => 2,
            BarcodeType::UpcA => 3,
            BarcodeType::Ean8 => 4,
            BarcodeType::UpcE => 5,
        }
    }

    /// Symbology from its numeric code.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(BarcodeType::Code128A),
            1 => Ok(BarcodeType::Code39),
            2 => Ok(BarcodeType::Ean13),
            3 => Ok(BarcodeType::UpcA),
            4 => Ok(BarcodeType::Ean8),
            5 => Ok(BarcodeType::UpcE),
            _ => Err(Error::InvalidArgument(format!("unknown barcode type {}", code))),
        }
    }
}

impl std::fmt::Display for BarcodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BarcodeType::Code128A => write!(f, "Code 128A"),
            BarcodeType::Code39 => write!(f, "Code 39"),
            BarcodeType::Ean13 => write!(f, "EAN-13"),
            BarcodeType::UpcA => write!(f, "UPC-A"),
            BarcodeType::Ean8 => write!(f, "EAN-8"),
            BarcodeType::UpcE => write!(f, "UPC-E"),
        }
    }
}

/// Barcode encoder.
pub struct BarcodeGenerator;

impl BarcodeGenerator {
    /// Encode `data` into its module pattern.
    pub fn encode(barcode_type: BarcodeType, data: &str) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(Error::Barcode(format!("{} payload is empty", barcode_type)));
        }

        let modules = match barcode_type {
            BarcodeType::Code128A => {
                // \u{00C0} selects character set A in barcoders.
                let barcode = Code128::new(format!("\u{00C0}{}", data))
                    .map_err(|e| Error::Barcode(format!("Code128 encoding error: {}", e)))?;
                barcode.encode()
            },
            BarcodeType::Code39 => {
                let barcode = Code39::new(data)
                    .map_err(|e| Error::Barcode(format!("Code39 encoding error: {}", e)))?;
                barcode.encode()
            },
            BarcodeType::Ean13 => {
                let payload = strip_check_digit(barcode_type, data, 12)?;
                let barcode = EAN13::new(payload)
                    .map_err(|e| Error::Barcode(format!("EAN-13 encoding error: {}", e)))?;
                barcode.encode()
            },
            BarcodeType::UpcA => {
                // UPC-A is EAN-13 with leading 0
                let payload = strip_check_digit(barcode_type, data, 11)?;
                let barcode = EAN13::new(format!("0{}", payload))
                    .map_err(|e| Error::Barcode(format!("UPC-A encoding error: {}", e)))?;
                barcode.encode()
            },
            BarcodeType::Ean8 => {
                let payload = strip_check_digit(barcode_type, data, 7)?;
                let barcode = EAN8::new(payload)
                    .map_err(|e| Error::Barcode(format!("EAN-8 encoding error: {}", e)))?;
                barcode.encode()
            },
            BarcodeType::UpcE => encode_upc_e(data)?,
        };

        Ok(modules)
    }

    /// Encode `data` and append its bars to `builder`, scaled to fill the
    /// `width` x `height` box whose lower-left corner is `(x, y)`.
    ///
    /// Nothing is appended when the pattern has no bars.
    pub fn draw(
        builder: &mut ContentStreamBuilder,
        barcode_type: BarcodeType,
        data: &str,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        let modules = Self::encode(barcode_type, data)?;
        let module_width = width / modules.len() as f32;
        let runs = bar_runs(&modules);
        if runs.is_empty() {
            return Ok(());
        }

        for (start, len) in runs {
            builder.rect(
                x + start as f32 * module_width,
                y,
                len as f32 * module_width,
                height,
            );
        }
        builder.fill();
        Ok(())
    }
}

/// Merge consecutive bar modules into `(start, length)` runs.
pub fn bar_runs(modules: &[u8]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;

    for (i, &m) in modules.iter().enumerate() {
        match (m != 0, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - s));
                start = None;
            },
            _ => {},
        }
    }
    if let Some(s) = start {
        runs.push((s, modules.len() - s));
    }
    runs
}

/// Parse a string of ASCII digits.
fn parse_digits(barcode_type: BarcodeType, data: &str) -> Result<Vec<u8>> {
    data.bytes()
        .map(|b| match b {
            b'0'..=b'9' => Ok(b - b'0'),
            _ => Err(Error::Barcode(format!(
                "{} accepts digits only, got {:?}",
                barcode_type, data
            ))),
        })
        .collect()
}

/// Modulo-10 check digit used by the EAN/UPC family.
///
/// Weights alternate 3, 1, 3, ... starting from the rightmost data digit.
pub fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Accept `data_len` digits, or `data_len + 1` with a correct check digit,
/// and return the data digits without the check digit.
fn strip_check_digit(barcode_type: BarcodeType, data: &str, data_len: usize) -> Result<String> {
    let digits = parse_digits(barcode_type, data)?;
    if digits.len() == data_len {
        return Ok(data.to_string());
    }
    if digits.len() != data_len + 1 {
        return Err(Error::Barcode(format!(
            "{} requires {} or {} digits, got {}",
            barcode_type,
            data_len,
            data_len + 1,
            digits.len()
        )));
    }

    let expected = check_digit(&digits[..data_len]);
    if digits[data_len] != expected {
        return Err(Error::Barcode(format!(
            "{} check digit is {}, expected {}",
            barcode_type, digits[data_len], expected
        )));
    }
    Ok(data[..data_len].to_string())
}

/// Left-hand odd parity (set A) digit patterns, 7 modules each.
const UPC_L: [[u8; 7]; 10] = [
    [0, 0, 0, 1, 1, 0, 1],
    [0, 0, 1, 1, 0, 0, 1],
    [0, 0, 1, 0, 0, 1, 1],
    [0, 1, 1, 1, 1, 0, 1],
    [0, 1, 0, 0, 0, 1, 1],
    [0, 1, 1, 0, 0, 0, 1],
    [0, 1, 0, 1, 1, 1, 1],
    [0, 1, 1, 1, 0, 1, 1],
    [0, 1, 1, 0, 1, 1, 1],
    [0, 0, 0, 1, 0, 1, 1],
];

/// Left-hand even parity (set B) digit patterns.
const UPC_G: [[u8; 7]; 10] = [
    [0, 1, 0, 0, 1, 1, 1],
    [0, 1, 1, 0, 0, 1, 1],
    [0, 0, 1, 1, 0, 1, 1],
    [0, 1, 0, 0, 0, 0, 1],
    [0, 0, 1, 1, 1, 0, 1],
    [0, 1, 1, 1, 0, 0, 1],
    [0, 0, 0, 0, 1, 0, 1],
    [0, 0, 1, 0, 0, 0, 1],
    [0, 0, 0, 1, 0, 0, 1],
    [0, 0, 1, 0, 1, 1, 1],
];

/// UPC-E parity per check digit for number system 0 (true = even/G).
/// Number system 1 uses the inverse.
const UPC_E_PARITY: [[bool; 6]; 10] = [
    [true, true, true, false, false, false],
    [true, true, false, true, false, false],
    [true, true, false, false, true, false],
    [true, true, false, false, false, true],
    [true, false, true, true, false, false],
    [true, false, false, true, true, false],
    [true, false, false, false, true, true],
    [true, false, true, false, true, false],
    [true, false, true, false, false, true],
    [true, false, false, true, false, true],
];

/// Expand a UPC-E body (number system plus six digits) to the eleven data
/// digits of the equivalent UPC-A code.
fn expand_upc_e(ns: u8, d: &[u8; 6]) -> [u8; 11] {
    let [d1, d2, d3, d4, d5, d6] = *d;
    match d6 {
        0..=2 => [ns, d1, d2, d6, 0, 0, 0, 0, d3, d4, d5],
        3 => [ns, d1, d2, d3, 0, 0, 0, 0, 0, d4, d5],
        4 => [ns, d1, d2, d3, d4, 0, 0, 0, 0, 0, d5],
        _ => [ns, d1, d2, d3, d4, d5, 0, 0, 0, 0, d6],
    }
}

/// Encode UPC-E from 6 digits (number system 0 assumed), 7 digits (number
/// system first) or 8 digits (number system first, check digit last).
fn encode_upc_e(data: &str) -> Result<Vec<u8>> {
    let digits = parse_digits(BarcodeType::UpcE, data)?;
    let (ns, body, supplied_check) = match digits.len() {
        6 => (0, &digits[..], None),
        7 => (digits[0], &digits[1..], None),
        8 => (digits[0], &digits[1..7], Some(digits[7])),
        n => {
            return Err(Error::Barcode(format!("UPC-E requires 6, 7 or 8 digits, got {}", n)));
        },
    };
    if ns > 1 {
        return Err(Error::Barcode(format!("UPC-E number system must be 0 or 1, got {}", ns)));
    }

    let mut body6 = [0u8; 6];
    body6.copy_from_slice(body);
    let check = check_digit(&expand_upc_e(ns, &body6));
    if let Some(supplied) = supplied_check {
        if supplied != check {
            return Err(Error::Barcode(format!(
                "UPC-E check digit is {}, expected {}",
                supplied, check
            )));
        }
    }

    let mut modules = Vec::with_capacity(51);
    modules.extend_from_slice(&[1, 0, 1]);
    for (i, &digit) in body6.iter().enumerate() {
        let even = UPC_E_PARITY[check as usize][i] != (ns == 1);
        let pattern = if even { &UPC_G } else { &UPC_L };
        modules.extend_from_slice(&pattern[digit as usize]);
    }
    modules.extend_from_slice(&[0, 1, 0, 1, 0, 1]);
    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barcode_type_codes() {
        for code in 0..=5 {
            assert_eq!(BarcodeType::from_code(code).unwrap().code(), code);
        }
        assert!(matches!(BarcodeType::from_code(6), Err(Error::InvalidArgument(_))));
        assert_eq!(BarcodeType::Ean13.to_string(), "EAN-13");
    }

    #[test]
    fn test_check_digit() {
        // 4006381333931
        assert_eq!(check_digit(&[4, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3]), 1);
        // UPC-A 036000291452
        assert_eq!(check_digit(&[0, 3, 6, 0, 0, 0, 2, 9, 1, 4, 5]), 2);
        // EAN-8 96385074
        assert_eq!(check_digit(&[9, 6, 3, 8, 5, 0, 7]), 4);
    }

    #[test]
    fn test_ean13_module_count() {
        let modules = BarcodeGenerator::encode(BarcodeType::Ean13, "400638133393").unwrap();
        assert_eq!(modules.len(), 95);
        let with_check = BarcodeGenerator::encode(BarcodeType::Ean13, "4006381333931").unwrap();
        assert_eq!(modules, with_check);
    }

    #[test]
    fn test_wrong_check_digit_rejected() {
        assert!(matches!(
            BarcodeGenerator::encode(BarcodeType::Ean13, "4006381333932"),
            Err(Error::Barcode(_))
        ));
        assert!(BarcodeGenerator::encode(BarcodeType::UpcA, "036000291453").is_err());
    }

    #[test]
    fn test_upca_and_ean8() {
        let upc = BarcodeGenerator::encode(BarcodeType::UpcA, "03600029145").unwrap();
        assert_eq!(upc.len(), 95);
        let ean8 = BarcodeGenerator::encode(BarcodeType::Ean8, "9638507").unwrap();
        assert_eq!(ean8.len(), 67);
    }

    #[test]
    fn test_non_digits_rejected() {
        assert!(BarcodeGenerator::encode(BarcodeType::Ean8, "12a4567").is_err());
        assert!(BarcodeGenerator::encode(BarcodeType::UpcE, "").is_err());
    }

    #[test]
    fn test_code39_and_code128() {
        let c39 = BarcodeGenerator::encode(BarcodeType::Code39, "ABC-123").unwrap();
        assert!(!c39.is_empty());
        let c128 = BarcodeGenerator::encode(BarcodeType::Code128A, "HELLO").unwrap();
        assert_eq!(c128.first(), Some(&1));
    }

    #[test]
    fn test_upc_e_expansion() {
        assert_eq!(expand_upc_e(0, &[6, 5, 4, 3, 2, 1]), [0, 6, 5, 1, 0, 0, 0, 0, 4, 3, 2]);
        assert_eq!(expand_upc_e(0, &[1, 2, 3, 4, 5, 3]), [0, 1, 2, 3, 0, 0, 0, 0, 0, 4, 5]);
        assert_eq!(expand_upc_e(0, &[1, 2, 3, 4, 5, 4]), [0, 1, 2, 3, 4, 0, 0, 0, 0, 0, 5]);
        assert_eq!(expand_upc_e(1, &[1, 2, 3, 4, 5, 7]), [1, 1, 2, 3, 4, 5, 0, 0, 0, 0, 7]);
    }

    #[test]
    fn test_upc_e_pattern() {
        // 0 425261 expands to UPC-A 04210000526 with check digit 4.
        let modules = encode_upc_e("425261").unwrap();
        assert_eq!(modules.len(), 51);
        assert_eq!(&modules[..3], &[1, 0, 1]);
        assert_eq!(&modules[45..], &[0, 1, 0, 1, 0, 1]);
        assert_eq!(encode_upc_e("04252614").unwrap(), modules);
        assert!(encode_upc_e("04252615").is_err());
        assert!(encode_upc_e("2425261").is_err());
    }

    #[test]
    fn test_bar_runs_merge() {
        assert_eq!(bar_runs(&[1, 1, 0, 1, 0, 0, 1, 1, 1]), vec![(0, 2), (3, 1), (6, 3)]);
        assert!(bar_runs(&[0, 0]).is_empty());
    }

    #[test]
    fn test_draw_emits_rectangles() {
        let mut builder = ContentStreamBuilder::new();
        BarcodeGenerator::draw(&mut builder, BarcodeType::Ean8, "9638507", 0.0, 0.0, 67.0, 10.0)
            .unwrap();
        let content = String::from_utf8(builder.build().unwrap()).unwrap();
        // Start guard 101: two single-module bars.
        assert!(content.starts_with("0 0 1 10 re\n2 0 1 10 re\n"));
        assert!(content.ends_with("f\n"));
    }
}
