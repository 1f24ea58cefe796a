//! Property tests for unit conversion, colours and measurement.

use pdfgen::geometry::{point_to_inch, point_to_mm};
use pdfgen::{argb, inch_to_point, measure_text, mm_to_point, StandardFont};
use proptest::prelude::*;

proptest! {
    #[test]
    fn mm_round_trip(mm in -10_000.0f32..10_000.0) {
        let back = point_to_mm(mm_to_point(mm));
        prop_assert!((back - mm).abs() <= 1e-3 * mm.abs().max(1.0));
    }

    #[test]
    fn inch_round_trip(inch in -1_000.0f32..1_000.0) {
        let back = point_to_inch(inch_to_point(inch));
        prop_assert!((back - inch).abs() <= 1e-4 * inch.abs().max(1.0));
    }

    #[test]
    fn color_channels_unpack(a in any::<u8>(), r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let color = argb(a, r, g, b);
        prop_assert_eq!(color.alpha(), a);
        prop_assert_eq!(color.red(), r);
        prop_assert_eq!(color.green(), g);
        prop_assert_eq!(color.blue(), b);
        prop_assert!((0.0..=1.0).contains(&color.opacity()));
    }

    #[test]
    fn measure_is_additive(left in "[ -~]{0,20}", right in "[ -~]{0,20}", size in 1.0f32..72.0) {
        let joined = format!("{}{}", left, right);
        for font in [StandardFont::Helvetica, StandardFont::TimesBold, StandardFont::Courier] {
            let whole = measure_text(font.name(), &joined, size).unwrap();
            let parts = measure_text(font.name(), &left, size).unwrap()
                + measure_text(font.name(), &right, size).unwrap();
            prop_assert!((whole - parts).abs() <= 1e-2);
        }
    }

    #[test]
    fn measure_is_never_negative(text in "\\PC{0,40}", size in 0.0f32..100.0) {
        let width = measure_text("Times-Roman", &text, size).unwrap();
        prop_assert!(width >= 0.0);
    }
}
