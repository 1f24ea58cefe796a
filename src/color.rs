//! Packed 32-bit colours.
//!
//! A colour is `0xAARRGGBB`. The alpha byte is inverted relative to most
//! graphics APIs: `0x00` is fully opaque and `0xFF` is fully transparent.

use serde::{Deserialize, Serialize};

/// Pack alpha, red, green and blue channels into a colour.
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Color {
    Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
}

/// Pack an opaque colour.
pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
    argb(0, r, g, b)
}

/// A packed ARGB colour value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    /// Opaque black
    pub const BLACK: Color = rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Color = rgb(0xFF, 0xFF, 0xFF);
    /// Opaque red
    pub const RED: Color = rgb(0xFF, 0, 0);
    /// Opaque green
    pub const GREEN: Color = rgb(0, 0xFF, 0);
    /// Opaque blue
    pub const BLUE: Color = rgb(0, 0, 0xFF);
    /// Fully transparent
    pub const TRANSPARENT: Color = argb(0xFF, 0, 0, 0);

    /// The packed value.
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// Alpha channel (0 = opaque).
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Red channel.
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel.
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel.
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Whether painting needs no transparency group.
    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0
    }

    /// Whether nothing would be painted.
    pub const fn is_transparent(self) -> bool {
        self.alpha() == 0xFF
    }

    /// PDF opacity (`/ca`, `/CA`) in 0.0..=1.0.
    pub fn opacity(self) -> f32 {
        (0xFF - self.alpha()) as f32 / 255.0
    }

    /// Red, green and blue as PDF colour components in 0.0..=1.0.
    pub fn components(self) -> (f32, f32, f32) {
        (
            self.red() as f32 / 255.0,
            self.green() as f32 / 255.0,
            self.blue() as f32 / 255.0,
        )
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Color(value)
    }
}

impl From<Color> for u32 {
    fn from(value: Color) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rgb_is_opaque_argb() {
        assert_eq!(rgb(255, 0, 0).to_u32(), 0x00FF_0000);
        assert_eq!(rgb(255, 0, 0), argb(0, 255, 0, 0));
        assert!(rgb(1, 2, 3).is_opaque());
    }

    #[test]
    fn test_inverted_alpha() {
        let clear = argb(0xFF, 10, 20, 30);
        assert!(clear.is_transparent());
        assert_eq!(clear.opacity(), 0.0);
        assert_eq!(Color::BLACK.opacity(), 1.0);
        assert_eq!(argb(0x80, 0, 0, 0).alpha(), 0x80);
    }

    #[test]
    fn test_components() {
        let (r, g, b) = rgb(255, 0, 51).components();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert!((b - 0.2).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_argb_differs_from_rgb_only_in_alpha(a: u8, r: u8, g: u8, b: u8) {
            let packed = argb(a, r, g, b).to_u32();
            let opaque = rgb(r, g, b).to_u32();
            prop_assert_eq!((packed ^ opaque) & 0x00FF_FFFF, 0);
            prop_assert_eq!(packed >> 24, a as u32);
        }

        #[test]
        fn prop_channels_roundtrip(a: u8, r: u8, g: u8, b: u8) {
            let c = argb(a, r, g, b);
            prop_assert_eq!((c.alpha(), c.red(), c.green(), c.blue()), (a, r, g, b));
        }
    }
}
