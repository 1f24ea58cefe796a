//! Geometric primitives and unit conversion.
//!
//! All page coordinates are PDF points (1/72 inch) with the origin at the
//! bottom-left corner of the page.

/// Points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Millimetres per inch.
pub const MM_PER_INCH: f32 = 25.4;

/// Convert millimetres to points.
///
/// # Examples
///
/// ```
/// use pdfgen::geometry::mm_to_point;
///
/// assert!((mm_to_point(25.4) - 72.0).abs() < 1e-4);
/// ```
pub fn mm_to_point(mm: f32) -> f32 {
    mm * POINTS_PER_INCH / MM_PER_INCH
}

/// Convert inches to points.
pub fn inch_to_point(inch: f32) -> f32 {
    inch * POINTS_PER_INCH
}

/// Convert points to millimetres.
pub fn point_to_mm(points: f32) -> f32 {
    points * MM_PER_INCH / POINTS_PER_INCH
}

/// Convert points to inches.
pub fn point_to_inch(points: f32) -> f32 {
    points / POINTS_PER_INCH
}

/// Common page sizes in points (width, height), portrait.
pub mod page_size {
    use super::{inch_to_point, mm_to_point};

    /// ISO A4, 210 x 297 mm
    pub fn a4() -> (f32, f32) {
        (mm_to_point(210.0), mm_to_point(297.0))
    }

    /// ISO A3, 297 x 420 mm
    pub fn a3() -> (f32, f32) {
        (mm_to_point(297.0), mm_to_point(420.0))
    }

    /// US Letter, 8.5 x 11 in
    pub fn letter() -> (f32, f32) {
        (inch_to_point(8.5), inch_to_point(11.0))
    }

    /// US Legal, 8.5 x 14 in
    pub fn legal() -> (f32, f32) {
        (inch_to_point(8.5), inch_to_point(14.0))
    }
}

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate an offset `(u, v)` by `angle` radians and add it to this point.
    pub fn offset_rotated(&self, u: f32, v: f32, angle: f32) -> Point {
        let (sin, cos) = angle.sin_cos();
        Point::new(self.x + u * cos - v * sin, self.y + u * sin + v * cos)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// A rectangle in page space, anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of bottom-left corner
    pub x: f32,
    /// Y coordinate of bottom-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// `[llx lly urx ury]`, normalized so that negative extents still give
    /// a well-formed PDF rectangle.
    pub fn corners(&self) -> [f32; 4] {
        [
            self.x.min(self.right()),
            self.y.min(self.top()),
            self.x.max(self.right()),
            self.y.max(self.top()),
        ]
    }
}
