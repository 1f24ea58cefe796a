//! PDF content stream builder.
//!
//! Builds PDF content streams containing graphics and text operators
//! according to PDF specification ISO 32000-1:2008 Section 8-9.

use crate::color::Color;
use crate::error::Result;
use crate::fonts::encoding::escape_literal;
use crate::geometry::Point;
use std::io::Write;

/// Bézier approximation constant for quarter circles: 4/3 * (sqrt(2) - 1)
const KAPPA: f32 = 0.552_284_8;

/// Operations that can be added to a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Set transformation matrix (cm)
    Transform(f32, f32, f32, f32, f32, f32),
    /// Set graphics state from ExtGState dictionary (gs)
    SetExtGState(String),
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,
    /// Set font resource and size (Tf)
    SetFont(String, f32),
    /// Set text matrix (Tm)
    SetTextMatrix(f32, f32, f32, f32, f32, f32),
    /// Show encoded text (Tj)
    ShowText(Vec<u8>),
    /// Set word spacing (Tw)
    SetWordSpacing(f32),
    /// Set fill color RGB (rg)
    SetFillColorRGB(f32, f32, f32),
    /// Set stroke color RGB (RG)
    SetStrokeColorRGB(f32, f32, f32),
    /// Set line width (w)
    SetLineWidth(f32),
    /// Move to (m)
    MoveTo(f32, f32),
    /// Line to (l)
    LineTo(f32, f32),
    /// Curve to (c)
    CurveTo(f32, f32, f32, f32, f32, f32),
    /// Rectangle (re)
    Rectangle(f32, f32, f32, f32),
    /// Close path (h)
    ClosePath,
    /// Stroke (S)
    Stroke,
    /// Fill (f)
    Fill,
    /// Fill and stroke (B)
    FillStroke,
    /// Paint XObject (Do)
    PaintXObject(String),
}

/// Number formatting for operands: at most 4 decimals, no trailing zeros.
struct Num(f32);

impl std::fmt::Display for Num {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.0.is_finite() {
            return f.write_str("0");
        }
        let formatted = format!("{:.4}", self.0);
        let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
        match trimmed {
            "-0" | "" => f.write_str("0"),
            _ => f.write_str(trimmed),
        }
    }
}

/// Builder for one content stream fragment.
#[derive(Debug, Default)]
pub struct ContentStreamBuilder {
    /// Operations in the stream
    operations: Vec<ContentStreamOp>,
    /// Whether we're in a text object
    in_text_object: bool,
}

impl ContentStreamBuilder {
    /// Create a new content stream builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation to the stream.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Operations recorded so far.
    pub fn operations(&self) -> &[ContentStreamOp] {
        &self.operations
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Begin a text object.
    pub fn begin_text(&mut self) -> &mut Self {
        if !self.in_text_object {
            self.op(ContentStreamOp::BeginText);
            self.in_text_object = true;
        }
        self
    }

    /// End a text object.
    pub fn end_text(&mut self) -> &mut Self {
        if self.in_text_object {
            self.op(ContentStreamOp::EndText);
            self.in_text_object = false;
        }
        self
    }

    /// Select a font resource for text operations.
    pub fn set_font(&mut self, resource: &str, size: f32) -> &mut Self {
        self.op(ContentStreamOp::SetFont(resource.to_string(), size))
    }

    /// Show encoded text with its baseline origin at `(x, y)`, rotated
    /// counter-clockwise by `angle` radians about that origin.
    pub fn text(&mut self, encoded: &[u8], x: f32, y: f32, angle: f32) -> &mut Self {
        self.begin_text();
        let (sin, cos) = if angle == 0.0 { (0.0, 1.0) } else { angle.sin_cos() };
        self.op(ContentStreamOp::SetTextMatrix(cos, sin, -sin, cos, x, y));
        self.op(ContentStreamOp::ShowText(encoded.to_vec()))
    }

    /// Set word spacing for subsequent text.
    pub fn word_spacing(&mut self, spacing: f32) -> &mut Self {
        self.op(ContentStreamOp::SetWordSpacing(spacing))
    }

    /// Set fill color.
    pub fn fill_color(&mut self, color: Color) -> &mut Self {
        let (r, g, b) = color.components();
        self.op(ContentStreamOp::SetFillColorRGB(r, g, b))
    }

    /// Set stroke color.
    pub fn stroke_color(&mut self, color: Color) -> &mut Self {
        let (r, g, b) = color.components();
        self.op(ContentStreamOp::SetStrokeColorRGB(r, g, b))
    }

    /// Draw an image XObject at the specified position and size.
    ///
    /// # Arguments
    /// * `resource` - The XObject resource name (e.g., "Image7")
    /// * `x` - X position (left edge)
    /// * `y` - Y position (bottom edge)
    /// * `width` - Display width
    /// * `height` - Display height
    pub fn draw_image(
        &mut self,
        resource: &str,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> &mut Self {
        self.end_text();

        self.op(ContentStreamOp::SaveState);
        self.op(ContentStreamOp::Transform(width, 0.0, 0.0, height, x, y));
        self.op(ContentStreamOp::PaintXObject(resource.to_string()));
        self.op(ContentStreamOp::RestoreState)
    }

    /// Set line width.
    pub fn set_line_width(&mut self, width: f32) -> &mut Self {
        self.op(ContentStreamOp::SetLineWidth(width))
    }

    /// Move to a point (start a new subpath).
    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.op(ContentStreamOp::MoveTo(x, y))
    }

    /// Draw a line to a point.
    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.op(ContentStreamOp::LineTo(x, y))
    }

    /// Draw a Bézier curve (full control).
    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> &mut Self {
        self.op(ContentStreamOp::CurveTo(x1, y1, x2, y2, x3, y3))
    }

    /// Append a rectangle subpath.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.op(ContentStreamOp::Rectangle(x, y, width, height))
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) -> &mut Self {
        self.op(ContentStreamOp::ClosePath)
    }

    /// Stroke the current path.
    pub fn stroke(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Stroke)
    }

    /// Fill the current path.
    pub fn fill(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Fill)
    }

    /// Fill then stroke the current path.
    pub fn fill_stroke(&mut self) -> &mut Self {
        self.op(ContentStreamOp::FillStroke)
    }

    /// Save the current graphics state.
    pub fn save_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::SaveState)
    }

    /// Restore the previous graphics state.
    pub fn restore_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::RestoreState)
    }

    /// Set extended graphics state (transparency).
    ///
    /// The name must reference an ExtGState resource of the page.
    pub fn set_ext_gstate(&mut self, gs_name: &str) -> &mut Self {
        self.op(ContentStreamOp::SetExtGState(gs_name.to_string()))
    }

    /// Append an ellipse subpath built from four Bézier arcs.
    pub fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) -> &mut Self {
        let kx = rx * KAPPA;
        let ky = ry * KAPPA;

        self.move_to(cx + rx, cy)
            .curve_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry)
            .curve_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy)
            .curve_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry)
            .curve_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy)
            .close_path()
    }

    /// Append a closed polygon subpath. Fewer than two points adds nothing.
    pub fn polygon(&mut self, points: &[Point]) -> &mut Self {
        if let [first, rest @ ..] = points {
            if rest.is_empty() {
                return self;
            }
            self.move_to(first.x, first.y);
            for p in rest {
                self.line_to(p.x, p.y);
            }
            self.close_path();
        }
        self
    }

    /// Build the content stream to bytes.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        for op in &self.operations {
            self.write_op(&mut buf, op)?;
            writeln!(buf)?;
        }

        Ok(buf)
    }

    /// Write a single operation to the buffer.
    fn write_op(&self, w: &mut Vec<u8>, op: &ContentStreamOp) -> std::io::Result<()> {
        match op {
            ContentStreamOp::SaveState => write!(w, "q"),
            ContentStreamOp::RestoreState => write!(w, "Q"),
            ContentStreamOp::Transform(a, b, c, d, e, f) => write!(
                w,
                "{} {} {} {} {} {} cm",
                Num(*a),
                Num(*b),
                Num(*c),
                Num(*d),
                Num(*e),
                Num(*f)
            ),
            ContentStreamOp::SetExtGState(name) => write!(w, "/{} gs", name),
            ContentStreamOp::BeginText => write!(w, "BT"),
            ContentStreamOp::EndText => write!(w, "ET"),
            ContentStreamOp::SetFont(name, size) => write!(w, "/{} {} Tf", name, Num(*size)),
            ContentStreamOp::SetTextMatrix(a, b, c, d, e, f) => write!(
                w,
                "{} {} {} {} {} {} Tm",
                Num(*a),
                Num(*b),
                Num(*c),
                Num(*d),
                Num(*e),
                Num(*f)
            ),
            ContentStreamOp::ShowText(bytes) => {
                w.push(b'(');
                escape_literal(w, bytes);
                write!(w, ") Tj")
            },
            ContentStreamOp::SetWordSpacing(spacing) => write!(w, "{} Tw", Num(*spacing)),
            ContentStreamOp::SetFillColorRGB(r, g, b) => {
                write!(w, "{} {} {} rg", Num(*r), Num(*g), Num(*b))
            },
            ContentStreamOp::SetStrokeColorRGB(r, g, b) => {
                write!(w, "{} {} {} RG", Num(*r), Num(*g), Num(*b))
            },
            ContentStreamOp::SetLineWidth(width) => write!(w, "{} w", Num(*width)),
            ContentStreamOp::MoveTo(x, y) => write!(w, "{} {} m", Num(*x), Num(*y)),
            ContentStreamOp::LineTo(x, y) => write!(w, "{} {} l", Num(*x), Num(*y)),
            ContentStreamOp::CurveTo(x1, y1, x2, y2, x3, y3) => write!(
                w,
                "{} {} {} {} {} {} c",
                Num(*x1),
                Num(*y1),
                Num(*x2),
                Num(*y2),
                Num(*x3),
                Num(*y3)
            ),
            ContentStreamOp::Rectangle(x, y, w_val, h) => {
                write!(w, "{} {} {} {} re", Num(*x), Num(*y), Num(*w_val), Num(*h))
            },
            ContentStreamOp::ClosePath => write!(w, "h"),
            ContentStreamOp::Stroke => write!(w, "S"),
            ContentStreamOp::Fill => write!(w, "f"),
            ContentStreamOp::FillStroke => write!(w, "B"),
            ContentStreamOp::PaintXObject(name) => write!(w, "/{} Do", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::rgb;

    fn render(builder: &ContentStreamBuilder) -> String {
        String::from_utf8(builder.build().unwrap()).unwrap()
    }

    #[test]
    fn test_simple_text() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .begin_text()
            .set_font("F1", 12.0)
            .text(b"Hello, World!", 72.0, 720.0, 0.0)
            .end_text();

        assert_eq!(
            render(&builder),
            "BT\n/F1 12 Tf\n1 0 0 1 72 720 Tm\n(Hello, World!) Tj\nET\n"
        );
    }

    #[test]
    fn test_rotated_text_matrix() {
        let mut builder = ContentStreamBuilder::new();
        builder.text(b"x", 10.0, 20.0, std::f32::consts::FRAC_PI_2).end_text();
        assert!(render(&builder).contains("0 1 -1 0 10 20 Tm"));
    }

    #[test]
    fn test_escaped_text() {
        let mut builder = ContentStreamBuilder::new();
        builder.text(&[b'(', 0xE9, b')'], 0.0, 0.0, 0.0).end_text();
        assert!(render(&builder).contains("(\\(\\351\\)) Tj"));
    }

    #[test]
    fn test_colors_and_rectangle() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .fill_color(rgb(255, 0, 0))
            .stroke_color(rgb(0, 0, 255))
            .set_line_width(1.5)
            .rect(10.0, 20.0, 100.0, 50.5)
            .fill_stroke();

        assert_eq!(render(&builder), "1 0 0 rg\n0 0 1 RG\n1.5 w\n10 20 100 50.5 re\nB\n");
    }

    #[test]
    fn test_draw_image_wraps_in_state() {
        let mut builder = ContentStreamBuilder::new();
        builder.draw_image("Image5", 10.0, 20.0, 30.0, 40.0);
        assert_eq!(render(&builder), "q\n30 0 0 40 10 20 cm\n/Image5 Do\nQ\n");
    }

    #[test]
    fn test_ellipse_uses_four_curves() {
        let mut builder = ContentStreamBuilder::new();
        builder.ellipse(50.0, 50.0, 10.0, 10.0).stroke();
        let content = render(&builder);
        assert!(content.starts_with("60 50 m\n"));
        assert_eq!(content.matches(" c\n").count(), 4);
        assert!(content.ends_with("h\nS\n"));
    }

    #[test]
    fn test_polygon_needs_two_points() {
        let mut builder = ContentStreamBuilder::new();
        builder.polygon(&[Point::new(0.0, 0.0)]);
        assert!(builder.is_empty());

        builder.polygon(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 8.0)]);
        assert_eq!(render(&builder), "0 0 m\n10 0 l\n5 8 l\nh\n");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(Num(0.333333).to_string(), "0.3333");
        assert_eq!(Num(-0.00001).to_string(), "0");
        assert_eq!(Num(2.0).to_string(), "2");
        assert_eq!(Num(f32::INFINITY).to_string(), "0");
    }
}
