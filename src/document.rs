//! The document aggregate and its caller-facing operations.
//!
//! A [`Document`] owns every object of one PDF. Drawing calls append a new
//! content stream to the target page; nothing is written out until
//! [`Document::save`] (or [`Document::write_to`]) serializes the whole
//! object graph.
//!
//! Every fallible operation returns a [`Result`] and also records the failure
//! as the document's sticky error, which stays visible through
//! [`Document::get_error`] until [`Document::clear_error`] is called.
//!
//! Layout operations are not transactional: [`Document::add_text_wrap`]
//! writes one content stream per line, so a failure part way through leaves
//! the lines already written on the page.
//!
//! # Example
//!
//! ```
//! use pdfgen::{color, geometry, Color, Document, DocumentInfo, TextAlign};
//!
//! let (width, height) = geometry::page_size::a4();
//! let mut doc = Document::create(width, height, DocumentInfo::new().with_title("Report"))?;
//! doc.set_font("Helvetica")?;
//! let page = doc.append_page()?;
//! doc.add_text(Some(page), "Hello", 12.0, 72.0, height - 72.0, Color::BLACK)?;
//! let used = doc.add_text_wrap(
//!     None,
//!     "A longer paragraph that wraps onto several lines.",
//!     10.0,
//!     72.0,
//!     height - 100.0,
//!     0.0,
//!     color::rgb(40, 40, 40),
//!     120.0,
//!     TextAlign::Justify,
//! )?;
//! assert!(used >= 10.0);
//! let bytes = doc.to_bytes()?;
//! assert!(bytes.starts_with(b"%PDF-1.4"));
//! # Ok::<(), pdfgen::Error>(())
//! ```

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::color::Color;
use crate::config::{DocumentConfig, DocumentInfo};
use crate::error::{Error, Result};
use crate::fonts::StandardFont;
use crate::geometry::{Point, Rect};
use crate::writer::{
    BarcodeGenerator, BarcodeType, ContentStreamBuilder, ImageData, ImageDecoder, LinkData,
    ObjectId, ObjectStore, PdfWriter, StandardImageDecoder, TextAlign, TextLayout,
};

/// Distinguishes handles of different documents.
static NEXT_DOCUMENT: AtomicU64 = AtomicU64::new(1);

/// Handle to a page of one document.
///
/// Handles are only meaningful for the document that issued them; passing
/// one to another document fails with [`Error::ForeignHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRef {
    document: u64,
    id: ObjectId,
}

impl PageRef {
    /// Object number of the page.
    pub fn object_id(&self) -> ObjectId {
        self.id
    }
}

/// Identifier of an outline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookmarkId(i64);

impl BookmarkId {
    /// Parent value for entries at the top of the outline.
    pub const TOP_LEVEL: BookmarkId = BookmarkId(-1);

    /// Wrap a raw identifier, as returned by [`BookmarkId::raw`].
    pub fn from_raw(raw: i64) -> Self {
        BookmarkId(raw)
    }

    /// Raw identifier.
    pub fn raw(self) -> i64 {
        self.0
    }
}

/// Identifier of a link annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(i64);

impl LinkId {
    /// Raw identifier.
    pub fn raw(self) -> i64 {
        self.0
    }
}

/// An in-memory PDF document.
pub struct Document {
    serial: u64,
    width: f32,
    height: f32,
    info: DocumentInfo,
    config: DocumentConfig,
    store: ObjectStore,
    current_font: StandardFont,
    decoder: Box<dyn ImageDecoder + Send>,
    error: Option<(String, i32)>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("info", &self.info)
            .field("current_font", &self.current_font)
            .field("objects", &self.store.len())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Reject non-finite numbers and values not above `min` (or below it when
/// `inclusive`).
fn check_number(what: &str, value: f32, min: f32, inclusive: bool) -> Result<()> {
    let ok = value.is_finite() && if inclusive { value >= min } else { value > min };
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("invalid {}: {}", what, value)))
    }
}

fn check_coordinates(values: &[f32]) -> Result<()> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(v) => Err(Error::InvalidArgument(format!("non-finite coordinate {}", v))),
        None => Ok(()),
    }
}

impl Document {
    /// Create a document whose pages default to `width` x `height` points.
    pub fn create(width: f32, height: f32, info: DocumentInfo) -> Result<Self> {
        Self::with_config(width, height, info, DocumentConfig::default())
    }

    /// Create a document with explicit writer configuration.
    pub fn with_config(
        width: f32,
        height: f32,
        info: DocumentInfo,
        config: DocumentConfig,
    ) -> Result<Self> {
        check_number("page width", width, 0.0, false)?;
        check_number("page height", height, 0.0, false)?;

        let mut store = ObjectStore::new(config.max_objects)?;
        store.font(StandardFont::TimesRoman)?;

        let serial = NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed);
        log::debug!("created document {} ({} x {})", serial, width, height);

        Ok(Self {
            serial,
            width,
            height,
            info: info.normalized(),
            config,
            store,
            current_font: StandardFont::TimesRoman,
            decoder: Box::new(StandardImageDecoder),
            error: None,
        })
    }

    /// Release the document and everything it owns.
    pub fn destroy(self) {
        log::debug!("destroying document {} ({} objects)", self.serial, self.store.len());
    }

    /// Remember a failure as the sticky error and pass the result through.
    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            log::debug!("document {}: {}", self.serial, err);
            self.error = Some((err.to_string(), err.code()));
        }
        result
    }

    /// Last recorded error as `(message, code)`. Reading it does not clear it.
    pub fn get_error(&self) -> Option<(&str, i32)> {
        self.error.as_ref().map(|(msg, code)| (msg.as_str(), *code))
    }

    /// Forget the recorded error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Default page width in points.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Default page height in points.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Document metadata.
    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    /// Writer configuration.
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Replace the decoder used by [`Document::add_image_file`] and
    /// [`Document::add_image_data`].
    pub fn set_image_decoder(&mut self, decoder: Box<dyn ImageDecoder + Send>) {
        self.decoder = decoder;
    }

    // Fonts

    /// Select the font used by subsequent text operations.
    ///
    /// An unknown name fails and leaves the selection unchanged.
    pub fn set_font(&mut self, name: &str) -> Result<()> {
        let result = self.select_font(name);
        self.record(result)
    }

    fn select_font(&mut self, name: &str) -> Result<()> {
        let font: StandardFont = name.parse()?;
        self.store.font(font)?;
        self.current_font = font;
        Ok(())
    }

    /// Currently selected font.
    pub fn font(&self) -> StandardFont {
        self.current_font
    }

    /// Width of `text` at `size` points in `font_name`, or in the current
    /// font when `None`.
    pub fn measure_text(&mut self, font_name: Option<&str>, text: &str, size: f32) -> Result<f32> {
        let font_name = font_name.unwrap_or(self.current_font.name());
        let result = crate::fonts::measure_text(font_name, text, size);
        self.record(result)
    }

    // Pages

    /// Append a page with the document's default size.
    pub fn append_page(&mut self) -> Result<PageRef> {
        let result = self
            .store
            .add_page(self.width, self.height)
            .map(|id| PageRef {
                document: self.serial,
                id,
            });
        if let Ok(page) = &result {
            log::debug!("document {}: appended page {}", self.serial, page.id);
        }
        self.record(result)
    }

    /// Page by 1-based position.
    pub fn get_page(&mut self, number: usize) -> Result<PageRef> {
        let result = number
            .checked_sub(1)
            .and_then(|i| self.store.pages().get(i))
            .map(|&id| PageRef {
                document: self.serial,
                id,
            })
            .ok_or_else(|| Error::NotFound(format!("page {}", number)));
        self.record(result)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.store.pages().len()
    }

    /// Resolve a page handle; `None` means the most recently appended page.
    fn resolve_page(&self, page: Option<PageRef>) -> Result<ObjectId> {
        match page {
            Some(page) if page.document != self.serial => Err(Error::ForeignHandle),
            Some(page) => self
                .store
                .page(page.id)
                .map(|_| page.id)
                .ok_or_else(|| Error::NotFound(format!("page object {}", page.id))),
            None => self
                .store
                .pages()
                .last()
                .copied()
                .ok_or_else(|| Error::NotFound("document has no pages".to_string())),
        }
    }

    /// Change the size of one page.
    pub fn page_set_size(&mut self, page: Option<PageRef>, width: f32, height: f32) -> Result<()> {
        let result = self.resize_page(page, width, height);
        self.record(result)
    }

    fn resize_page(&mut self, page: Option<PageRef>, width: f32, height: f32) -> Result<()> {
        check_number("page width", width, 0.0, false)?;
        check_number("page height", height, 0.0, false)?;
        let id = self.resolve_page(page)?;
        if let Some(data) = self.store.page_mut(id) {
            data.width = width;
            data.height = height;
        }
        Ok(())
    }

    /// Width of a page in points.
    pub fn page_width(&mut self, page: Option<PageRef>) -> Result<f32> {
        let result = self.page_size(page).map(|(width, _)| width);
        self.record(result)
    }

    /// Height of a page in points.
    pub fn page_height(&mut self, page: Option<PageRef>) -> Result<f32> {
        let result = self.page_size(page).map(|(_, height)| height);
        self.record(result)
    }

    fn page_size(&self, page: Option<PageRef>) -> Result<(f32, f32)> {
        let id = self.resolve_page(page)?;
        Ok(self
            .store
            .page(id)
            .map_or((self.width, self.height), |p| (p.width, p.height)))
    }

    // Painting

    /// Append one content stream to `page`, selecting colours first and
    /// wrapping the operators in a transparency graphics state when either
    /// colour has alpha.
    fn paint<F>(
        &mut self,
        page: ObjectId,
        fill: Option<Color>,
        stroke: Option<Color>,
        draw: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut ContentStreamBuilder) -> Result<()>,
    {
        let mut body = ContentStreamBuilder::new();
        if let Some(color) = fill {
            body.fill_color(color);
        }
        if let Some(color) = stroke {
            body.stroke_color(color);
        }
        draw(&mut body)?;
        body.end_text();

        let gs = self
            .store
            .ext_gstate(fill.map_or(0, Color::alpha), stroke.map_or(0, Color::alpha))?;

        let mut stream = ContentStreamBuilder::new();
        if let Some(name) = &gs {
            stream.save_state().set_ext_gstate(name);
        }
        for op in body.operations() {
            stream.op(op.clone());
        }
        if gs.is_some() {
            stream.restore_state();
        }

        self.store.add_content(page, stream.build()?)?;
        Ok(())
    }

    /// Resource name of the current font.
    fn current_font_resource(&mut self) -> Result<String> {
        self.store.font(self.current_font)?;
        self.store
            .font_resource(self.current_font)
            .ok_or_else(|| Error::NotFound(format!("font {}", self.current_font)))
    }

    // Text

    /// Draw one line of text with its baseline starting at `(x, y)`.
    pub fn add_text(
        &mut self,
        page: Option<PageRef>,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        color: Color,
    ) -> Result<()> {
        let result = self.draw_text(page, text, size, x, y, 0.0, color);
        self.record(result)
    }

    /// Draw one line of text rotated counter-clockwise by `angle` radians
    /// about `(x, y)`.
    pub fn add_text_rotate(
        &mut self,
        page: Option<PageRef>,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        angle: f32,
        color: Color,
    ) -> Result<()> {
        let result = self.draw_text(page, text, size, x, y, angle, color);
        self.record(result)
    }

    fn draw_text(
        &mut self,
        page: Option<PageRef>,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        angle: f32,
        color: Color,
    ) -> Result<()> {
        let page = self.resolve_page(page)?;
        check_number("font size", size, 0.0, false)?;
        check_coordinates(&[x, y, angle])?;

        let resource = self.current_font_resource()?;
        let encoded = self.current_font.encode(text);
        self.paint(page, Some(color), None, |b| {
            b.begin_text()
                .set_font(&resource, size)
                .text(&encoded, x, y, angle);
            Ok(())
        })
    }

    /// Wrap `text` into lines no wider than `wrap_width` and draw them
    /// downwards from the baseline at `(x, y)`.
    ///
    /// Returns the vertical space used (line count times `size`).
    /// [`TextAlign::NoWrite`] only measures.
    pub fn add_text_wrap(
        &mut self,
        page: Option<PageRef>,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        angle: f32,
        color: Color,
        wrap_width: f32,
        align: TextAlign,
    ) -> Result<f32> {
        let result = self.draw_text_wrap(page, text, size, x, y, angle, color, wrap_width, align);
        self.record(result)
    }

    fn draw_text_wrap(
        &mut self,
        page: Option<PageRef>,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        angle: f32,
        color: Color,
        wrap_width: f32,
        align: TextAlign,
    ) -> Result<f32> {
        let page = self.resolve_page(page)?;
        check_number("font size", size, 0.0, false)?;
        check_number("wrap width", wrap_width, 0.0, false)?;
        check_coordinates(&[x, y, angle])?;

        let layout = TextLayout::new(self.current_font, size);
        let lines = layout.wrap(text, wrap_width);
        let height = layout.height(&lines);
        if align == TextAlign::NoWrite {
            return Ok(height);
        }

        let resource = self.current_font_resource()?;
        let origin = Point::new(x, y);
        for (index, line) in lines.iter().enumerate() {
            if line.bytes.is_empty() {
                continue;
            }
            let placement = layout.place(line, index, wrap_width, align);
            let at = origin.offset_rotated(placement.dx, placement.dy, angle);
            self.paint(page, Some(color), None, |b| {
                b.begin_text().set_font(&resource, size);
                if placement.word_spacing != 0.0 {
                    b.word_spacing(placement.word_spacing);
                }
                b.text(&line.bytes, at.x, at.y, angle);
                if placement.word_spacing != 0.0 {
                    b.word_spacing(0.0);
                }
                Ok(())
            })?;
        }
        Ok(height)
    }

    // Shapes

    /// Draw a straight line.
    pub fn add_line(
        &mut self,
        page: Option<PageRef>,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Color,
    ) -> Result<()> {
        let result = self.stroke_path(page, width, color, &[x1, y1, x2, y2], |b| {
            b.move_to(x1, y1).line_to(x2, y2);
        });
        self.record(result)
    }

    /// Draw a rectangle outline.
    pub fn add_rectangle(
        &mut self,
        page: Option<PageRef>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        border_width: f32,
        color: Color,
    ) -> Result<()> {
        let result = self.stroke_path(page, border_width, color, &[x, y, width, height], |b| {
            b.rect(x, y, width, height);
        });
        self.record(result)
    }

    /// Draw a filled rectangle, with a border in its own colour when
    /// `border_width` is positive.
    pub fn add_filled_rectangle(
        &mut self,
        page: Option<PageRef>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        border_width: f32,
        fill: Color,
        border: Color,
    ) -> Result<()> {
        let result = self.fill_path(
            page,
            border_width,
            fill,
            border,
            &[x, y, width, height],
            |b| {
                b.rect(x, y, width, height);
            },
        );
        self.record(result)
    }

    /// Draw a cubic Bézier curve from `(x1, y1)` to `(x2, y2)` with control
    /// points `(xq1, yq1)` and `(xq2, yq2)`.
    pub fn add_cubic_bezier(
        &mut self,
        page: Option<PageRef>,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        xq1: f32,
        yq1: f32,
        xq2: f32,
        yq2: f32,
        width: f32,
        color: Color,
    ) -> Result<()> {
        let result = self.stroke_path(
            page,
            width,
            color,
            &[x1, y1, x2, y2, xq1, yq1, xq2, yq2],
            |b| {
                b.move_to(x1, y1).curve_to(xq1, yq1, xq2, yq2, x2, y2);
            },
        );
        self.record(result)
    }

    /// Draw a quadratic Bézier curve from `(x1, y1)` to `(x2, y2)` with
    /// control point `(xq1, yq1)`.
    pub fn add_quadratic_bezier(
        &mut self,
        page: Option<PageRef>,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        xq1: f32,
        yq1: f32,
        width: f32,
        color: Color,
    ) -> Result<()> {
        // Degree elevation to the equivalent cubic.
        let c1x = x1 + 2.0 / 3.0 * (xq1 - x1);
        let c1y = y1 + 2.0 / 3.0 * (yq1 - y1);
        let c2x = x2 + 2.0 / 3.0 * (xq1 - x2);
        let c2y = y2 + 2.0 / 3.0 * (yq1 - y2);
        let result = self.stroke_path(page, width, color, &[x1, y1, x2, y2, xq1, yq1], |b| {
            b.move_to(x1, y1).curve_to(c1x, c1y, c2x, c2y, x2, y2);
        });
        self.record(result)
    }

    /// Draw an ellipse centred on `(x, y)`, filled when `fill` is given.
    pub fn add_ellipse(
        &mut self,
        page: Option<PageRef>,
        x: f32,
        y: f32,
        x_radius: f32,
        y_radius: f32,
        width: f32,
        color: Color,
        fill: Option<Color>,
    ) -> Result<()> {
        let coords = [x, y, x_radius, y_radius];
        let result = match fill {
            Some(fill) => self.fill_path(page, width, fill, color, &coords, |b| {
                b.ellipse(x, y, x_radius, y_radius);
            }),
            None => self.stroke_path(page, width, color, &coords, |b| {
                b.ellipse(x, y, x_radius, y_radius);
            }),
        };
        self.record(result)
    }

    /// Draw a circle centred on `(x, y)`, filled when `fill` is given.
    pub fn add_circle(
        &mut self,
        page: Option<PageRef>,
        x: f32,
        y: f32,
        radius: f32,
        width: f32,
        color: Color,
        fill: Option<Color>,
    ) -> Result<()> {
        self.add_ellipse(page, x, y, radius, radius, width, color, fill)
    }

    /// Draw a closed polygon outline through `points`.
    pub fn add_polygon(
        &mut self,
        page: Option<PageRef>,
        points: &[Point],
        width: f32,
        color: Color,
    ) -> Result<()> {
        let result = check_polygon(points).and_then(|coords| {
            self.stroke_path(page, width, color, &coords, |b| {
                b.polygon(points);
            })
        });
        self.record(result)
    }

    /// Draw a filled polygon; a positive `border_width` also strokes it in
    /// the same colour.
    pub fn add_filled_polygon(
        &mut self,
        page: Option<PageRef>,
        points: &[Point],
        border_width: f32,
        color: Color,
    ) -> Result<()> {
        let result = check_polygon(points).and_then(|coords| {
            self.fill_path(page, border_width, color, color, &coords, |b| {
                b.polygon(points);
            })
        });
        self.record(result)
    }

    fn stroke_path(
        &mut self,
        page: Option<PageRef>,
        width: f32,
        color: Color,
        coords: &[f32],
        path: impl FnOnce(&mut ContentStreamBuilder),
    ) -> Result<()> {
        let page = self.resolve_page(page)?;
        check_number("line width", width, 0.0, true)?;
        check_coordinates(coords)?;
        self.paint(page, None, Some(color), |b| {
            b.set_line_width(width);
            path(b);
            b.stroke();
            Ok(())
        })
    }

    fn fill_path(
        &mut self,
        page: Option<PageRef>,
        border_width: f32,
        fill: Color,
        border: Color,
        coords: &[f32],
        path: impl FnOnce(&mut ContentStreamBuilder),
    ) -> Result<()> {
        let page = self.resolve_page(page)?;
        check_number("border width", border_width, 0.0, true)?;
        check_coordinates(coords)?;
        if border_width > 0.0 {
            self.paint(page, Some(fill), Some(border), |b| {
                b.set_line_width(border_width);
                path(b);
                b.fill_stroke();
                Ok(())
            })
        } else {
            self.paint(page, Some(fill), None, |b| {
                path(b);
                b.fill();
                Ok(())
            })
        }
    }

    // Images

    /// Embed the image file at `path` and draw it with its lower-left corner
    /// at `(x, y)`.
    ///
    /// A negative display dimension is derived from the other one using the
    /// image's aspect ratio (both negative: the pixel size). A zero dimension
    /// embeds the image without painting it.
    pub fn add_image_file(
        &mut self,
        page: Option<PageRef>,
        x: f32,
        y: f32,
        display_width: f32,
        display_height: f32,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let path = path.as_ref();
        let result = self.resolve_page(page).and_then(|page| {
            let image = self.decoder.decode_file(path)?;
            log::debug!("decoded {} ({}x{})", path.display(), image.width, image.height);
            self.place_image(page, image, x, y, display_width, display_height)
        });
        self.record(result)
    }

    /// Like [`Document::add_image_file`] for an image file already in memory.
    pub fn add_image_data(
        &mut self,
        page: Option<PageRef>,
        x: f32,
        y: f32,
        display_width: f32,
        display_height: f32,
        data: &[u8],
    ) -> Result<()> {
        let result = self.resolve_page(page).and_then(|page| {
            let image = self.decoder.decode(data)?;
            self.place_image(page, image, x, y, display_width, display_height)
        });
        self.record(result)
    }

    /// Embed packed 8-bit RGB pixels.
    pub fn add_rgb24(
        &mut self,
        page: Option<PageRef>,
        x: f32,
        y: f32,
        display_width: f32,
        display_height: f32,
        pixels: &[u8],
        pixel_width: u32,
        pixel_height: u32,
    ) -> Result<()> {
        let result = self.resolve_page(page).and_then(|page| {
            let image = ImageData::from_rgb24(pixel_width, pixel_height, pixels)
                .map_err(|e| Error::InvalidArgument(e.to_string()))?;
            self.place_image(page, image, x, y, display_width, display_height)
        });
        self.record(result)
    }

    /// Embed 8-bit grayscale pixels.
    pub fn add_grayscale8(
        &mut self,
        page: Option<PageRef>,
        x: f32,
        y: f32,
        display_width: f32,
        display_height: f32,
        pixels: &[u8],
        pixel_width: u32,
        pixel_height: u32,
    ) -> Result<()> {
        let result = self.resolve_page(page).and_then(|page| {
            let image = ImageData::from_grayscale8(pixel_width, pixel_height, pixels)
                .map_err(|e| Error::InvalidArgument(e.to_string()))?;
            self.place_image(page, image, x, y, display_width, display_height)
        });
        self.record(result)
    }

    fn place_image(
        &mut self,
        page: ObjectId,
        image: ImageData,
        x: f32,
        y: f32,
        display_width: f32,
        display_height: f32,
    ) -> Result<()> {
        check_coordinates(&[x, y, display_width, display_height])?;
        let (width, height) = image.display_size(display_width, display_height);

        let id = self.store.add_image(image)?;
        if width == 0.0 || height == 0.0 {
            log::warn!("image {} embedded with zero display size", id);
            return Ok(());
        }

        let mut builder = ContentStreamBuilder::new();
        builder.draw_image(&ObjectStore::image_resource(id), x, y, width, height);
        self.store.add_content(page, builder.build()?)?;
        Ok(())
    }

    // Barcodes

    /// Draw `data` as a barcode filling the `width` x `height` box at
    /// `(x, y)`.
    pub fn add_barcode(
        &mut self,
        page: Option<PageRef>,
        barcode_type: BarcodeType,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        data: &str,
        color: Color,
    ) -> Result<()> {
        let result = self.draw_barcode(page, barcode_type, x, y, width, height, data, color);
        self.record(result)
    }

    fn draw_barcode(
        &mut self,
        page: Option<PageRef>,
        barcode_type: BarcodeType,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        data: &str,
        color: Color,
    ) -> Result<()> {
        let page = self.resolve_page(page)?;
        check_number("barcode width", width, 0.0, false)?;
        check_number("barcode height", height, 0.0, false)?;
        check_coordinates(&[x, y])?;
        self.paint(page, Some(color), None, |b| {
            BarcodeGenerator::draw(b, barcode_type, data, x, y, width, height)
        })
    }

    // Navigation

    /// Add an outline entry titled `name` that jumps to `page`.
    ///
    /// `parent` is [`BookmarkId::TOP_LEVEL`] or a bookmark created earlier in
    /// this document; anything else fails with [`Error::InvalidParent`].
    pub fn add_bookmark(
        &mut self,
        page: Option<PageRef>,
        parent: BookmarkId,
        name: &str,
    ) -> Result<BookmarkId> {
        let result = self.create_bookmark(page, parent, name);
        self.record(result)
    }

    fn create_bookmark(
        &mut self,
        page: Option<PageRef>,
        parent: BookmarkId,
        name: &str,
    ) -> Result<BookmarkId> {
        let page = self.resolve_page(page)?;
        let parent = if parent == BookmarkId::TOP_LEVEL {
            None
        } else {
            let id = u32::try_from(parent.raw())
                .ok()
                .map(ObjectId)
                .filter(|&id| self.store.bookmark(id).is_some())
                .ok_or(Error::InvalidParent(parent.raw()))?;
            Some(id)
        };
        let id = self.store.add_bookmark(page, name, parent)?;
        Ok(BookmarkId(id.0 as i64))
    }

    /// Make the `width` x `height` area at `(x, y)` on `page` a link to
    /// `target_page`, showing it with `(target_x, target_y)` at the top-left
    /// of the window.
    pub fn add_link(
        &mut self,
        page: Option<PageRef>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        target_page: PageRef,
        target_x: f32,
        target_y: f32,
    ) -> Result<LinkId> {
        let result = self.create_link(page, x, y, width, height, target_page, target_x, target_y);
        self.record(result)
    }

    fn create_link(
        &mut self,
        page: Option<PageRef>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        target_page: PageRef,
        target_x: f32,
        target_y: f32,
    ) -> Result<LinkId> {
        let page = self.resolve_page(page)?;
        let target = self.resolve_page(Some(target_page))?;
        check_coordinates(&[x, y, width, height, target_x, target_y])?;
        let id = self.store.add_link(
            page,
            LinkData {
                rect: Rect::new(x, y, width, height),
                target,
                target_x,
                target_y,
            },
        )?;
        Ok(LinkId(id.0 as i64))
    }

    // Output

    fn serialize(&self) -> Result<Vec<u8>> {
        PdfWriter::new(&self.store, &self.info, &self.config).finish()
    }

    /// Serialize the document to bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let result = self.serialize();
        self.record(result)
    }

    /// Serialize the document into `writer`.
    pub fn write_to<W: Write>(&mut self, mut writer: W) -> Result<()> {
        let result = self.serialize().and_then(|bytes| {
            writer.write_all(&bytes)?;
            writer.flush()?;
            Ok(())
        });
        self.record(result)
    }

    /// Save to `path`, or to standard output when `None`.
    ///
    /// Files are written to a temporary file next to the destination and
    /// renamed into place once complete, so a failed save never leaves a
    /// truncated file behind.
    pub fn save(&mut self, path: Option<&Path>) -> Result<()> {
        match path {
            None => self.write_to(std::io::stdout().lock()),
            Some(path) => {
                let result = self.save_file(path);
                self.record(result)
            },
        }
    }

    fn save_file(&self, path: &Path) -> Result<()> {
        let bytes = self.serialize()?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| Error::Io(e.error))?;

        log::info!("saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

/// At least two points, all finite; returns their coordinates.
fn check_polygon(points: &[Point]) -> Result<Vec<f32>> {
    if points.len() < 2 {
        return Err(Error::InvalidArgument(format!(
            "polygon needs at least 2 points, got {}",
            points.len()
        )));
    }
    Ok(points.iter().flat_map(|p| [p.x, p.y]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{argb, rgb};
    use crate::error::ErrorKind;

    fn doc() -> Document {
        Document::create(612.0, 792.0, DocumentInfo::default()).unwrap()
    }

    fn last_content(doc: &Document, page: PageRef) -> String {
        let data = doc.store.page(page.id).unwrap();
        match doc.store.get(*data.contents.last().unwrap()) {
            Some(crate::writer::ObjectKind::Content(bytes)) => {
                String::from_utf8_lossy(bytes).to_string()
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_create_rejects_bad_size() {
        assert!(Document::create(0.0, 100.0, DocumentInfo::default()).is_err());
        assert!(Document::create(100.0, f32::NAN, DocumentInfo::default()).is_err());
    }

    #[test]
    fn test_default_font_is_object_four() {
        let doc = doc();
        assert_eq!(doc.font(), StandardFont::TimesRoman);
        assert_eq!(
            doc.store.get(ObjectId(4)),
            Some(&crate::writer::ObjectKind::Font(StandardFont::TimesRoman))
        );
    }

    #[test]
    fn test_unknown_font_keeps_selection() {
        let mut doc = doc();
        doc.set_font("Courier").unwrap();
        let err = doc.set_font("Comic Sans").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(doc.font(), StandardFont::Courier);
        assert!(doc.get_error().is_some());
    }

    #[test]
    fn test_null_page_targets_last_page() {
        let mut doc = doc();
        assert_eq!(
            doc.add_text(None, "x", 12.0, 0.0, 0.0, Color::BLACK).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        doc.clear_error();

        doc.append_page().unwrap();
        let second = doc.append_page().unwrap();
        doc.add_text(None, "hi", 12.0, 10.0, 20.0, Color::BLACK).unwrap();
        assert_eq!(
            last_content(&doc, second),
            "0 0 0 rg\nBT\n/F1 12 Tf\n1 0 0 1 10 20 Tm\n(hi) Tj\nET\n"
        );
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut a = doc();
        let mut b = doc();
        let page_a = a.append_page().unwrap();
        b.append_page().unwrap();
        let err = b.add_line(Some(page_a), 0.0, 0.0, 1.0, 1.0, 1.0, Color::BLACK).unwrap_err();
        assert!(matches!(err, Error::ForeignHandle));
    }

    #[test]
    fn test_get_page_is_one_based() {
        let mut doc = doc();
        let first = doc.append_page().unwrap();
        assert_eq!(doc.get_page(1).unwrap(), first);
        assert_eq!(doc.get_page(0).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(doc.get_page(2).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_page_set_size() {
        let mut doc = doc();
        let page = doc.append_page().unwrap();
        doc.page_set_size(Some(page), 200.0, 300.0).unwrap();
        assert_eq!(doc.page_width(Some(page)).unwrap(), 200.0);
        assert_eq!(doc.page_height(None).unwrap(), 300.0);
        assert_eq!(doc.width(), 612.0);
        assert!(doc.page_set_size(Some(page), -1.0, 300.0).is_err());
    }

    #[test]
    fn test_page_size_query_records_error() {
        let mut doc = doc();
        assert_eq!(doc.page_width(None).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(doc.get_error().map(|(_, code)| code), Some(-2));
        doc.clear_error();

        let mut other = Document::create(612.0, 792.0, DocumentInfo::default()).unwrap();
        let foreign = other.append_page().unwrap();
        doc.append_page().unwrap();
        assert!(matches!(doc.page_height(Some(foreign)), Err(Error::ForeignHandle)));
        assert!(doc.get_error().is_some());
    }

    #[test]
    fn test_transparent_fill_uses_ext_gstate() {
        let mut doc = doc();
        let page = doc.append_page().unwrap();
        let red = argb(0x80, 255, 0, 0);
        doc.add_filled_rectangle(Some(page), 0.0, 0.0, 10.0, 10.0, 0.0, red, Color::BLACK)
            .unwrap();
        assert_eq!(last_content(&doc, page), "q\n/GS1 gs\n1 0 0 rg\n0 0 10 10 re\nf\nQ\n");
    }

    #[test]
    fn test_filled_rectangle_with_border() {
        let mut doc = doc();
        let page = doc.append_page().unwrap();
        let (fill, border) = (rgb(0, 255, 0), rgb(0, 0, 255));
        doc.add_filled_rectangle(Some(page), 1.0, 2.0, 3.0, 4.0, 2.0, fill, border)
            .unwrap();
        assert_eq!(
            last_content(&doc, page),
            "0 1 0 rg\n0 0 1 RG\n2 w\n1 2 3 4 re\nB\n"
        );
    }

    #[test]
    fn test_wrap_height_and_no_write() {
        let mut doc = doc();
        let page = doc.append_page().unwrap();
        doc.set_font("Courier").unwrap();
        let before = doc.store.page(page.id).unwrap().contents.len();
        let wrap = |doc: &mut Document, align| {
            doc.add_text_wrap(Some(page), "aaa bbb ccc", 10.0, 0.0, 100.0, 0.0, Color::BLACK, 45.0, align)
        };
        let h = wrap(&mut doc, TextAlign::NoWrite).unwrap();
        assert_eq!(h, 20.0);
        assert_eq!(doc.store.page(page.id).unwrap().contents.len(), before);

        wrap(&mut doc, TextAlign::Left).unwrap();
        assert_eq!(doc.store.page(page.id).unwrap().contents.len(), before + 2);
        assert!(last_content(&doc, page).contains("1 0 0 1 0 90 Tm\n(ccc) Tj"));
    }

    #[test]
    fn test_wrap_rejects_bad_width() {
        let mut doc = doc();
        doc.append_page().unwrap();
        let err = doc
            .add_text_wrap(None, "x", 10.0, 0.0, 0.0, 0.0, Color::BLACK, 0.0, TextAlign::Left)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_justified_line_resets_word_spacing() {
        let mut doc = doc();
        let page = doc.append_page().unwrap();
        doc.set_font("Courier").unwrap();
        let black = Color::BLACK;
        doc.add_text_wrap(Some(page), "aa bb cc dd", 10.0, 0.0, 0.0, 0.0, black, 33.0, TextAlign::Justify)
            .unwrap();
        let contents = &doc.store.page(page.id).unwrap().contents;
        let first = match doc.store.get(contents[0]) {
            Some(crate::writer::ObjectKind::Content(b)) => String::from_utf8_lossy(b).to_string(),
            _ => unreachable!(),
        };
        assert!(first.contains("3 Tw\n1 0 0 1 0 0 Tm\n(aa bb) Tj\n0 Tw\n"));
        assert!(!last_content(&doc, page).contains("Tw"));
    }

    #[test]
    fn test_bookmark_parents() {
        let mut doc = doc();
        doc.append_page().unwrap();
        let top = doc.add_bookmark(None, BookmarkId::TOP_LEVEL, "Top").unwrap();
        doc.add_bookmark(None, top, "Child").unwrap();
        let err = doc.add_bookmark(None, BookmarkId::from_raw(9999), "Orphan").unwrap_err();
        assert!(matches!(err, Error::InvalidParent(9999)));
        let err = doc.add_bookmark(None, BookmarkId::from_raw(-7), "Bad").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_zero_size_image_is_embedded_only() {
        let mut doc = doc();
        let page = doc.append_page().unwrap();
        doc.add_rgb24(Some(page), 0.0, 0.0, 0.0, 0.0, &[255, 0, 0], 1, 1).unwrap();
        assert!(doc.store.page(page.id).unwrap().contents.is_empty());
        assert_eq!(doc.store.images().len(), 1);

        doc.add_grayscale8(Some(page), 5.0, 5.0, 20.0, -1.0, &[0, 255], 2, 1).unwrap();
        assert!(last_content(&doc, page).contains("20 0 0 10 5 5 cm"));
    }

    #[test]
    fn test_sticky_error_until_cleared() {
        let mut doc = doc();
        assert!(doc.get_error().is_none());
        assert!(doc.get_page(3).is_err());
        doc.append_page().unwrap();
        let (msg, code) = doc.get_error().unwrap();
        assert!(msg.contains("page 3"));
        assert_eq!(code, -2);
        doc.clear_error();
        assert!(doc.get_error().is_none());
    }

    #[test]
    fn test_object_limit_is_allocation_error() {
        let config = DocumentConfig::default().with_max_objects(5);
        let mut doc = Document::with_config(100.0, 100.0, DocumentInfo::default(), config).unwrap();
        doc.append_page().unwrap();
        let err = doc.append_page().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Allocation);
        assert_eq!(doc.get_error().map(|(_, code)| code), Some(-12));
    }
}
