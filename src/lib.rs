// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # pdfgen
//!
//! A small PDF document engine: build a document page by page in memory, then
//! serialize it to a byte-exact PDF file.
//!
//! ## Features
//!
//! - **Standard fonts**: the 14 base fonts with built-in metrics, WinAnsi encoding
//! - **Text layout**: single lines, rotation, word wrapping with left, right,
//!   centred and justified alignment
//! - **Vector graphics**: lines, rectangles, Bézier curves, ellipses, polygons,
//!   with transparency through inverted-alpha colours
//! - **Images**: JPEG passthrough, PNG/PPM/BMP decoding, raw RGB and grayscale
//!   pixel buffers
//! - **Barcodes**: Code 128A, Code 39, EAN-13, EAN-8, UPC-A and UPC-E
//! - **Navigation**: nested bookmarks and intra-document links
//! - **Output**: deterministic serialization with a cross-reference table and
//!   file identifier, written atomically to disk or to any writer
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfgen::{geometry, rgb, BarcodeType, BookmarkId, Document, DocumentInfo};
//!
//! # fn main() -> pdfgen::Result<()> {
//! let info = DocumentInfo::new()
//!     .with_title("Invoice")
//!     .with_author("Accounts");
//! let (width, height) = geometry::page_size::a4();
//! let mut doc = Document::create(width, height, info)?;
//!
//! let page = doc.append_page()?;
//! doc.set_font("Helvetica-Bold")?;
//! doc.add_text(Some(page), "Invoice 1042", 18.0, 50.0, height - 60.0, rgb(0, 0, 0))?;
//! doc.add_line(None, 50.0, height - 70.0, width - 50.0, height - 70.0, 1.0, rgb(0, 0, 0))?;
//! doc.add_barcode(None, BarcodeType::Code128A, 50.0, 50.0, 200.0, 40.0, "INV1042", rgb(0, 0, 0))?;
//! doc.add_bookmark(None, BookmarkId::TOP_LEVEL, "Invoice")?;
//!
//! doc.save(Some(std::path::Path::new("invoice.pdf")))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// PDF object model
pub mod object;

// Colours and units
pub mod color;
pub mod geometry;

// Standard fonts and metrics
pub mod fonts;

// Metadata and writer options
pub mod config;

// Serialization pipeline
pub mod writer;

// Document API
pub mod document;

pub use color::{argb, rgb, Color};
pub use config::{DocumentConfig, DocumentInfo};
pub use document::{BookmarkId, Document, LinkId, PageRef};
pub use error::{Error, ErrorKind, Result};
pub use fonts::{measure_text, StandardFont};
pub use geometry::{inch_to_point, mm_to_point, Point};
pub use writer::{BarcodeType, ImageDecoder, TextAlign};
