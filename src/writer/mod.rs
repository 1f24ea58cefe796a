//! PDF writing module for generating PDF files.
//!
//! ## Architecture
//!
//! ```text
//! Document operations
//!     ↓
//! [TextLayout] / [BarcodeGenerator] / [ImageDecoder] (layout and encoding)
//!     ↓
//! [ContentStreamBuilder] (operators → content stream bytes)
//!     ↓
//! [ObjectStore] (typed objects with sequential ids)
//!     ↓
//! [PdfWriter] (header, body, xref table, trailer)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```
//!
//! ## Low-Level API
//!
//! ```
//! use pdfgen::config::{DocumentConfig, DocumentInfo};
//! use pdfgen::writer::{ContentStreamBuilder, ObjectStore, PdfWriter};
//!
//! let mut store = ObjectStore::new(1024)?;
//! store.font(pdfgen::fonts::StandardFont::Helvetica)?;
//! let page = store.add_page(612.0, 792.0)?;
//!
//! let mut content = ContentStreamBuilder::new();
//! content.begin_text().set_font("F1", 12.0).text(b"Hello", 72.0, 720.0, 0.0).end_text();
//! store.add_content(page, content.build()?)?;
//!
//! let info = DocumentInfo::default();
//! let config = DocumentConfig::default();
//! let bytes = PdfWriter::new(&store, &info, &config).finish()?;
//! assert!(bytes.starts_with(b"%PDF-1.4"));
//! # Ok::<(), pdfgen::Error>(())
//! ```

mod annotation_builder;
pub mod barcode;
mod content_stream;
pub mod image_handler;
mod object_serializer;
mod object_store;
mod outline_builder;
mod pdf_writer;
mod text_layout;

pub use annotation_builder::LinkAnnotation;
pub use barcode::{BarcodeGenerator, BarcodeType};
pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
pub use image_handler::{
    ColorSpace, ImageData, ImageDecoder, ImageError, ImageFormat, StandardImageDecoder,
};
pub use object_serializer::ObjectSerializer;
pub use object_store::{
    BookmarkData, LinkData, ObjectId, ObjectKind, ObjectStore, PageData, CATALOG_ID, INFO_ID,
    PAGES_ID,
};
pub use outline_builder::OutlineBuilder;
pub use pdf_writer::PdfWriter;
pub use text_layout::{LayoutLine, LinePlacement, TextAlign, TextLayout};
