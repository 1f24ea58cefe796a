//! PDF document writer.
//!
//! Assembles complete PDF documents with proper structure:
//! header, body, xref table, and trailer. Objects are written in ascending
//! identifier order and the xref table records where each one starts.

use std::io::Write;

use md5::{Digest, Md5};

use super::annotation_builder::LinkAnnotation;
use super::object_serializer::ObjectSerializer;
use super::object_store::{
    ObjectId, ObjectKind, ObjectStore, PageData, CATALOG_ID, INFO_ID, PAGES_ID,
};
use super::outline_builder::OutlineBuilder;
use crate::config::{DocumentConfig, DocumentInfo};
use crate::error::Result;
use crate::object::{Dict, Object};

/// Compress data using Flate/Deflate compression.
///
/// Returns compressed bytes suitable for FlateDecode filter.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Serializes an [`ObjectStore`] into a complete PDF file.
pub struct PdfWriter<'a> {
    store: &'a ObjectStore,
    info: &'a DocumentInfo,
    config: &'a DocumentConfig,
    outlines: OutlineBuilder<'a>,
    /// Resource dictionary shared by every page
    resources: Object,
}

impl<'a> PdfWriter<'a> {
    /// Prepare to write `store`.
    pub fn new(store: &'a ObjectStore, info: &'a DocumentInfo, config: &'a DocumentConfig) -> Self {
        Self {
            store,
            info,
            config,
            outlines: OutlineBuilder::new(store),
            resources: Self::build_resources(store),
        }
    }

    /// Every page lists every font, image and graphics state.
    fn build_resources(store: &ObjectStore) -> Object {
        let mut resources = Dict::new();
        resources.insert(
            "ProcSet".to_string(),
            Object::Array(
                ["PDF", "Text", "ImageB", "ImageC"]
                    .iter()
                    .map(|n| Object::Name(n.to_string()))
                    .collect(),
            ),
        );

        let fonts: Dict = store
            .fonts()
            .map(|(name, id)| (name, Object::Reference(id.to_ref())))
            .collect();
        if !fonts.is_empty() {
            resources.insert("Font".to_string(), Object::Dictionary(fonts));
        }

        let images: Dict = store
            .images()
            .iter()
            .map(|&id| (ObjectStore::image_resource(id), Object::Reference(id.to_ref())))
            .collect();
        if !images.is_empty() {
            resources.insert("XObject".to_string(), Object::Dictionary(images));
        }

        let states: Dict = store
            .ext_gstates()
            .map(|(name, id)| (name, Object::Reference(id.to_ref())))
            .collect();
        if !states.is_empty() {
            resources.insert("ExtGState".to_string(), Object::Dictionary(states));
        }

        Object::Dictionary(resources)
    }

    /// Lower a stored object to the value written in its `obj` block.
    pub fn lower(&self, id: ObjectId, kind: &ObjectKind) -> Result<Object> {
        let obj = match kind {
            ObjectKind::Catalog => {
                let mut entries = vec![
                    ("Type", ObjectSerializer::name("Catalog")),
                    ("Pages", Object::Reference(PAGES_ID.to_ref())),
                ];
                if let Some(root) = self.store.outline_root() {
                    entries.push(("Outlines", Object::Reference(root.to_ref())));
                    entries.push(("PageMode", ObjectSerializer::name("UseOutlines")));
                }
                ObjectSerializer::dict(entries)
            },
            ObjectKind::Pages => ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Pages")),
                (
                    "Kids",
                    Object::Array(
                        self.store
                            .pages()
                            .iter()
                            .map(|p| Object::Reference(p.to_ref()))
                            .collect(),
                    ),
                ),
                ("Count", ObjectSerializer::integer(self.store.pages().len() as i64)),
            ]),
            ObjectKind::Info => self.build_info(),
            ObjectKind::Page(page) => self.build_page(page),
            ObjectKind::Content(data) => {
                let mut dict = Dict::new();
                let data = if self.config.compress {
                    dict.insert("Filter".to_string(), ObjectSerializer::name("FlateDecode"));
                    compress_data(data)?
                } else {
                    data.clone()
                };
                Object::Stream {
                    dict,
                    data: bytes::Bytes::from(data),
                }
            },
            ObjectKind::Font(font) => {
                let mut entries = vec![
                    ("Type", ObjectSerializer::name("Font")),
                    ("Subtype", ObjectSerializer::name("Type1")),
                    ("BaseFont", ObjectSerializer::name(font.name())),
                ];
                if !font.is_symbolic() {
                    entries.push(("Encoding", ObjectSerializer::name("WinAnsiEncoding")));
                }
                ObjectSerializer::dict(entries)
            },
            ObjectKind::Image { image, smask } => Object::Stream {
                dict: image.build_xobject_dict(smask.map(ObjectId::to_ref)),
                data: bytes::Bytes::from(image.data.clone()),
            },
            ObjectKind::ExtGState {
                fill_alpha,
                stroke_alpha,
            } => ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("ExtGState")),
                ("ca", ObjectSerializer::real(opacity(*fill_alpha))),
                ("CA", ObjectSerializer::real(opacity(*stroke_alpha))),
            ]),
            ObjectKind::Outlines => self.outlines.build_root().unwrap_or(Object::Null),
            ObjectKind::Bookmark(_) => self.outlines.build_item(id).unwrap_or(Object::Null),
            ObjectKind::Link(link) => LinkAnnotation::new(link).build(),
        };
        Ok(obj)
    }

    fn build_info(&self) -> Object {
        let info = self.info;
        let date = format!("D:{}", info.date);
        ObjectSerializer::dict(vec![
            ("Creator", Object::text_string(&info.creator)),
            ("Producer", Object::text_string(&info.producer)),
            ("Title", Object::text_string(&info.title)),
            ("Author", Object::text_string(&info.author)),
            ("Subject", Object::text_string(&info.subject)),
            ("CreationDate", Object::text_string(&date)),
            ("ModDate", Object::text_string(&date)),
        ])
    }

    fn build_page(&self, page: &PageData) -> Object {
        let mut entries = vec![
            ("Type", ObjectSerializer::name("Page")),
            ("Parent", Object::Reference(PAGES_ID.to_ref())),
            (
                "MediaBox",
                ObjectSerializer::rect(0.0, 0.0, page.width as f64, page.height as f64),
            ),
            (
                "Contents",
                Object::Array(
                    page.contents
                        .iter()
                        .map(|c| Object::Reference(c.to_ref()))
                        .collect(),
                ),
            ),
            ("Resources", self.resources.clone()),
        ];
        if !page.annotations.is_empty() {
            entries.push((
                "Annots",
                Object::Array(
                    page.annotations
                        .iter()
                        .map(|a| Object::Reference(a.to_ref()))
                        .collect(),
                ),
            ));
        }
        ObjectSerializer::dict(entries)
    }

    /// Build the complete PDF document.
    pub fn finish(&self) -> Result<Vec<u8>> {
        let serializer = ObjectSerializer::compact();
        let mut output = Vec::new();
        let mut xref_offsets: Vec<usize> = Vec::with_capacity(self.store.len());

        // PDF Header
        writeln!(output, "%PDF-{}", self.config.version)?;
        // Binary marker (recommended for binary content)
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        for (id, kind) in self.store.iter() {
            let obj = self.lower(id, kind)?;
            xref_offsets.push(output.len());
            serializer.write_indirect(&mut output, id.0, 0, &obj)?;
        }

        let file_id = Md5::digest(&output).to_vec();

        // Write xref table
        let xref_start = output.len();
        let size = xref_offsets.len() + 1;
        writeln!(output, "xref")?;
        writeln!(output, "0 {}", size)?;

        // Object 0 is always free
        writeln!(output, "0000000000 65535 f ")?;
        for offset in &xref_offsets {
            writeln!(output, "{:010} 00000 n ", offset)?;
        }

        // Write trailer
        let trailer = ObjectSerializer::dict(vec![
            ("Size", ObjectSerializer::integer(size as i64)),
            ("Root", Object::Reference(CATALOG_ID.to_ref())),
            ("Info", Object::Reference(INFO_ID.to_ref())),
            (
                "ID",
                Object::Array(vec![
                    Object::String(file_id.clone()),
                    Object::String(file_id),
                ]),
            ),
        ]);

        writeln!(output, "trailer")?;
        serializer.write_object(&mut output, &trailer)?;
        writeln!(output)?;
        writeln!(output, "startxref")?;
        writeln!(output, "{}", xref_start)?;
        writeln!(output, "%%EOF")?;

        log::debug!(
            "serialized {} objects into {} bytes",
            xref_offsets.len(),
            output.len()
        );
        Ok(output)
    }
}

/// PDF opacity for an inverted 8-bit alpha.
fn opacity(alpha: u8) -> f64 {
    (255 - alpha) as f64 / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::StandardFont;

    fn write(store: &ObjectStore) -> String {
        let info = DocumentInfo::default();
        let config = DocumentConfig::default();
        let bytes = PdfWriter::new(store, &info, &config).finish().unwrap();
        String::from_utf8_lossy(&bytes).to_string()
    }

    fn store_with_page() -> (ObjectStore, ObjectId) {
        let mut store = ObjectStore::new(100).unwrap();
        store.font(StandardFont::TimesRoman).unwrap();
        let page = store.add_page(612.0, 792.0).unwrap();
        (store, page)
    }

    #[test]
    fn test_create_empty_pdf() {
        let (store, _) = store_with_page();
        let content = write(&store);

        assert!(content.starts_with("%PDF-1.4\n"));
        assert!(content.contains("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n"));
        assert!(content.contains("<< /Type /Pages /Kids [5 0 R] /Count 1 >>"));
        assert!(content.contains("/MediaBox [0 0 612 792]"));
        assert!(content.contains("xref\n0 6\n0000000000 65535 f \n"));
        assert!(content.contains("/Size 6 /Root 1 0 R /Info 3 0 R /ID ["));
        assert!(content.ends_with("%%EOF\n"));
    }

    #[test]
    fn test_info_dictionary() {
        let (store, _) = store_with_page();
        let content = write(&store);
        assert!(content.contains(
            "<< /Creator (IspCore) /Producer (IspCore) /Title (Default) /Author (IspCore) \
             /Subject (Test) /CreationDate (D:Default) /ModDate (D:Default) >>"
        ));
    }

    #[test]
    fn test_font_objects() {
        let (mut store, _) = store_with_page();
        store.font(StandardFont::ZapfDingbats).unwrap();
        let content = write(&store);
        assert!(content.contains(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Times-Roman /Encoding /WinAnsiEncoding >>"
        ));
        assert!(content.contains("<< /Type /Font /Subtype /Type1 /BaseFont /ZapfDingbats >>"));
        assert!(content.contains("/Font << /F1 4 0 R /F2 6 0 R >>"));
    }

    #[test]
    fn test_compressed_content() {
        let (mut store, page) = store_with_page();
        store.add_content(page, b"0 0 m 10 10 l S".to_vec()).unwrap();
        let info = DocumentInfo::default();
        let config = DocumentConfig::default().with_compress(true);
        let bytes = PdfWriter::new(&store, &info, &config).finish().unwrap();
        let content = String::from_utf8_lossy(&bytes);
        assert!(content.contains("<< /Filter /FlateDecode /Length "));
        assert!(!content.contains("10 10 l"));
    }

    #[test]
    fn test_ext_gstate_opacity() {
        let (mut store, _) = store_with_page();
        store.ext_gstate(0x80, 0).unwrap();
        let content = write(&store);
        assert!(content.contains("<< /Type /ExtGState /ca 0.49804 /CA 1 >>"));
        assert!(content.contains("/ExtGState << /GS1 6 0 R >>"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let (store, _) = store_with_page();
        assert_eq!(write(&store), write(&store));
    }
}
