//! Object store: identifier allocation and typed payloads.
//!
//! Every PDF object a document owns lives here, indexed by a sequential
//! [`ObjectId`] starting at 1. Objects refer to each other only through ids,
//! which the serializer turns into indirect references.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::fonts::StandardFont;
use crate::geometry::Rect;
use crate::object::ObjectRef;
use crate::writer::image_handler::ImageData;

/// Identifier of the document catalog.
pub const CATALOG_ID: ObjectId = ObjectId(1);
/// Identifier of the page tree root.
pub const PAGES_ID: ObjectId = ObjectId(2);
/// Identifier of the Info dictionary.
pub const INFO_ID: ObjectId = ObjectId(3);

/// Sequential object number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Generation-0 indirect reference to this object.
    pub fn to_ref(self) -> ObjectRef {
        ObjectRef::new(self.0, 0)
    }

    fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A page and the objects hanging off it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageData {
    /// Width in points
    pub width: f32,
    /// Height in points
    pub height: f32,
    /// Content streams in drawing order
    pub contents: Vec<ObjectId>,
    /// Link annotations in creation order
    pub annotations: Vec<ObjectId>,
}

/// An outline entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkData {
    /// Page the entry jumps to
    pub page: ObjectId,
    /// Display title
    pub title: String,
    /// Parent entry, `None` for top-level entries
    pub parent: Option<ObjectId>,
    /// Child entries in insertion order
    pub children: Vec<ObjectId>,
}

/// A link annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkData {
    /// Clickable area on the source page
    pub rect: Rect,
    /// Destination page
    pub target: ObjectId,
    /// Left edge of the destination view
    pub target_x: f32,
    /// Top edge of the destination view
    pub target_y: f32,
}

/// Type-specific payload of a stored object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Document catalog
    Catalog,
    /// Page tree root
    Pages,
    /// Document information dictionary
    Info,
    /// A page
    Page(PageData),
    /// Uncompressed content stream operators
    Content(Vec<u8>),
    /// Standard Type 1 font
    Font(StandardFont),
    /// Image XObject and its optional soft mask
    Image {
        /// Pixel data
        image: ImageData,
        /// Soft mask image object
        smask: Option<ObjectId>,
    },
    /// Constant-alpha graphics state
    ExtGState {
        /// Fill alpha (inverted, 0 = opaque)
        fill_alpha: u8,
        /// Stroke alpha (inverted, 0 = opaque)
        stroke_alpha: u8,
    },
    /// Outline root
    Outlines,
    /// Outline entry
    Bookmark(BookmarkData),
    /// Link annotation
    Link(LinkData),
}

impl ObjectKind {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Catalog => "catalog",
            ObjectKind::Pages => "pages",
            ObjectKind::Info => "info",
            ObjectKind::Page(_) => "page",
            ObjectKind::Content(_) => "content",
            ObjectKind::Font(_) => "font",
            ObjectKind::Image { .. } => "image",
            ObjectKind::ExtGState { .. } => "extgstate",
            ObjectKind::Outlines => "outlines",
            ObjectKind::Bookmark(_) => "bookmark",
            ObjectKind::Link(_) => "link",
        }
    }
}

/// Owns every object of one document.
#[derive(Debug)]
pub struct ObjectStore {
    objects: Vec<ObjectKind>,
    max_objects: usize,
    pages: Vec<ObjectId>,
    fonts: IndexMap<StandardFont, ObjectId>,
    ext_gstates: IndexMap<(u8, u8), ObjectId>,
    images: Vec<ObjectId>,
    outline_root: Option<ObjectId>,
    top_level_bookmarks: Vec<ObjectId>,
    bookmarks: Vec<ObjectId>,
}

impl ObjectStore {
    /// Create a store holding the catalog, page tree root and Info
    /// dictionary as objects 1, 2 and 3.
    pub fn new(max_objects: usize) -> Result<Self> {
        let mut store = Self {
            objects: Vec::new(),
            max_objects,
            pages: Vec::new(),
            fonts: IndexMap::new(),
            ext_gstates: IndexMap::new(),
            images: Vec::new(),
            outline_root: None,
            top_level_bookmarks: Vec::new(),
            bookmarks: Vec::new(),
        };
        store.alloc(ObjectKind::Catalog)?;
        store.alloc(ObjectKind::Pages)?;
        store.alloc(ObjectKind::Info)?;
        Ok(store)
    }

    /// Store `kind` under the next identifier.
    pub fn alloc(&mut self, kind: ObjectKind) -> Result<ObjectId> {
        if self.objects.len() >= self.max_objects {
            return Err(Error::Allocation(format!(
                "object limit of {} reached",
                self.max_objects
            )));
        }
        self.objects
            .try_reserve(1)
            .map_err(|e| Error::Allocation(e.to_string()))?;

        self.objects.push(kind);
        let id = ObjectId(self.objects.len() as u32);
        log::debug!("allocated {} object {}", self.objects[id.index()].label(), id);
        Ok(id)
    }

    /// Number of stored objects (the highest identifier).
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store is empty. Never true after [`ObjectStore::new`].
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object.
    pub fn get(&self, id: ObjectId) -> Option<&ObjectKind> {
        if id.0 == 0 {
            return None;
        }
        self.objects.get(id.index())
    }

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut ObjectKind> {
        if id.0 == 0 {
            return None;
        }
        self.objects.get_mut(id.index())
    }

    /// All objects in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &ObjectKind)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, kind)| (ObjectId(i as u32 + 1), kind))
    }

    /// Allocate a page and append it to the page sequence.
    pub fn add_page(&mut self, width: f32, height: f32) -> Result<ObjectId> {
        self.pages.try_reserve(1).map_err(|e| Error::Allocation(e.to_string()))?;
        let id = self.alloc(ObjectKind::Page(PageData {
            width,
            height,
            contents: Vec::new(),
            annotations: Vec::new(),
        }))?;
        self.pages.push(id);
        Ok(id)
    }

    /// Pages in document order.
    pub fn pages(&self) -> &[ObjectId] {
        &self.pages
    }

    /// Page payload for `id`.
    pub fn page(&self, id: ObjectId) -> Option<&PageData> {
        match self.get(id) {
            Some(ObjectKind::Page(page)) => Some(page),
            _ => None,
        }
    }

    /// Mutable page payload for `id`.
    pub fn page_mut(&mut self, id: ObjectId) -> Option<&mut PageData> {
        match self.get_mut(id) {
            Some(ObjectKind::Page(page)) => Some(page),
            _ => None,
        }
    }

    fn require_page(&mut self, id: ObjectId) -> Result<&mut PageData> {
        self.page_mut(id)
            .ok_or_else(|| Error::NotFound(format!("object {} is not a page", id)))
    }

    /// Append a content stream to `page`.
    pub fn add_content(&mut self, page: ObjectId, data: Vec<u8>) -> Result<ObjectId> {
        self.require_page(page)?
            .contents
            .try_reserve(1)
            .map_err(|e| Error::Allocation(e.to_string()))?;
        let id = self.alloc(ObjectKind::Content(data))?;
        self.require_page(page)?.contents.push(id);
        Ok(id)
    }

    /// Object for `font`, allocating it on first use.
    pub fn font(&mut self, font: StandardFont) -> Result<ObjectId> {
        if let Some(&id) = self.fonts.get(&font) {
            return Ok(id);
        }
        let id = self.alloc(ObjectKind::Font(font))?;
        self.fonts.insert(font, id);
        Ok(id)
    }

    /// Page resource name of a registered font (`F1` is the first).
    pub fn font_resource(&self, font: StandardFont) -> Option<String> {
        self.fonts.get_index_of(&font).map(|i| format!("F{}", i + 1))
    }

    /// Registered fonts with their resource names, in registration order.
    pub fn fonts(&self) -> impl Iterator<Item = (String, ObjectId)> + '_ {
        self.fonts
            .values()
            .enumerate()
            .map(|(i, &id)| (format!("F{}", i + 1), id))
    }

    /// Graphics state resource name for the given inverted alphas, or `None`
    /// when both are fully opaque.
    pub fn ext_gstate(&mut self, fill_alpha: u8, stroke_alpha: u8) -> Result<Option<String>> {
        if fill_alpha == 0 && stroke_alpha == 0 {
            return Ok(None);
        }
        let key = (fill_alpha, stroke_alpha);
        let index = match self.ext_gstates.get_index_of(&key) {
            Some(index) => index,
            None => {
                let id = self.alloc(ObjectKind::ExtGState {
                    fill_alpha,
                    stroke_alpha,
                })?;
                self.ext_gstates.insert(key, id);
                self.ext_gstates.len() - 1
            },
        };
        Ok(Some(format!("GS{}", index + 1)))
    }

    /// Registered graphics states with their resource names.
    pub fn ext_gstates(&self) -> impl Iterator<Item = (String, ObjectId)> + '_ {
        self.ext_gstates
            .values()
            .enumerate()
            .map(|(i, &id)| (format!("GS{}", i + 1), id))
    }

    /// Store an image, splitting off its soft mask, and return the image id.
    pub fn add_image(&mut self, mut image: ImageData) -> Result<ObjectId> {
        self.images.try_reserve(1).map_err(|e| Error::Allocation(e.to_string()))?;
        let mask = image.take_soft_mask();
        let id = self.alloc(ObjectKind::Image { image, smask: None })?;
        if let Some(mask) = mask {
            let mask_id = self.alloc(ObjectKind::Image {
                image: mask,
                smask: None,
            })?;
            if let Some(ObjectKind::Image { smask, .. }) = self.get_mut(id) {
                *smask = Some(mask_id);
            }
        }
        self.images.push(id);
        Ok(id)
    }

    /// Image XObject resource name for an image id.
    pub fn image_resource(id: ObjectId) -> String {
        format!("Image{}", id)
    }

    /// Images painted through page resources (soft masks excluded).
    pub fn images(&self) -> &[ObjectId] {
        &self.images
    }

    /// Add an outline entry under `parent` (or at top level).
    ///
    /// `parent` must already be a bookmark.
    pub fn add_bookmark(
        &mut self,
        page: ObjectId,
        title: &str,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId> {
        if let Some(parent) = parent {
            if !matches!(self.get(parent), Some(ObjectKind::Bookmark(_))) {
                return Err(Error::NotFound(format!("object {} is not a bookmark", parent)));
            }
        }
        self.bookmarks.try_reserve(1).map_err(|e| Error::Allocation(e.to_string()))?;
        if self.outline_root.is_none() {
            self.outline_root = Some(self.alloc(ObjectKind::Outlines)?);
        }

        let id = self.alloc(ObjectKind::Bookmark(BookmarkData {
            page,
            title: title.to_string(),
            parent,
            children: Vec::new(),
        }))?;
        self.bookmarks.push(id);

        match parent {
            Some(parent) => {
                if let Some(ObjectKind::Bookmark(data)) = self.get_mut(parent) {
                    data.children.push(id);
                }
            },
            None => self.top_level_bookmarks.push(id),
        }
        Ok(id)
    }

    /// Outline root, present once any bookmark exists.
    pub fn outline_root(&self) -> Option<ObjectId> {
        self.outline_root
    }

    /// Top-level bookmarks in insertion order.
    pub fn top_level_bookmarks(&self) -> &[ObjectId] {
        &self.top_level_bookmarks
    }

    /// Bookmark payload for `id`.
    pub fn bookmark(&self, id: ObjectId) -> Option<&BookmarkData> {
        match self.get(id) {
            Some(ObjectKind::Bookmark(b)) => Some(b),
            _ => None,
        }
    }

    /// Every bookmark in creation order.
    pub fn bookmarks(&self) -> &[ObjectId] {
        &self.bookmarks
    }

    /// Add a link annotation from `page` to `data.target`.
    pub fn add_link(&mut self, page: ObjectId, data: LinkData) -> Result<ObjectId> {
        if self.page(data.target).is_none() {
            return Err(Error::NotFound(format!("object {} is not a page", data.target)));
        }
        self.require_page(page)?
            .annotations
            .try_reserve(1)
            .map_err(|e| Error::Allocation(e.to_string()))?;
        let id = self.alloc(ObjectKind::Link(data))?;
        self.require_page(page)?.annotations.push(id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_fixed_leading_objects() {
        let store = ObjectStore::new(100).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(CATALOG_ID), Some(&ObjectKind::Catalog));
        assert_eq!(store.get(PAGES_ID), Some(&ObjectKind::Pages));
        assert_eq!(store.get(INFO_ID), Some(&ObjectKind::Info));
        assert_eq!(store.get(ObjectId(0)), None);
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut store = ObjectStore::new(100).unwrap();
        let font = store.font(StandardFont::TimesRoman).unwrap();
        let page = store.add_page(612.0, 792.0).unwrap();
        assert_eq!(font, ObjectId(4));
        assert_eq!(page, ObjectId(5));
        let ids: Vec<u32> = store.iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_object_limit() {
        let mut store = ObjectStore::new(4).unwrap();
        store.add_page(10.0, 10.0).unwrap();
        let err = store.add_page(10.0, 10.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Allocation);
        assert_eq!(store.pages().len(), 1);
    }

    #[test]
    fn test_fonts_registered_once() {
        let mut store = ObjectStore::new(100).unwrap();
        let a = store.font(StandardFont::Helvetica).unwrap();
        let b = store.font(StandardFont::Courier).unwrap();
        assert_eq!(store.font(StandardFont::Helvetica).unwrap(), a);
        assert_eq!(store.font_resource(StandardFont::Courier).as_deref(), Some("F2"));
        let fonts: Vec<_> = store.fonts().collect();
        assert_eq!(fonts, vec![("F1".to_string(), a), ("F2".to_string(), b)]);
    }

    #[test]
    fn test_ext_gstate_shared_per_alpha_pair() {
        let mut store = ObjectStore::new(100).unwrap();
        assert_eq!(store.ext_gstate(0, 0).unwrap(), None);
        assert_eq!(store.ext_gstate(0x80, 0).unwrap().as_deref(), Some("GS1"));
        assert_eq!(store.ext_gstate(0, 0x80).unwrap().as_deref(), Some("GS2"));
        assert_eq!(store.ext_gstate(0x80, 0).unwrap().as_deref(), Some("GS1"));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_content_appended_to_page() {
        let mut store = ObjectStore::new(100).unwrap();
        let page = store.add_page(100.0, 100.0).unwrap();
        let c1 = store.add_content(page, b"0 0 m".to_vec()).unwrap();
        let c2 = store.add_content(page, b"1 1 l".to_vec()).unwrap();
        assert_eq!(store.page(page).unwrap().contents, vec![c1, c2]);
        assert!(store.add_content(c1, Vec::new()).is_err());
    }

    #[test]
    fn test_image_soft_mask_gets_own_object() {
        let mut store = ObjectStore::new(100).unwrap();
        let mut image = ImageData::from_rgb24(1, 1, &[0, 0, 0]).unwrap();
        image.soft_mask = Some(vec![0x78, 0x9C]);
        let id = store.add_image(image).unwrap();
        match store.get(id) {
            Some(ObjectKind::Image { smask: Some(mask), image }) => {
                assert_eq!(mask.0, id.0 + 1);
                assert!(image.soft_mask.is_none());
            },
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(store.images(), &[id]);
        assert_eq!(ObjectStore::image_resource(id), format!("Image{}", id.0));
    }

    #[test]
    fn test_bookmark_forest() {
        let mut store = ObjectStore::new(100).unwrap();
        let page = store.add_page(100.0, 100.0).unwrap();
        let top = store.add_bookmark(page, "Chapter", None).unwrap();
        let child = store.add_bookmark(page, "Section", Some(top)).unwrap();
        let second = store.add_bookmark(page, "Appendix", None).unwrap();

        assert!(store.outline_root().is_some());
        assert_eq!(store.top_level_bookmarks(), &[top, second]);
        assert_eq!(store.bookmark(top).unwrap().children, vec![child]);
        assert_eq!(store.bookmark(child).unwrap().parent, Some(top));
        assert!(store.add_bookmark(page, "Bad", Some(page)).is_err());
    }

    #[test]
    fn test_link_requires_page_target() {
        let mut store = ObjectStore::new(100).unwrap();
        let page = store.add_page(100.0, 100.0).unwrap();
        let link = LinkData {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            target: page,
            target_x: 0.0,
            target_y: 100.0,
        };
        let id = store.add_link(page, link.clone()).unwrap();
        assert_eq!(store.page(page).unwrap().annotations, vec![id]);

        let bad = LinkData { target: CATALOG_ID, ..link };
        assert_eq!(store.add_link(page, bad).unwrap_err().kind(), ErrorKind::NotFound);
    }
}
