//! Document outline (bookmarks) lowering.
//!
//! Bookmarks are stored as a forest in the [`ObjectStore`]; this module turns
//! it into the linked outline dictionaries of PDF spec Section 12.3.3. All
//! entries are written open, so `/Count` is the number of descendants.

use std::collections::HashMap;

use crate::object::{Dict, Object};
use crate::writer::object_store::{ObjectId, ObjectStore};

/// Builds outline dictionaries from the store's bookmarks.
#[derive(Debug)]
pub struct OutlineBuilder<'a> {
    store: &'a ObjectStore,
    /// Descendant count per bookmark that has children
    counts: HashMap<ObjectId, i64>,
}

impl<'a> OutlineBuilder<'a> {
    /// Prepare to lower the bookmarks of `store`.
    pub fn new(store: &'a ObjectStore) -> Self {
        let mut counts: HashMap<ObjectId, i64> = HashMap::new();
        // Children are always created after their parent.
        for &id in store.bookmarks().iter().rev() {
            let own = counts.get(&id).copied().unwrap_or(0);
            if let Some(parent) = store.bookmark(id).and_then(|b| b.parent) {
                *counts.entry(parent).or_insert(0) += own + 1;
            }
        }
        Self { store, counts }
    }

    /// The `/Type /Outlines` root dictionary, if any bookmark exists.
    pub fn build_root(&self) -> Option<Object> {
        let roots = self.store.top_level_bookmarks();
        let (first, last) = (roots.first()?, roots.last()?);

        let mut dict = Dict::new();
        dict.insert("Type".to_string(), Object::Name("Outlines".to_string()));
        dict.insert("First".to_string(), Object::Reference(first.to_ref()));
        dict.insert("Last".to_string(), Object::Reference(last.to_ref()));
        dict.insert("Count".to_string(), Object::Integer(self.store.bookmarks().len() as i64));
        Some(Object::Dictionary(dict))
    }

    /// The outline item dictionary for bookmark `id`.
    pub fn build_item(&self, id: ObjectId) -> Option<Object> {
        let bookmark = self.store.bookmark(id)?;
        let root = self.store.outline_root()?;

        let siblings = match bookmark.parent.and_then(|p| self.store.bookmark(p)) {
            Some(parent) => parent.children.as_slice(),
            None => self.store.top_level_bookmarks(),
        };
        let position = siblings.iter().position(|&s| s == id)?;

        let mut dict = Dict::new();
        dict.insert("Title".to_string(), Object::text_string(&bookmark.title));
        dict.insert(
            "Parent".to_string(),
            Object::Reference(bookmark.parent.unwrap_or(root).to_ref()),
        );
        if position > 0 {
            dict.insert("Prev".to_string(), Object::Reference(siblings[position - 1].to_ref()));
        }
        if let Some(next) = siblings.get(position + 1) {
            dict.insert("Next".to_string(), Object::Reference(next.to_ref()));
        }
        if let (Some(first), Some(last)) = (bookmark.children.first(), bookmark.children.last()) {
            dict.insert("First".to_string(), Object::Reference(first.to_ref()));
            dict.insert("Last".to_string(), Object::Reference(last.to_ref()));
            let count = self.counts.get(&id).copied().unwrap_or(0);
            dict.insert("Count".to_string(), Object::Integer(count));
        }

        let page_height = self.store.page(bookmark.page).map_or(0.0, |p| p.height);
        dict.insert(
            "Dest".to_string(),
            Object::Array(vec![
                Object::Reference(bookmark.page.to_ref()),
                Object::Name("XYZ".to_string()),
                Object::Integer(0),
                Object::from(page_height),
                Object::Null,
            ]),
        );

        Some(Object::Dictionary(dict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::object_serializer::ObjectSerializer;

    fn render(obj: &Object) -> String {
        ObjectSerializer::compact().serialize_to_string(obj).unwrap()
    }

    #[test]
    fn test_no_bookmarks_no_root() {
        let store = ObjectStore::new(100).unwrap();
        assert!(OutlineBuilder::new(&store).build_root().is_none());
    }

    #[test]
    fn test_links_and_counts() {
        let mut store = ObjectStore::new(100).unwrap();
        let page = store.add_page(612.0, 792.0).unwrap(); // 4
        let a = store.add_bookmark(page, "A", None).unwrap(); // root 5, a 6
        let a1 = store.add_bookmark(page, "A.1", Some(a)).unwrap(); // 7
        let a1x = store.add_bookmark(page, "A.1.x", Some(a1)).unwrap(); // 8
        let a2 = store.add_bookmark(page, "A.2", Some(a)).unwrap(); // 9
        let b = store.add_bookmark(page, "B", None).unwrap(); // 10

        let builder = OutlineBuilder::new(&store);
        assert_eq!(
            render(&builder.build_root().unwrap()),
            "<< /Type /Outlines /First 6 0 R /Last 10 0 R /Count 5 >>"
        );

        let item_a = render(&builder.build_item(a).unwrap());
        assert!(item_a.contains("/Parent 5 0 R"));
        assert!(item_a.contains("/Next 10 0 R"));
        assert!(item_a.contains("/First 7 0 R /Last 9 0 R /Count 3"));
        assert!(item_a.ends_with("/Dest [4 0 R /XYZ 0 792 null] >>"));

        let item_a1 = render(&builder.build_item(a1).unwrap());
        assert!(item_a1.contains("/Parent 6 0 R"));
        assert!(item_a1.contains("/Next 9 0 R"));
        assert!(item_a1.contains("/Count 1"));

        let leaf = render(&builder.build_item(a1x).unwrap());
        assert!(!leaf.contains("/Count"));
        assert!(!leaf.contains("/Prev"));

        let item_b = render(&builder.build_item(b).unwrap());
        assert!(item_b.contains("/Prev 6 0 R"));
        assert!(!item_b.contains("/Next"));
        assert!(render(&builder.build_item(a2).unwrap()).contains("/Prev 7 0 R"));
    }

    #[test]
    fn test_non_ascii_title_is_utf16() {
        let mut store = ObjectStore::new(100).unwrap();
        let page = store.add_page(100.0, 100.0).unwrap();
        let id = store.add_bookmark(page, "Über", None).unwrap();
        let item = render(&OutlineBuilder::new(&store).build_item(id).unwrap());
        assert!(item.starts_with("<< /Title <FEFF00DC"));
    }
}
