//! Link annotations.
//!
//! A link is a clickable rectangle on one page that jumps to a view of
//! another page (PDF spec Section 12.5.6.5).

use crate::object::{Dict, Object};
use crate::writer::object_store::LinkData;

/// A link annotation that goes to a page.
#[derive(Debug, Clone)]
pub struct LinkAnnotation<'a> {
    link: &'a LinkData,
}

impl<'a> LinkAnnotation<'a> {
    /// Wrap a stored link.
    pub fn new(link: &'a LinkData) -> Self {
        Self { link }
    }

    /// Build the annotation dictionary.
    pub fn build(&self) -> Object {
        let mut dict = Dict::new();

        dict.insert("Type".to_string(), Object::Name("Annot".to_string()));
        dict.insert("Subtype".to_string(), Object::Name("Link".to_string()));
        dict.insert(
            "Rect".to_string(),
            Object::Array(self.link.rect.corners().iter().map(|&v| Object::from(v)).collect()),
        );
        dict.insert(
            "Dest".to_string(),
            Object::Array(vec![
                Object::Reference(self.link.target.to_ref()),
                Object::Name("XYZ".to_string()),
                Object::from(self.link.target_x),
                Object::from(self.link.target_y),
                Object::Null,
            ]),
        );
        // No visible border.
        dict.insert(
            "Border".to_string(),
            Object::Array(vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)]),
        );

        Object::Dictionary(dict)
    }
}
