//! Document metadata and writer configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest value stored in a metadata field, in bytes.
pub const MAX_INFO_LEN: usize = 63;

/// Default ceiling on indirect objects (the PDF implementation limit).
pub const DEFAULT_MAX_OBJECTS: usize = 8_388_607;

/// Metadata written to the document's Info dictionary.
///
/// Every field is bounded to [`MAX_INFO_LEN`] bytes; longer values are
/// truncated on a character boundary when the document is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentInfo {
    /// Application that created the original content
    pub creator: String,
    /// Application that produced the PDF
    pub producer: String,
    /// Document title
    pub title: String,
    /// Document author
    pub author: String,
    /// Document subject
    pub subject: String,
    /// Creation date (`YYYYMMDDHHmmSS` style; empty means "now")
    pub date: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentInfo {
    /// Metadata with the stock defaults.
    pub fn new() -> Self {
        Self {
            creator: "IspCore".to_string(),
            producer: "IspCore".to_string(),
            title: "Default".to_string(),
            author: "IspCore".to_string(),
            subject: "Test".to_string(),
            date: "Default".to_string(),
        }
    }

    /// Load metadata from a JSON object; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidArgument(format!("invalid document info: {}", e)))
    }

    /// Set the creator.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// Set the producer.
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = producer.into();
        self
    }

    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set document subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the creation date. An empty string stamps the creation time.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Truncate every field to [`MAX_INFO_LEN`] bytes and resolve an empty
    /// date to the current UTC time.
    pub(crate) fn normalized(mut self) -> Self {
        for (name, field) in [
            ("creator", &mut self.creator),
            ("producer", &mut self.producer),
            ("title", &mut self.title),
            ("author", &mut self.author),
            ("subject", &mut self.subject),
            ("date", &mut self.date),
        ] {
            if field.len() > MAX_INFO_LEN {
                log::warn!("document {} truncated to {} bytes", name, MAX_INFO_LEN);
                let mut end = MAX_INFO_LEN;
                while !field.is_char_boundary(end) {
                    end -= 1;
                }
                field.truncate(end);
            }
        }
        if self.date.is_empty() {
            self.date = chrono::Utc::now().format("%Y%m%d%H%M%SZ").to_string();
        }
        self
    }
}

/// Configuration for PDF generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// PDF version written in the header (e.g., "1.4")
    pub version: String,
    /// Whether to compress content streams with FlateDecode
    pub compress: bool,
    /// Maximum number of indirect objects a document may allocate
    pub max_objects: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            version: "1.4".to_string(),
            compress: false,
            max_objects: DEFAULT_MAX_OBJECTS,
        }
    }
}

impl DocumentConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Enable or disable stream compression.
    ///
    /// When enabled, content streams are compressed using FlateDecode
    /// (zlib/deflate) to reduce file size.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Set the object ceiling.
    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = max_objects;
        self
    }
}
