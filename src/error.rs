//! Error types for the PDF engine.
//!
//! Every fallible operation returns [`Result`]. Each [`Error`] also maps onto a
//! coarse [`ErrorKind`] and a negative errno-style [`Error::code`], which is
//! what a [`Document`](crate::document::Document) records as its sticky error.

/// Result type alias for PDF engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// errno values used for numeric error codes.
const EINVAL: i32 = 22;
const ENOENT: i32 = 2;
const EIO: i32 = 5;
const ENOMEM: i32 = 12;
const EBADMSG: i32 = 74;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad font name, out-of-range numeric parameter, malformed payload
    InvalidArgument,
    /// Missing page, missing parent bookmark
    NotFound,
    /// File open/write failure
    Io,
    /// The image decoder could not interpret its input
    Decode,
    /// Object store exhaustion
    Allocation,
}

/// Error types that can occur while building or saving a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Generic invalid parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Font name is not one of the 14 standard fonts
    #[error("Unknown font: {0}")]
    UnknownFont(String),

    /// Requested page or object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bookmark parent id does not name an existing bookmark
    #[error("Invalid parent bookmark id {0}")]
    InvalidParent(i64),

    /// A page handle from another document was passed in
    #[error("Page handle belongs to a different document")]
    ForeignHandle,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error
    #[error("Image decoding error: {0}")]
    Decode(String),

    /// Barcode payload cannot be encoded in the requested symbology
    #[error("Barcode error: {0}")]
    Barcode(String),

    /// Object store exhausted
    #[error("Allocation failure: {0}")]
    Allocation(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_)
            | Error::UnknownFont(_)
            | Error::ForeignHandle
            | Error::Barcode(_) => ErrorKind::InvalidArgument,
            Error::NotFound(_) | Error::InvalidParent(_) => ErrorKind::NotFound,
            Error::Io(_) => ErrorKind::Io,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Allocation(_) => ErrorKind::Allocation,
        }
    }

    /// Negative errno-style code for this error.
    ///
    /// IO errors carry the OS error number when there is one.
    pub fn code(&self) -> i32 {
        match self {
            Error::Io(e) => -e.raw_os_error().unwrap_or(EIO),
            _ => match self.kind() {
                ErrorKind::InvalidArgument => -EINVAL,
                ErrorKind::NotFound => -ENOENT,
                ErrorKind::Io => -EIO,
                ErrorKind::Decode => -EBADMSG,
                ErrorKind::Allocation => -ENOMEM,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_font_error() {
        let err = Error::UnknownFont("Comic-Sans".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Unknown font"));
        assert!(msg.contains("Comic-Sans"));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.code(), -22);
    }

    #[test]
    fn test_invalid_parent_error() {
        let err = Error::InvalidParent(7);
        assert!(format!("{}", err).contains('7'));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.code(), -2);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(format!("{}", err).contains("IO error"));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.code(), -5);
    }

    #[test]
    fn test_io_error_keeps_os_code() {
        let err: Error = std::io::Error::from_raw_os_error(13).into();
        assert_eq!(err.code(), -13);
    }

    #[test]
    fn test_decode_and_allocation_codes() {
        assert_eq!(Error::Decode("bad".into()).code(), -74);
        assert_eq!(Error::Allocation("full".into()).code(), -12);
        assert_eq!(Error::ForeignHandle.kind(), ErrorKind::InvalidArgument);
        assert_eq!(Error::Barcode("x".into()).kind(), ErrorKind::InvalidArgument);
    }
}
