//! Error types for BIFF8 workbook parsing and writing

use std::fmt;

/// Result type alias for BIFF8 operations
pub type XlsResult<T> = Result<T, XlsError>;

/// Errors raised while reading or re-emitting a workbook stream
#[derive(Debug)]
pub enum XlsError {
    /// I/O error
    Io(std::io::Error),
    /// Compound file error
    Cfb(crate::ole::file::OleError),
    /// Neither a `Workbook` nor a `Book` stream
    MissingWorkbookStream,
    /// Malformed BIFF record
    InvalidRecord {
        /// Record type
        record_type: u16,
        /// Error description
        message: String,
    },
    /// Only BIFF8 streams are readable
    UnsupportedBiffVersion(u16),
    /// Workbook is encrypted (`FILEPASS`)
    PasswordProtected,
    /// Record shorter than its fixed layout
    InvalidLength {
        /// Expected length
        expected: usize,
        /// Found length
        found: usize,
    },
    /// Record header runs past the end of the stream
    UnexpectedEndOfStream(String),
    /// Invalid data
    InvalidData(String),
    /// Unexpected record type
    UnexpectedRecordType {
        /// Expected record type
        expected: u16,
        /// Found record type
        found: u16,
    },
}

impl fmt::Display for XlsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XlsError::Io(e) => write!(f, "I/O error: {}", e),
            XlsError::Cfb(e) => write!(f, "CFB error: {}", e),
            XlsError::MissingWorkbookStream => {
                write!(f, "Container has no Workbook or Book stream")
            },
            XlsError::InvalidRecord {
                record_type,
                message,
            } => {
                write!(f, "Invalid record 0x{:04X}: {}", record_type, message)
            },
            XlsError::UnsupportedBiffVersion(version) => {
                write!(f, "Unsupported BIFF version: 0x{:04X}", version)
            },
            XlsError::PasswordProtected => {
                write!(f, "Workbook is password protected")
            },
            XlsError::InvalidLength { expected, found } => {
                write!(f, "Invalid length: expected {}, found {}", expected, found)
            },
            XlsError::UnexpectedEndOfStream(context) => {
                write!(f, "Unexpected end of stream: {}", context)
            },
            XlsError::InvalidData(msg) => {
                write!(f, "Invalid data: {}", msg)
            },
            XlsError::UnexpectedRecordType { expected, found } => {
                write!(
                    f,
                    "Unexpected record type: expected 0x{:04X}, found 0x{:04X}",
                    expected, found
                )
            },
        }
    }
}

impl std::error::Error for XlsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XlsError::Io(e) => Some(e),
            XlsError::Cfb(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for XlsError {
    fn from(err: std::io::Error) -> Self {
        XlsError::Io(err)
    }
}

impl From<crate::ole::file::OleError> for XlsError {
    fn from(err: crate::ole::file::OleError) -> Self {
        XlsError::Cfb(err)
    }
}

impl From<crate::common::binary::BinaryError> for XlsError {
    fn from(err: crate::common::binary::BinaryError) -> Self {
        XlsError::InvalidData(err.to_string())
    }
}
