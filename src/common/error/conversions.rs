//! Error conversion implementations.
//!
//! Compound-file and BIFF errors raised while opening a document are
//! malformed input. The reconstructor maps its own failures explicitly.

use super::types::Error;

impl From<crate::ole::OleError> for Error {
    fn from(err: crate::ole::OleError) -> Self {
        Error::MalformedContainer(err.to_string())
    }
}

impl From<crate::ole::xls::XlsError> for Error {
    fn from(err: crate::ole::xls::XlsError) -> Self {
        match err {
            crate::ole::xls::XlsError::Io(e) => Error::Io(e),
            other => Error::MalformedContainer(other.to_string()),
        }
    }
}
