//! Shadow-copy writer for BIFF8 workbooks
//!
//! Mutations are recorded against an immutable [`Workbook`](super::Workbook)
//! and turned into a complete new workbook stream on demand. The globals and
//! every untouched record are re-emitted byte-for-byte.

/// BIFF8 record generation
pub(crate) mod biff;

/// Text-to-number coercion
mod coerce;

/// Stream re-emission
mod serialize;

/// Mutation tracking
mod shadow;


pub use coerce::CoercionWarning;
pub use shadow::{FieldResolver, ShadowWorkbook};
