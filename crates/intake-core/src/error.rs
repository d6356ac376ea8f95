//! Error types for `intake-core`.
//!
//! Validation and file-policy failures are not errors in this sense; they are
//! reported through [`Violations`](crate::validate::Violations) and
//! [`FileRejection`](crate::files::FileRejection).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown submission status: {0:?}")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
