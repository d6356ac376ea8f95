//! Error type for `intake-store-fs`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid blob path: {0}")]
  InvalidPath(String),

  #[error("blob already exists: {0}")]
  AlreadyExists(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
