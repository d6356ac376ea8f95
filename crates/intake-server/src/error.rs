//! Error types and axum `IntoResponse` implementation.
//!
//! Every failure on the submission path is a client error: the caller fixes
//! the input or resubmits. Storage messages are surfaced as-is.

use axum::{
  extract::multipart::MultipartError,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use intake_core::{files::FileRejection, validate::Violations};
use thiserror::Error;

use crate::retention::PurgeReport;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid submission: {0}")]
  Validation(#[from] Violations),
  #[error("{0}")]
  File(#[from] FileRejection),
  #[error("{0}")]
  BadRequest(String),
  #[error("multipart error: {0}")]
  Multipart(#[from] MultipartError),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("blob store error: {0}")]
  Blob(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("retention purge left {} blob(s) undeleted", .0.blobs_failed)]
  PurgeIncomplete(PurgeReport),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      // Body-limit overruns keep their 413.
      Error::Multipart(e) => (e.status(), e.body_text()).into_response(),
      other => (StatusCode::BAD_REQUEST, other.to_string()).into_response(),
    }
  }
}
