//! Multipart request parsing for `POST /api/submit`.
//!
//! The body carries one `payload` field (a JSON string) and up to
//! [`FilePolicy::max_files`] `files` parts. File limits are enforced while
//! reading, so an oversize or surplus file is refused before anything is
//! persisted.

use axum::extract::Multipart;
use bytes::{Bytes, BytesMut};
use intake_core::files::{FilePolicy, FileRejection};
use serde_json::Value;

use crate::error::Error;

const PAYLOAD_FIELD: &str = "payload";
const FILES_FIELD: &str = "files";
const DEFAULT_FILENAME: &str = "file";
const DEFAULT_MIME: &str = "application/octet-stream";

/// One uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct IncomingFile {
  pub filename:  String,
  pub mime_type: String,
  pub data:      Bytes,
}

/// The raw (not yet validated) contents of a submission request.
#[derive(Debug)]
pub struct SubmitRequest {
  pub payload: Value,
  pub files:   Vec<IncomingFile>,
}

/// Read every field of the request. Unknown fields are skipped.
pub async fn parse(mut multipart: Multipart, policy: &FilePolicy) -> Result<SubmitRequest, Error> {
  let mut payload: Option<Value> = None;
  let mut files = Vec::new();

  while let Some(mut field) = multipart.next_field().await? {
    let name = field.name().map(str::to_owned);
    match name.as_deref() {
      Some(PAYLOAD_FIELD) => {
        if payload.is_some() {
          return Err(Error::BadRequest("duplicate payload field".to_string()));
        }
        let text = field.text().await?;
        let value = serde_json::from_str(&text)
          .map_err(|e| Error::BadRequest(format!("payload is not valid JSON: {e}")))?;
        payload = Some(value);
      }
      Some(FILES_FIELD) => {
        // A part without a filename is a plain form value, not an upload.
        let Some(declared) = field.file_name() else {
          tracing::debug!("ignoring files part without a filename");
          continue;
        };
        let filename =
          if declared.is_empty() { DEFAULT_FILENAME } else { declared }.to_string();

        policy.check_count(files.len() + 1)?;

        let mime_type = field.content_type().unwrap_or(DEFAULT_MIME).to_string();

        let mut buf = BytesMut::new();
        while let Some(chunk) = field.chunk().await? {
          if buf.len() + chunk.len() > policy.max_file_bytes {
            return Err(
              FileRejection::TooLarge {
                filename,
                max_mib: policy.max_file_bytes / 1024 / 1024,
              }
              .into(),
            );
          }
          buf.extend_from_slice(&chunk);
        }

        policy.check(&filename, &mime_type, buf.len())?;
        files.push(IncomingFile { filename, mime_type, data: buf.freeze() });
      }
      _ => {
        tracing::debug!(field = ?name, "ignoring unknown multipart field");
      }
    }
  }

  let payload =
    payload.ok_or_else(|| Error::BadRequest("missing payload field".to_string()))?;
  Ok(SubmitRequest { payload, files })
}
