//! Submission records: the parent intake row and its uploaded-file children.
//!
//! A submission is immutable once created. Files are attached after the
//! parent row exists; each file row pairs with exactly one blob in the
//! content store.

use std::fmt;

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payload::{Consent, DocumentNotes, ImmigrationInfo, IntakePayload, PersonalInfo};

/// Prefix used when no other is configured.
pub const DEFAULT_ID_PREFIX: &str = "LVIL";

// ─── Identifier ──────────────────────────────────────────────────────────────

/// The receipt token handed back to the client,
/// e.g. `LVIL-1760745600000-9f3a0c12`.
///
/// Millisecond timestamp for human scanning, plus 32 random bits so two
/// submissions in the same millisecond do not collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
  pub fn generate(prefix: &str, at: DateTime<Utc>) -> Self {
    let millis = at.timestamp_millis();
    let suffix = OsRng.next_u32();
    Self(format!("{prefix}-{millis:013}-{suffix:08x}"))
  }

  /// Wrap an identifier read back from storage.
  pub fn from_stored(raw: String) -> Self { Self(raw) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SubmissionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for SubmissionId {
  fn as_ref(&self) -> &str { &self.0 }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status of an intake. Every submission starts as `Received`;
/// nothing in this service moves it further.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
  #[default]
  Received,
}

impl SubmissionStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      SubmissionStatus::Received => "received",
    }
  }

  pub fn parse(s: &str) -> crate::Result<Self> {
    match s {
      "received" => Ok(SubmissionStatus::Received),
      other => Err(crate::Error::UnknownStatus(other.to_string())),
    }
  }
}

// ─── Parent ──────────────────────────────────────────────────────────────────

/// Input to [`IntakeStore::insert_submission`](crate::store::IntakeStore::insert_submission).
#[derive(Debug, Clone)]
pub struct NewSubmission {
  pub submission_id: SubmissionId,
  pub payload:       IntakePayload,
  pub created_at:    DateTime<Utc>,
}

/// A persisted intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeSubmission {
  pub submission_id: SubmissionId,
  pub personal:      PersonalInfo,
  pub immigration:   ImmigrationInfo,
  pub documents:     DocumentNotes,
  pub consent:       Consent,
  pub created_at:    DateTime<Utc>,
  pub status:        SubmissionStatus,
}

impl IntakeSubmission {
  pub fn payload(&self) -> IntakePayload {
    IntakePayload {
      personal:    self.personal.clone(),
      immigration: self.immigration.clone(),
      documents:   self.documents.clone(),
      consent:     self.consent.clone(),
    }
  }
}

// ─── Children ────────────────────────────────────────────────────────────────

/// Build the content-store path for a file: scoped under the submission id,
/// prefixed with the upload time and the file's position in the request.
pub fn blob_path(
  submission_id: &SubmissionId,
  uploaded_at: DateTime<Utc>,
  ordinal: usize,
  filename: &str,
) -> String {
  format!(
    "{submission_id}/{}-{ordinal:02}-{}",
    uploaded_at.timestamp_millis(),
    crate::files::sanitize_filename(filename)
  )
}

/// Input to [`IntakeStore::insert_file`](crate::store::IntakeStore::insert_file).
#[derive(Debug, Clone)]
pub struct NewUploadedFile {
  pub submission_id: SubmissionId,
  pub path:          String,
  pub filename:      String,
  pub mime_type:     String,
  pub size:          u64,
  pub uploaded_at:   DateTime<Utc>,
}

/// Metadata for one stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
  pub file_id:       Uuid,
  pub submission_id: SubmissionId,
  pub path:          String,
  pub filename:      String,
  /// Named `mimetype` on the wire, as the CRM mapping expects.
  #[serde(rename = "mimetype")]
  pub mime_type:     String,
  pub size:          u64,
  pub uploaded_at:   DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn generated_ids_are_prefixed_and_distinct() {
    let at = Utc.timestamp_millis_opt(1_760_745_600_123).unwrap();
    let a = SubmissionId::generate("LVIL", at);
    let b = SubmissionId::generate("LVIL", at);

    assert!(a.as_str().starts_with("LVIL-1760745600123-"), "{a}");
    assert_eq!(a.as_str().len(), "LVIL-1760745600123-".len() + 8);
    assert_ne!(a, b);
  }

  #[test]
  fn blob_paths_are_scoped_and_ordered() {
    let id = SubmissionId::from_stored("LVIL-1-00000000".into());
    let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    assert_eq!(
      blob_path(&id, at, 3, "my passport.pdf"),
      "LVIL-1-00000000/1700000000000-03-my_passport.pdf"
    );
  }

  #[test]
  fn file_rows_serialize_mime_type_as_mimetype() {
    let file = UploadedFile {
      file_id:       Uuid::nil(),
      submission_id: SubmissionId::from_stored("LVIL-1-00000000".into()),
      path:          "LVIL-1-00000000/1-00-a.pdf".into(),
      filename:      "a.pdf".into(),
      mime_type:     "application/pdf".into(),
      size:          4,
      uploaded_at:   Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
    };
    let json = serde_json::to_value(&file).unwrap();
    assert_eq!(json["mimetype"], "application/pdf");
    assert!(json.get("mime_type").is_none());
    assert_eq!(json["submission_id"], "LVIL-1-00000000");
  }

  #[test]
  fn status_round_trips_through_text() {
    let s = SubmissionStatus::default();
    assert_eq!(SubmissionStatus::parse(s.as_str()).unwrap(), s);
    assert!(SubmissionStatus::parse("converted").is_err());
  }
}
