//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix, so lexical order matches chronological order. Payload
//! sections are stored as compact JSON. UUIDs are hyphenated lowercase.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use intake_core::submission::{
  IntakeSubmission, SubmissionId, SubmissionStatus, UploadedFile,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// Drop precision the column cannot hold, so in-memory records compare equal
/// to what is read back.
pub fn storable_dt(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw DB rows ──────────────────────────────────────────────────────────────

/// Column order for every `SELECT` that builds a [`RawSubmission`].
pub const SUBMISSION_COLUMNS: &str =
  "submission_id, personal, immigration, documents, consent, created_at, status";

/// Intermediate struct holding raw column strings from an `intakes` row.
pub struct RawSubmission {
  pub submission_id: String,
  pub personal:      String,
  pub immigration:   String,
  pub documents:     String,
  pub consent:       String,
  pub created_at:    String,
  pub status:        String,
}

impl RawSubmission {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      submission_id: row.get(0)?,
      personal:      row.get(1)?,
      immigration:   row.get(2)?,
      documents:     row.get(3)?,
      consent:       row.get(4)?,
      created_at:    row.get(5)?,
      status:        row.get(6)?,
    })
  }

  pub fn into_submission(self) -> Result<IntakeSubmission> {
    Ok(IntakeSubmission {
      submission_id: SubmissionId::from_stored(self.submission_id),
      personal:      serde_json::from_str(&self.personal)?,
      immigration:   serde_json::from_str(&self.immigration)?,
      documents:     serde_json::from_str(&self.documents)?,
      consent:       serde_json::from_str(&self.consent)?,
      created_at:    decode_dt(&self.created_at)?,
      status:        SubmissionStatus::parse(&self.status)?,
    })
  }
}

/// Column order for every `SELECT` that builds a [`RawFile`].
pub const FILE_COLUMNS: &str =
  "file_id, submission_id, path, filename, mime_type, size, uploaded_at";

/// Intermediate struct holding raw column values from an `intake_files` row.
pub struct RawFile {
  pub file_id:       String,
  pub submission_id: String,
  pub path:          String,
  pub filename:      String,
  pub mime_type:     String,
  pub size:          i64,
  pub uploaded_at:   String,
}

impl RawFile {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      file_id:       row.get(0)?,
      submission_id: row.get(1)?,
      path:          row.get(2)?,
      filename:      row.get(3)?,
      mime_type:     row.get(4)?,
      size:          row.get(5)?,
      uploaded_at:   row.get(6)?,
    })
  }

  pub fn into_file(self) -> Result<UploadedFile> {
    Ok(UploadedFile {
      file_id:       decode_uuid(&self.file_id)?,
      submission_id: SubmissionId::from_stored(self.submission_id),
      path:          self.path,
      filename:      self.filename,
      mime_type:     self.mime_type,
      // The column carries a CHECK (size >= 0).
      size:          self.size.unsigned_abs(),
      uploaded_at:   decode_dt(&self.uploaded_at)?,
    })
  }
}
