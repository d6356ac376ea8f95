//! [`SqliteStore`], the SQLite implementation of [`IntakeStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use intake_core::{
  store::IntakeStore,
  submission::{
    IntakeSubmission, NewSubmission, NewUploadedFile, SubmissionId, SubmissionStatus,
    UploadedFile,
  },
};

use crate::{
  Result,
  encode::{
    FILE_COLUMNS, RawFile, RawSubmission, SUBMISSION_COLUMNS, encode_dt, encode_uuid,
    storable_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An intake store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── IntakeStore impl ────────────────────────────────────────────────────────

impl IntakeStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_submission(&self, input: NewSubmission) -> Result<IntakeSubmission> {
    let payload = input.payload;
    let submission = IntakeSubmission {
      submission_id: input.submission_id,
      personal:      payload.personal,
      immigration:   payload.immigration,
      documents:     payload.documents,
      consent:       payload.consent,
      created_at:    storable_dt(input.created_at),
      status:        SubmissionStatus::Received,
    };

    let id_str          = submission.submission_id.as_str().to_owned();
    let personal_str    = serde_json::to_string(&submission.personal)?;
    let immigration_str = serde_json::to_string(&submission.immigration)?;
    let documents_str   = serde_json::to_string(&submission.documents)?;
    let consent_str     = serde_json::to_string(&submission.consent)?;
    let created_str     = encode_dt(submission.created_at);
    let status_str      = submission.status.as_str();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO intakes (
             submission_id, personal, immigration, documents, consent,
             created_at, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            personal_str,
            immigration_str,
            documents_str,
            consent_str,
            created_str,
            status_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(submission)
  }

  async fn insert_file(&self, input: NewUploadedFile) -> Result<UploadedFile> {
    let file = UploadedFile {
      file_id:       Uuid::new_v4(),
      submission_id: input.submission_id,
      path:          input.path,
      filename:      input.filename,
      mime_type:     input.mime_type,
      size:          input.size,
      uploaded_at:   storable_dt(input.uploaded_at),
    };

    let file_id_str     = encode_uuid(file.file_id);
    let submission_str  = file.submission_id.as_str().to_owned();
    let path            = file.path.clone();
    let filename        = file.filename.clone();
    let mime_type       = file.mime_type.clone();
    let size            = i64::try_from(file.size).unwrap_or(i64::MAX);
    let uploaded_str    = encode_dt(file.uploaded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO intake_files (
             file_id, submission_id, path, filename, mime_type, size, uploaded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            file_id_str,
            submission_str,
            path,
            filename,
            mime_type,
            size,
            uploaded_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(file)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_submission(&self, id: &SubmissionId) -> Result<Option<IntakeSubmission>> {
    let id_str = id.as_str().to_owned();

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SUBMISSION_COLUMNS} FROM intakes WHERE submission_id = ?1"),
            rusqlite::params![id_str],
            RawSubmission::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn list_submissions(&self) -> Result<Vec<IntakeSubmission>> {
    let raws: Vec<RawSubmission> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBMISSION_COLUMNS} FROM intakes ORDER BY created_at, submission_id"
        ))?;
        let rows = stmt
          .query_map([], RawSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  async fn list_files(&self, id: &SubmissionId) -> Result<Vec<UploadedFile>> {
    let id_str = id.as_str().to_owned();

    let raws: Vec<RawFile> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FILE_COLUMNS} FROM intake_files
           WHERE submission_id = ?1
           ORDER BY uploaded_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawFile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFile::into_file).collect()
  }

  // ── Retention ─────────────────────────────────────────────────────────────

  async fn purge_received_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<UploadedFile>> {
    let cutoff_str = encode_dt(cutoff);
    let status_str = SubmissionStatus::Received.as_str();

    let raws: Vec<RawFile> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let files = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM intake_files
             WHERE submission_id IN (
               SELECT submission_id FROM intakes
               WHERE status = ?1 AND created_at < ?2
             )
             ORDER BY submission_id, uploaded_at, rowid"
          ))?;
          stmt
            .query_map(rusqlite::params![status_str, cutoff_str], RawFile::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        // File rows go with their parent via ON DELETE CASCADE.
        tx.execute(
          "DELETE FROM intakes WHERE status = ?1 AND created_at < ?2",
          rusqlite::params![status_str, cutoff_str],
        )?;

        tx.commit()?;
        Ok(files)
      })
      .await?;

    raws.into_iter().map(RawFile::into_file).collect()
  }
}
