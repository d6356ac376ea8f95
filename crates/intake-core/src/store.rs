//! Storage collaborators: the intake record store and the content store.
//!
//! The traits are implemented by backends (`intake-store-sqlite`,
//! `intake-store-fs`). The server depends on these abstractions, not on any
//! concrete backend. The two stores are independent systems; nothing here
//! links their writes transactionally.

use std::future::Future;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::submission::{
  IntakeSubmission, NewSubmission, NewUploadedFile, SubmissionId, UploadedFile,
};

/// Persistence for intake records and their file metadata.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait IntakeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert a new intake with status `received` and return the stored row.
  ///
  /// Fails if the submission id is already taken.
  fn insert_submission(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<IntakeSubmission, Self::Error>> + Send + '_;

  /// Insert one file-metadata row. The referenced submission must exist.
  fn insert_file(
    &self,
    input: NewUploadedFile,
  ) -> impl Future<Output = Result<UploadedFile, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_submission<'a>(
    &'a self,
    id: &'a SubmissionId,
  ) -> impl Future<Output = Result<Option<IntakeSubmission>, Self::Error>> + Send + 'a;

  /// All submissions, oldest first.
  fn list_submissions(
    &self,
  ) -> impl Future<Output = Result<Vec<IntakeSubmission>, Self::Error>> + Send + '_;

  /// File rows for a submission in upload order.
  fn list_files<'a>(
    &'a self,
    id: &'a SubmissionId,
  ) -> impl Future<Output = Result<Vec<UploadedFile>, Self::Error>> + Send + 'a;

  // ── Retention ─────────────────────────────────────────────────────────

  /// Delete every `received` submission created before `cutoff`, along with
  /// its file rows. Returns the deleted file rows so their blobs can be
  /// removed.
  fn purge_received_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<UploadedFile>, Self::Error>> + Send + '_;
}

/// A content store addressed by path.
pub trait BlobStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Write `data` at `path` and return the stored path. Never overwrites an
  /// existing blob.
  fn put_blob<'a>(
    &'a self,
    path: &'a str,
    data: Bytes,
    content_type: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Remove the blob at `path`. Returns `false` if nothing was there.
  fn delete_blob<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
