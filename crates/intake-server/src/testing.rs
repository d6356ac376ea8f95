//! Fixtures and in-memory collaborators shared by the server tests.

use std::{
  collections::BTreeMap,
  convert::Infallible,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use bytes::Bytes;
use chrono::{DateTime, TimeZone as _, Utc};
use intake_core::{
  notify::{Notification, Notifier},
  payload::IntakePayload,
  store::{BlobStore, IntakeStore},
  submission::{IntakeSubmission, NewSubmission, NewUploadedFile, SubmissionId, UploadedFile},
  validate::validate,
};
use intake_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tokio::sync::mpsc;

pub fn valid_payload_json() -> Value {
  json!({
    "personal": {
      "firstName": "Ana",
      "lastName": "Ruiz",
      "email": "ana.ruiz@example.com",
      "phone": "610-555-0100",
      "preferredLanguage": "Spanish",
      "dob": "1990-04-12",
      "aNumber": "A123456789",
      "countryOfBirth": "Honduras",
      "addressLine1": "12 Hamilton St",
      "city": "Allentown",
      "state": "PA",
      "zip": "18101"
    },
    "immigration": {
      "caseType": "Family-Based",
      "mannerOfEntry": "K-1 visa"
    },
    "documents": { "notes": "marriage certificate attached" },
    "consent": {
      "consent": true,
      "signature": "Ana Ruiz",
      "dateSigned": "2026-10-01"
    }
  })
}

pub fn valid_payload() -> IntakePayload {
  validate(&valid_payload_json()).unwrap()
}

pub fn notification() -> Notification {
  let submission_id = SubmissionId::from_stored("LVIL-1760745600000-0badcafe".into());
  Notification {
    submission_id: submission_id.clone(),
    payload:       valid_payload(),
    files:         vec![UploadedFile {
      file_id: uuid::Uuid::nil(),
      submission_id,
      path: "LVIL-1760745600000-0badcafe/1760745600000-00-passport.pdf".into(),
      filename: "passport.pdf".into(),
      mime_type: "application/pdf".into(),
      size: 4,
      uploaded_at: Utc.timestamp_millis_opt(1_760_745_600_000).unwrap(),
    }],
  }
}

// ─── Blob store ──────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FakeError(pub &'static str);

/// An in-memory [`BlobStore`] that can be told to fail on the n-th write or
/// the n-th delete.
#[derive(Clone, Default)]
pub struct MemoryBlobs {
  blobs:          Arc<Mutex<BTreeMap<String, Bytes>>>,
  writes:         Arc<AtomicUsize>,
  deletes:        Arc<AtomicUsize>,
  fail_on:        Option<usize>,
  fail_delete_on: Option<usize>,
}

impl MemoryBlobs {
  /// Fail the `n`-th call to `put_blob` (1-based).
  pub fn failing_on(n: usize) -> Self {
    Self { fail_on: Some(n), ..Self::default() }
  }

  /// Fail the `n`-th call to `delete_blob` (1-based).
  pub fn failing_delete_on(n: usize) -> Self {
    Self { fail_delete_on: Some(n), ..Self::default() }
  }

  pub fn paths(&self) -> Vec<String> {
    self.blobs.lock().unwrap().keys().cloned().collect()
  }

  pub fn get(&self, path: &str) -> Option<Bytes> {
    self.blobs.lock().unwrap().get(path).cloned()
  }
}

impl BlobStore for MemoryBlobs {
  type Error = FakeError;

  async fn put_blob(&self, path: &str, data: Bytes, _content_type: &str) -> Result<String, FakeError> {
    let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
    if self.fail_on == Some(n) {
      return Err(FakeError("content store unavailable"));
    }
    let mut blobs = self.blobs.lock().unwrap();
    if blobs.contains_key(path) {
      return Err(FakeError("blob already exists"));
    }
    blobs.insert(path.to_string(), data);
    Ok(path.to_string())
  }

  async fn delete_blob(&self, path: &str) -> Result<bool, FakeError> {
    let n = self.deletes.fetch_add(1, Ordering::SeqCst) + 1;
    if self.fail_delete_on == Some(n) {
      return Err(FakeError("content store unavailable"));
    }
    Ok(self.blobs.lock().unwrap().remove(path).is_some())
  }
}

// ─── Intake store ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FlakyError {
  #[error(transparent)]
  Store(#[from] intake_store_sqlite::Error),
  #[error("{0}")]
  Injected(&'static str),
}

/// An in-memory [`SqliteStore`] that can refuse every parent insert or the
/// n-th file insert.
pub struct FlakyStore {
  inner:            SqliteStore,
  fail_submissions: bool,
  fail_file_on:     Option<usize>,
  file_inserts:     AtomicUsize,
}

impl FlakyStore {
  async fn new(fail_submissions: bool, fail_file_on: Option<usize>) -> Self {
    Self {
      inner: SqliteStore::open_in_memory().await.unwrap(),
      fail_submissions,
      fail_file_on,
      file_inserts: AtomicUsize::new(0),
    }
  }

  pub async fn failing_submissions() -> Self { Self::new(true, None).await }

  /// Fail the `n`-th call to `insert_file` (1-based).
  pub async fn failing_file_on(n: usize) -> Self { Self::new(false, Some(n)).await }
}

impl IntakeStore for FlakyStore {
  type Error = FlakyError;

  async fn insert_submission(&self, input: NewSubmission) -> Result<IntakeSubmission, FlakyError> {
    if self.fail_submissions {
      return Err(FlakyError::Injected("intake table unavailable"));
    }
    Ok(self.inner.insert_submission(input).await?)
  }

  async fn insert_file(&self, input: NewUploadedFile) -> Result<UploadedFile, FlakyError> {
    let n = self.file_inserts.fetch_add(1, Ordering::SeqCst) + 1;
    if self.fail_file_on == Some(n) {
      return Err(FlakyError::Injected("file table unavailable"));
    }
    Ok(self.inner.insert_file(input).await?)
  }

  async fn get_submission(
    &self,
    id: &SubmissionId,
  ) -> Result<Option<IntakeSubmission>, FlakyError> {
    Ok(self.inner.get_submission(id).await?)
  }

  async fn list_submissions(&self) -> Result<Vec<IntakeSubmission>, FlakyError> {
    Ok(self.inner.list_submissions().await?)
  }

  async fn list_files(&self, id: &SubmissionId) -> Result<Vec<UploadedFile>, FlakyError> {
    Ok(self.inner.list_files(id).await?)
  }

  async fn purge_received_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> Result<Vec<UploadedFile>, FlakyError> {
    Ok(self.inner.purge_received_before(cutoff).await?)
  }
}

// ─── Notifiers ───────────────────────────────────────────────────────────────

/// Forwards every notification to a channel the test can await.
#[derive(Clone)]
pub struct RecordingNotifier(mpsc::UnboundedSender<Notification>);

impl RecordingNotifier {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self(tx), rx)
  }
}

impl Notifier for RecordingNotifier {
  type Error = Infallible;

  async fn notify(&self, notification: Notification) -> Result<(), Infallible> {
    let _ = self.0.send(notification);
    Ok(())
  }
}

/// Always fails.
#[derive(Clone, Copy)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
  type Error = FakeError;

  async fn notify(&self, _notification: Notification) -> Result<(), FakeError> {
    Err(FakeError("crm webhook down"))
  }
}
