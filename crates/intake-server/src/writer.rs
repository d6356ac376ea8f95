//! The submission writer: one parent row, then a blob and a metadata row per
//! file, then a detached notification.
//!
//! The sequence is forward-only. A failure stops it where it is; whatever was
//! already written stays written, and the caller resubmits under a new id.

use std::sync::Arc;

use chrono::Utc;
use intake_core::{
  notify::{Notification, Notifier},
  payload::IntakePayload,
  store::{BlobStore, IntakeStore},
  submission::{NewSubmission, NewUploadedFile, SubmissionId, blob_path},
};

use crate::{AppState, error::Error, multipart::IncomingFile};

/// Persist a validated submission and return its identifier.
pub async fn write<S, B, N>(
  state: &AppState<S, B, N>,
  payload: IntakePayload,
  files: Vec<IncomingFile>,
) -> Result<SubmissionId, Error>
where
  S: IntakeStore,
  B: BlobStore,
  N: Notifier + 'static,
{
  let created_at    = Utc::now();
  let submission_id = SubmissionId::generate(&state.config.submission_prefix, created_at);

  let submission = state
    .store
    .insert_submission(NewSubmission {
      submission_id: submission_id.clone(),
      payload,
      created_at,
    })
    .await
    .map_err(|e| {
      tracing::error!(%submission_id, error = %e, "failed to create intake record");
      Error::Store(Box::new(e))
    })?;

  let mut uploaded = Vec::with_capacity(files.len());
  for (ordinal, file) in files.into_iter().enumerate() {
    let uploaded_at = Utc::now();
    let path        = blob_path(&submission_id, uploaded_at, ordinal, &file.filename);
    let size        = file.data.len() as u64;

    let stored_path = state
      .blobs
      .put_blob(&path, file.data, &file.mime_type)
      .await
      .map_err(|e| {
        tracing::error!(
          %submission_id, path = %path, stored = uploaded.len(), error = %e,
          "blob write failed; earlier files are kept"
        );
        Error::Blob(Box::new(e))
      })?;

    let row = state
      .store
      .insert_file(NewUploadedFile {
        submission_id: submission_id.clone(),
        path:          stored_path,
        filename:      file.filename,
        mime_type:     file.mime_type,
        size,
        uploaded_at,
      })
      .await
      .map_err(|e| {
        tracing::error!(
          %submission_id, path = %path, stored = uploaded.len(), error = %e,
          "file metadata insert failed; blob is orphaned"
        );
        Error::Store(Box::new(e))
      })?;
    uploaded.push(row);
  }

  tracing::info!(%submission_id, files = uploaded.len(), "intake received");

  spawn_notification(
    Arc::clone(&state.notifier),
    Notification {
      submission_id: submission_id.clone(),
      payload:       submission.payload(),
      files:         uploaded,
    },
  );

  Ok(submission_id)
}

/// Fire the notification on a detached task. The handle is dropped: the
/// response never waits on it and its outcome is only logged.
fn spawn_notification<N>(notifier: Arc<N>, notification: Notification)
where
  N: Notifier + 'static,
{
  let submission_id = notification.submission_id.clone();
  tokio::spawn(async move {
    match notifier.notify(notification).await {
      Ok(()) => tracing::debug!(%submission_id, "notification delivered"),
      Err(e) => tracing::warn!(%submission_id, error = %e, "notification failed"),
    }
  });
}
