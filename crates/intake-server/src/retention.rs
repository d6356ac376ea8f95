//! Out-of-band deletion of intakes that never converted to an engagement.

use chrono::{DateTime, Duration, Utc};
use intake_core::store::{BlobStore, IntakeStore};

use crate::error::Error;

/// Default retention window for unconverted intakes.
pub const DEFAULT_RETENTION_DAYS: u32 = 60;

/// What a purge run removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
  /// File rows deleted along with their submissions.
  pub files:         usize,
  pub blobs_removed: usize,
  /// Rows whose blob was already gone.
  pub blobs_missing: usize,
  /// Blobs whose delete failed; their rows are gone, so only the log names
  /// them.
  pub blobs_failed:  usize,
}

/// The cutoff for a retention window ending at `now`.
pub fn cutoff(now: DateTime<Utc>, retention_days: u32) -> DateTime<Utc> {
  now - Duration::days(i64::from(retention_days))
}

/// Delete `received` intakes created before `cutoff`, then their blobs.
///
/// Rows go first, so a row never points at a missing blob. Every blob is
/// attempted even after a failed delete; if any failed the run ends in
/// [`Error::PurgeIncomplete`] and the failed paths are logged at `warn`.
pub async fn purge<S, B>(store: &S, blobs: &B, cutoff: DateTime<Utc>) -> Result<PurgeReport, Error>
where
  S: IntakeStore,
  B: BlobStore,
{
  let files = store
    .purge_received_before(cutoff)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let mut report = PurgeReport { files: files.len(), ..PurgeReport::default() };
  for file in &files {
    match blobs.delete_blob(&file.path).await {
      Ok(true) => report.blobs_removed += 1,
      Ok(false) => {
        tracing::warn!(path = %file.path, "blob already missing");
        report.blobs_missing += 1;
      }
      Err(e) => {
        tracing::warn!(path = %file.path, error = %e, "blob delete failed; remove it by hand");
        report.blobs_failed += 1;
      }
    }
  }

  tracing::info!(
    %cutoff, files = report.files, removed = report.blobs_removed,
    missing = report.blobs_missing, failed = report.blobs_failed, "retention purge finished"
  );
  if report.blobs_failed > 0 {
    return Err(Error::PurgeIncomplete(report));
  }
  Ok(report)
}
