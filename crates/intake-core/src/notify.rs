//! The outbound notification sent once a submission is fully stored.

use std::{convert::Infallible, future::Future};

use serde::{Deserialize, Serialize};

use crate::{
  payload::IntakePayload,
  submission::{SubmissionId, UploadedFile},
};

/// Body of the CRM notification: `{ submissionId, payload, files }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub submission_id: SubmissionId,
  pub payload:       IntakePayload,
  pub files:         Vec<UploadedFile>,
}

/// A downstream system told about new submissions.
///
/// Callers treat every outcome as success; the error type exists only so
/// failures can be logged.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn notify(
    &self,
    notification: Notification,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// An unconfigured notifier: does nothing.
impl<N: Notifier> Notifier for Option<N> {
  type Error = N::Error;

  async fn notify(&self, notification: Notification) -> Result<(), N::Error> {
    match self {
      Some(inner) => inner.notify(notification).await,
      None => Ok(()),
    }
  }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
  type Error = Infallible;

  async fn notify(&self, _notification: Notification) -> Result<(), Infallible> { Ok(()) }
}
