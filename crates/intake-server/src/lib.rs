//! HTTP surface for client intake submissions.
//!
//! Exposes an axum [`Router`] whose single business endpoint,
//! `POST /api/submit`, validates a multipart submission and hands it to the
//! [submission writer](writer). Storage and notification are reached only
//! through the `intake-core` collaborator traits.

pub mod error;
pub mod multipart;
pub mod retention;
pub mod webhook;
pub mod writer;

#[cfg(test)]
mod testing;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::{DefaultBodyLimit, Multipart, State},
  routing::{get, post},
};
use intake_core::{
  files::{FilePolicy, MAX_FILE_BYTES, MAX_FILES},
  notify::Notifier,
  store::{BlobStore, IntakeStore},
  submission::{DEFAULT_ID_PREFIX, SubmissionId},
  validate::validate,
};
use serde::{Deserialize, Serialize};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `INTAKE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub blob_root:            PathBuf,
  #[serde(default = "default_prefix")]
  pub submission_prefix:    String,
  /// CRM webhook; notifications are skipped when unset.
  #[serde(default)]
  pub webhook_url:          Option<String>,
  #[serde(default = "default_webhook_timeout_secs")]
  pub webhook_timeout_secs: u64,
  #[serde(default = "default_retention_days")]
  pub retention_days:       u32,
  #[serde(default = "default_max_files")]
  pub max_files:            usize,
  #[serde(default = "default_max_file_bytes")]
  pub max_file_bytes:       usize,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_prefix() -> String { DEFAULT_ID_PREFIX.to_string() }
fn default_webhook_timeout_secs() -> u64 { 10 }
fn default_retention_days() -> u32 { retention::DEFAULT_RETENTION_DAYS }
fn default_max_files() -> usize { MAX_FILES }
fn default_max_file_bytes() -> usize { MAX_FILE_BYTES }

impl ServerConfig {
  pub fn file_policy(&self) -> FilePolicy {
    FilePolicy { max_files: self.max_files, max_file_bytes: self.max_file_bytes }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, B, N> {
  pub store:    Arc<S>,
  pub blobs:    Arc<B>,
  pub notifier: Arc<N>,
  pub config:   Arc<ServerConfig>,
}

// Manual impl: the collaborators sit behind `Arc`, so they need not be `Clone`.
impl<S, B, N> Clone for AppState<S, B, N> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      blobs:    Arc::clone(&self.blobs),
      notifier: Arc::clone(&self.notifier),
      config:   Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the intake server.
pub fn router<S, B, N>(state: AppState<S, B, N>) -> Router
where
  S: IntakeStore + 'static,
  B: BlobStore + 'static,
  N: Notifier + 'static,
{
  let limit = state.config.file_policy().max_request_bytes();

  Router::new()
    .route("/api/submit", post(submit::<S, B, N>))
    .route("/healthz", get(healthz))
    .layer(DefaultBodyLimit::max(limit))
    .layer(RequestBodyLimitLayer::new(limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
  pub submission_id: SubmissionId,
}

/// `POST /api/submit`: multipart `payload` + `files`.
async fn submit<S, B, N>(
  State(state): State<AppState<S, B, N>>,
  multipart: Multipart,
) -> Result<Json<SubmitResponse>, Error>
where
  S: IntakeStore + 'static,
  B: BlobStore + 'static,
  N: Notifier + 'static,
{
  let request = multipart::parse(multipart, &state.config.file_policy())
    .await
    .inspect_err(|e| tracing::debug!(error = %e, "submission request refused"))?;

  let payload = validate(&request.payload)
    .inspect_err(|v| tracing::debug!(violations = %v, "submission failed validation"))?;

  let submission_id = writer::write(&state, payload, request.files).await?;
  Ok(Json(SubmitResponse { submission_id }))
}

async fn healthz() -> &'static str { "ok" }

// ─── Integration tests ────────────────────────────────────────────────────────
