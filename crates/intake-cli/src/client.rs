//! Async HTTP client for the intake submission endpoint.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{
  Client,
  multipart::{Form, Part},
};
use serde::Deserialize;
use serde_json::Value;

use crate::upload::Attachment;

/// Connection settings for the intake server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
  submission_id: String,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(300))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `POST /api/submit`, returning the issued submission id.
  pub async fn submit(&self, payload: &Value, files: &[Attachment]) -> Result<String> {
    let mut form = Form::new().text("payload", payload.to_string());
    for file in files {
      let data = tokio::fs::read(&file.path)
        .await
        .with_context(|| format!("reading {}", file.path.display()))?;
      let part = Part::bytes(data)
        .file_name(file.filename.clone())
        .mime_str(&file.mime_type)
        .with_context(|| format!("invalid MIME type {}", file.mime_type))?;
      form = form.part("files", part);
    }

    let resp = self
      .client
      .post(self.url("/submit"))
      .multipart(form)
      .send()
      .await
      .context("POST /submit failed")?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(anyhow!("POST /submit → {status}: {body}"));
    }
    let body: SubmitResponse = resp.json().await.context("deserialising submit response")?;
    Ok(body.submission_id)
  }
}
