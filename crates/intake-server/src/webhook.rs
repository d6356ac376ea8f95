//! CRM webhook notifier.

use std::time::Duration;

use intake_core::notify::{Notification, Notifier};
use reqwest::Client;

/// POSTs each [`Notification`] as JSON to a fixed URL.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
  client: Client,
  url:    String,
}

impl WebhookNotifier {
  pub fn new(url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, url: url.into() })
  }
}

impl Notifier for WebhookNotifier {
  type Error = reqwest::Error;

  async fn notify(&self, notification: Notification) -> Result<(), reqwest::Error> {
    self
      .client
      .post(&self.url)
      .json(&notification)
      .send()
      .await?
      .error_for_status()?;
    Ok(())
  }
}
