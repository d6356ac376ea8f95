//! intake-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite intake store and the filesystem content store, and serves the
//! submission endpoint over HTTP.
//!
//! # Retention
//!
//! Unconverted intakes older than `retention_days` are removed with:
//!
//! ```
//! cargo run -p intake-server --bin server -- --purge
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use chrono::Utc;
use clap::Parser;
use intake_server::{AppState, ServerConfig, retention, webhook::WebhookNotifier};
use intake_store_fs::FsBlobStore;
use intake_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Client intake submission server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Delete intakes past the retention window and exit.
  #[arg(long)]
  purge: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("INTAKE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let blob_root = expand_tilde(&server_cfg.blob_root);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let blobs = FsBlobStore::open(&blob_root)
    .await
    .with_context(|| format!("failed to open blob root at {blob_root:?}"))?;

  // Maintenance mode: purge expired intakes and exit.
  if cli.purge {
    let cutoff = retention::cutoff(Utc::now(), server_cfg.retention_days);
    let report = retention::purge(&store, &blobs, cutoff)
      .await
      .context("retention purge failed")?;
    println!(
      "purged {} file(s); {} blob(s) removed, {} already missing",
      report.files, report.blobs_removed, report.blobs_missing
    );
    return Ok(());
  }

  let notifier = match &server_cfg.webhook_url {
    Some(url) => Some(
      WebhookNotifier::new(url, Duration::from_secs(server_cfg.webhook_timeout_secs))
        .context("failed to build webhook client")?,
    ),
    None => {
      tracing::warn!("no webhook_url configured; submissions will not be forwarded");
      None
    }
  };

  // Build application state.
  let state = AppState {
    store:    Arc::new(store),
    blobs:    Arc::new(blobs),
    notifier: Arc::new(notifier),
    config:   Arc::new(server_cfg.clone()),
  };

  let app = intake_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
