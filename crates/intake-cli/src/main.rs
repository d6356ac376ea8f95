//! `intake`: fill in, check and submit a client intake from the terminal.
//!
//! # Usage
//!
//! ```
//! intake draft --out ana.json
//! intake check ana.json --step personal
//! intake submit ana.json --file passport.pdf --file i-94.jpg
//! ```

mod client;
mod draft;
mod upload;

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use intake_core::{files::FilePolicy, validate::Step};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "intake", about = "Client intake drafts and submissions")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the intake server (default: http://localhost:8080).
  #[arg(long, env = "INTAKE_URL", global = true)]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Write an empty draft.
  Draft {
    /// Output path; stdout when omitted.
    #[arg(short, long)]
    out: Option<PathBuf>,
  },
  /// Check a draft, one step or all of them.
  Check {
    draft: PathBuf,
    #[arg(long)]
    step:  Option<Step>,
  },
  /// Validate a draft and submit it with its documents.
  Submit {
    draft: PathBuf,
    #[arg(short, long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  match args.command {
    Command::Draft { out } => {
      let text = serde_json::to_string_pretty(&draft::template(Local::now().date_naive()))?;
      match out {
        Some(path) => std::fs::write(&path, text + "\n")
          .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{text}"),
      }
      Ok(ExitCode::SUCCESS)
    }

    Command::Check { draft: path, step } => {
      let value = draft::load(&path)?;
      let violations = draft::check(&value, step);
      for v in &violations {
        println!("{v}");
      }
      Ok(if violations.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }

    Command::Submit { draft: path, files } => {
      let value = draft::load(&path)?;
      if let Err(violations) = intake_core::validate::validate(&value) {
        for v in violations.as_slice() {
          println!("{v}");
        }
        return Ok(ExitCode::FAILURE);
      }

      let candidates = files
        .iter()
        .map(|p| upload::inspect(p))
        .collect::<Result<Vec<_>>>()?;
      let (attachments, skipped) = upload::select(candidates, &FilePolicy::default());
      for s in &skipped {
        tracing::warn!(path = %s.path.display(), "skipping file: {}", s.reason);
      }

      let client = ApiClient::new(api_config(args.config, args.url)?)?;
      let submission_id = client.submit(&value, &attachments).await?;
      println!("{submission_id}");
      Ok(ExitCode::SUCCESS)
    }
  }
}

/// CLI flags override the config file, which overrides defaults.
fn api_config(config: Option<PathBuf>, url: Option<String>) -> Result<ApiConfig> {
  let file_cfg: ConfigFile = if let Some(path) = &config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  Ok(ApiConfig {
    base_url: url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
  })
}
