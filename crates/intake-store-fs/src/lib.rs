//! Local-filesystem content store for uploaded intake files.
//!
//! Blobs live under a single root directory, addressed by relative paths of
//! the form `{submission_id}/{file}`. Writes never overwrite.

pub mod error;

pub use error::{Error, Result};

use std::{
  io::ErrorKind,
  path::{Component, Path, PathBuf},
};

use bytes::Bytes;
use intake_core::store::BlobStore;
use tokio::{fs, io::AsyncWriteExt as _};

/// A [`BlobStore`] rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
  root: PathBuf,
}

impl FsBlobStore {
  /// Open (and create if needed) a blob store rooted at `root`.
  pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
    let root = root.into();
    fs::create_dir_all(&root).await?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path { &self.root }

  /// Resolve a blob path under the root. Only plain relative components are
  /// allowed, so a path can never escape the root directory.
  fn resolve(&self, path: &str) -> Result<PathBuf> {
    let rel = Path::new(path);
    let plain = !path.is_empty()
      && rel
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !plain {
      return Err(Error::InvalidPath(path.to_string()));
    }
    Ok(self.root.join(rel))
  }
}

impl BlobStore for FsBlobStore {
  type Error = Error;

  async fn put_blob(&self, path: &str, data: Bytes, content_type: &str) -> Result<String> {
    let target = self.resolve(path)?;
    if let Some(parent) = target.parent() {
      fs::create_dir_all(parent).await?;
    }

    let mut file = match fs::OpenOptions::new()
      .write(true)
      .create_new(true)
      .open(&target)
      .await
    {
      Ok(f) => f,
      Err(e) if e.kind() == ErrorKind::AlreadyExists => {
        return Err(Error::AlreadyExists(path.to_string()));
      }
      Err(e) => return Err(e.into()),
    };

    file.write_all(&data).await?;
    file.sync_all().await?;

    tracing::debug!(path, content_type, bytes = data.len(), "blob written");
    Ok(path.to_string())
  }

  async fn delete_blob(&self, path: &str) -> Result<bool> {
    let target = self.resolve(path)?;
    match fs::remove_file(&target).await {
      Ok(()) => {}
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
      Err(e) => return Err(e.into()),
    }

    // Drop the submission directory once its last blob is gone.
    if let Some(parent) = target.parent()
      && parent != self.root
    {
      let _ = fs::remove_dir(parent).await;
    }
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn store() -> (tempfile::TempDir, FsBlobStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FsBlobStore::open(dir.path().join("blobs")).await.unwrap();
    (dir, store)
  }

  #[tokio::test]
  async fn put_writes_bytes_under_root() {
    let (_dir, s) = store().await;
    let path = s
      .put_blob("LVIL-1-aaaaaaaa/1-00-a.pdf", Bytes::from_static(b"%PDF-1.7"), "application/pdf")
      .await
      .unwrap();
    assert_eq!(path, "LVIL-1-aaaaaaaa/1-00-a.pdf");

    let on_disk = std::fs::read(s.root().join(&path)).unwrap();
    assert_eq!(on_disk, b"%PDF-1.7");
  }

  #[tokio::test]
  async fn put_never_overwrites() {
    let (_dir, s) = store().await;
    s.put_blob("x/a.png", Bytes::from_static(b"one"), "image/png").await.unwrap();

    let err = s
      .put_blob("x/a.png", Bytes::from_static(b"two"), "image/png")
      .await
      .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
    assert_eq!(std::fs::read(s.root().join("x/a.png")).unwrap(), b"one");
  }

  #[tokio::test]
  async fn escaping_paths_are_rejected() {
    let (_dir, s) = store().await;
    for bad in ["", "../a.pdf", "/etc/passwd", "x/../../a.pdf", "./a.pdf"] {
      let err = s
        .put_blob(bad, Bytes::from_static(b"x"), "application/pdf")
        .await
        .unwrap_err();
      assert!(matches!(err, Error::InvalidPath(_)), "{bad:?} accepted");
    }
  }

  #[tokio::test]
  async fn delete_removes_blob_and_reports_missing() {
    let (_dir, s) = store().await;
    s.put_blob("x/a.pdf", Bytes::from_static(b"x"), "application/pdf").await.unwrap();

    assert!(s.delete_blob("x/a.pdf").await.unwrap());
    assert!(!s.root().join("x").exists());
    assert!(!s.delete_blob("x/a.pdf").await.unwrap());
  }
}
