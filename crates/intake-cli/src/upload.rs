//! Picking which local files go into a submission.
//!
//! The server rejects a whole request over one bad file, so the client drops
//! unacceptable files up front and says so.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use intake_core::files::FilePolicy;

/// A local file that passed the policy checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
  pub path:      PathBuf,
  pub filename:  String,
  pub mime_type: String,
  pub size:      usize,
}

/// A file left out of the submission and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
  pub path:   PathBuf,
  pub reason: String,
}

/// Guess a MIME type from the file extension.
pub fn guess_mime(path: &Path) -> &'static str {
  let ext = path
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase)
    .unwrap_or_default();
  match ext.as_str() {
    "pdf" => "application/pdf",
    "png" => "image/png",
    "jpg" | "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "heic" => "image/heic",
    "heif" => "image/heif",
    "tif" | "tiff" => "image/tiff",
    "bmp" => "image/bmp",
    _ => "application/octet-stream",
  }
}

/// Build an [`Attachment`] candidate from file metadata on disk.
pub fn inspect(path: &Path) -> Result<Attachment> {
  let meta = std::fs::metadata(path).with_context(|| format!("reading {}", path.display()))?;
  let filename = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "file".to_string());
  Ok(Attachment {
    path: path.to_path_buf(),
    filename,
    mime_type: guess_mime(path).to_string(),
    size: usize::try_from(meta.len()).unwrap_or(usize::MAX),
  })
}

/// Keep acceptable candidates in order, up to the policy's file count.
pub fn select(candidates: Vec<Attachment>, policy: &FilePolicy) -> (Vec<Attachment>, Vec<Skipped>) {
  let mut kept = Vec::new();
  let mut skipped = Vec::new();

  for file in candidates {
    if let Err(e) = policy.check(&file.filename, &file.mime_type, file.size) {
      skipped.push(Skipped { path: file.path, reason: e.to_string() });
    } else if kept.len() >= policy.max_files {
      skipped.push(Skipped {
        path:   file.path,
        reason: format!("only the first {} files are sent", policy.max_files),
      });
    } else {
      kept.push(file);
    }
  }

  (kept, skipped)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn candidate(name: &str, size: usize) -> Attachment {
    let path = PathBuf::from(name);
    Attachment {
      mime_type: guess_mime(&path).to_string(),
      filename: name.to_string(),
      path,
      size,
    }
  }

  #[test]
  fn guesses_common_types() {
    assert_eq!(guess_mime(Path::new("a.PDF")), "application/pdf");
    assert_eq!(guess_mime(Path::new("scan.jpeg")), "image/jpeg");
    assert_eq!(guess_mime(Path::new("photo.heic")), "image/heic");
    assert_eq!(guess_mime(Path::new("notes.docx")), "application/octet-stream");
    assert_eq!(guess_mime(Path::new("README")), "application/octet-stream");
  }

  #[test]
  fn drops_oversize_and_unsupported_files() {
    let policy = FilePolicy::default();
    let (kept, skipped) = select(
      vec![
        candidate("passport.pdf", 1024),
        candidate("huge.pdf", policy.max_file_bytes + 1),
        candidate("notes.docx", 10),
        candidate("photo.png", policy.max_file_bytes),
      ],
      &policy,
    );

    let names: Vec<_> = kept.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(names, ["passport.pdf", "photo.png"]);
    assert_eq!(skipped.len(), 2);
    assert!(skipped[0].reason.contains("huge.pdf"));
    assert!(skipped[1].reason.contains("notes.docx"));
  }

  #[test]
  fn keeps_only_the_first_fifteen() {
    let policy = FilePolicy::default();
    let candidates = (0..17).map(|i| candidate(&format!("doc-{i}.pdf"), 10)).collect();
    let (kept, skipped) = select(candidates, &policy);

    assert_eq!(kept.len(), 15);
    assert_eq!(kept[14].filename, "doc-14.pdf");
    assert_eq!(skipped.len(), 2);
    assert_eq!(skipped[0].path, PathBuf::from("doc-15.pdf"));
  }

  #[test]
  fn inspect_reads_size_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("i-94.pdf");
    std::fs::write(&path, b"%PDF-1.7").unwrap();

    let attachment = inspect(&path).unwrap();
    assert_eq!(attachment.filename, "i-94.pdf");
    assert_eq!(attachment.mime_type, "application/pdf");
    assert_eq!(attachment.size, 8);

    assert!(inspect(&dir.path().join("missing.pdf")).is_err());
  }
}
