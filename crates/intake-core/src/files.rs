//! Upload limits shared by the client and the server.
//!
//! The client uses [`FilePolicy`] to drop files before sending them; the
//! server applies the same policy again and rejects the whole request on the
//! first offending file.

use thiserror::Error;

/// Maximum number of files attached to one submission.
pub const MAX_FILES: usize = 15;

/// Maximum size of a single uploaded file (25 MiB).
pub const MAX_FILE_BYTES: usize = 25 * 1024 * 1024;

const MAX_FILENAME_LENGTH: usize = 255;

/// Why a file (or the file set) was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileRejection {
  #[error("too many files: at most {max} are accepted")]
  TooMany { max: usize },

  #[error("{filename} exceeds the {max_mib} MB limit")]
  TooLarge { filename: String, max_mib: usize },

  #[error("{filename} has unsupported type {mime_type}; only PDF and images are accepted")]
  UnsupportedType { filename: String, mime_type: String },
}

/// Size, count and type limits for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePolicy {
  pub max_files:      usize,
  pub max_file_bytes: usize,
}

impl Default for FilePolicy {
  fn default() -> Self {
    Self { max_files: MAX_FILES, max_file_bytes: MAX_FILE_BYTES }
  }
}

impl FilePolicy {
  /// Check one file against the size and type limits.
  pub fn check(
    &self,
    filename: &str,
    mime_type: &str,
    size: usize,
  ) -> Result<(), FileRejection> {
    if size > self.max_file_bytes {
      return Err(FileRejection::TooLarge {
        filename: filename.to_string(),
        max_mib:  self.max_file_bytes / 1024 / 1024,
      });
    }
    if !is_accepted_mime(mime_type) {
      return Err(FileRejection::UnsupportedType {
        filename:  filename.to_string(),
        mime_type: mime_type.to_string(),
      });
    }
    Ok(())
  }

  /// Check that `count` files fit in one submission.
  pub fn check_count(&self, count: usize) -> Result<(), FileRejection> {
    if count > self.max_files {
      return Err(FileRejection::TooMany { max: self.max_files });
    }
    Ok(())
  }

  /// Upper bound on a request body carrying a full set of files, with 1 MiB
  /// of headroom for the payload field and multipart framing.
  pub fn max_request_bytes(&self) -> usize {
    self.max_files * self.max_file_bytes + 1024 * 1024
  }
}

/// PDF or any `image/*` type. Parameters are ignored and the comparison is
/// case-insensitive.
pub fn is_accepted_mime(mime_type: &str) -> bool {
  let essence = mime_type
    .split(';')
    .next()
    .map(str::trim)
    .unwrap_or_default()
    .to_ascii_lowercase();
  essence == "application/pdf"
    || essence
      .strip_prefix("image/")
      .is_some_and(|sub| !sub.is_empty())
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Directory components are dropped, anything outside `[A-Za-z0-9._-]`
/// becomes `_`, and names that end up empty or made only of dots fall back
/// to `file`.
pub fn sanitize_filename(filename: &str) -> String {
  let last = filename
    .rsplit(['/', '\\'])
    .next()
    .unwrap_or(filename);

  let sanitized: String = last
    .chars()
    .take(MAX_FILENAME_LENGTH)
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
        c
      } else {
        '_'
      }
    })
    .collect();

  if sanitized.chars().all(|c| c == '.') {
    "file".to_string()
  } else {
    sanitized
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_pdf_and_images() {
    assert!(is_accepted_mime("application/pdf"));
    assert!(is_accepted_mime("image/png"));
    assert!(is_accepted_mime("IMAGE/JPEG; charset=binary"));
    assert!(!is_accepted_mime("image/"));
    assert!(!is_accepted_mime("text/plain"));
    assert!(!is_accepted_mime("application/octet-stream"));
  }

  #[test]
  fn size_limit_is_inclusive() {
    let policy = FilePolicy::default();
    assert!(policy.check("a.pdf", "application/pdf", MAX_FILE_BYTES).is_ok());
    assert_eq!(
      policy.check("a.pdf", "application/pdf", MAX_FILE_BYTES + 1),
      Err(FileRejection::TooLarge { filename: "a.pdf".into(), max_mib: 25 })
    );
  }

  #[test]
  fn fifteen_files_fit_sixteen_do_not() {
    let policy = FilePolicy::default();
    assert!(policy.check_count(15).is_ok());
    assert_eq!(policy.check_count(16), Err(FileRejection::TooMany { max: 15 }));
  }

  #[test]
  fn sanitize_strips_directories_and_odd_characters() {
    assert_eq!(sanitize_filename("passport scan.pdf"), "passport_scan.pdf");
    assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
    assert_eq!(sanitize_filename("C:\\Users\\ana\\i-94.png"), "i-94.png");
    assert_eq!(sanitize_filename(".."), "file");
    assert_eq!(sanitize_filename(""), "file");
    assert_eq!(sanitize_filename("pasaporte-ñ.jpg"), "pasaporte-_.jpg");
  }
}
