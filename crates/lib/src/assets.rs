//! Asset merging: static files join the generated ones in staging.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::FilesystemError;
use crate::util::fs::{copy_entry, remove_path, sorted_entries};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
  /// Regular files copied, counting those inside subdirectories.
  pub files_copied: usize,
  /// Top-level names that replaced something already in staging.
  pub overwritten: Vec<String>,
}

/// Copy every entry of `source` into `staging`, keeping names.
///
/// Copy depth follows the source: loose files are copied flat and any
/// subdirectory is copied recursively. A static asset that collides with a
/// generated file replaces it.
pub fn merge_assets(source: &Path, staging: &Path) -> Result<MergeSummary, FilesystemError> {
  let entries = sorted_entries(source).map_err(|e| match e.kind() {
    io::ErrorKind::NotFound => FilesystemError::SourceMissing {
      path: source.to_path_buf(),
    },
    _ => FilesystemError::Read {
      path: source.to_path_buf(),
      source: e,
    },
  })?;

  let mut summary = MergeSummary::default();
  for entry in entries {
    let from = entry.path();
    let name = entry.file_name();
    let to = staging.join(&name);

    if to.symlink_metadata().is_ok() {
      warn!(path = ?to, "static asset replaces generated file");
      remove_path(&to).map_err(|e| copy_error(&from, &to, e))?;
      summary.overwritten.push(name.to_string_lossy().into_owned());
    }

    summary.files_copied += copy_entry(&from, &to).map_err(|e| copy_error(&from, &to, e))?;
  }

  info!(source = ?source, files = summary.files_copied, "static assets merged");
  Ok(summary)
}

fn copy_error(from: &Path, to: &Path, source: io::Error) -> FilesystemError {
  FilesystemError::Copy {
    from: PathBuf::from(from),
    to: PathBuf::from(to),
    source,
  }
}
