//! Workspace preparation: a fresh, empty staging directory for every run.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::FilesystemError;
use crate::util::fs::clear_dir;

/// Ensure `path` exists and is empty.
///
/// Creates the directory and any missing parents, then removes everything
/// already inside it so no file from an earlier run can leak into the next
/// publish. An existing empty directory is left as is.
pub fn prepare_staging(path: &Path) -> Result<(), FilesystemError> {
  match fs::metadata(path) {
    Ok(meta) if !meta.is_dir() => {
      return Err(FilesystemError::NotADirectory {
        path: path.to_path_buf(),
      });
    }
    Ok(_) => {}
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        source: e,
      })?;
      debug!(path = ?path, "created staging directory");
    }
    Err(e) => {
      return Err(FilesystemError::Read {
        path: path.to_path_buf(),
        source: e,
      });
    }
  }

  let removed = clear_dir(path).map_err(|e| FilesystemError::Clear {
    path: path.to_path_buf(),
    source: e,
  })?;
  info!(path = ?path, removed, "staging directory ready");

  Ok(())
}

/// Delete a staging directory left behind by earlier runs.
///
/// Returns `false` when there was nothing to remove.
pub fn remove_staging(path: &Path) -> Result<bool, FilesystemError> {
  match fs::symlink_metadata(path) {
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(e) => Err(FilesystemError::Read {
      path: path.to_path_buf(),
      source: e,
    }),
    Ok(meta) if !meta.is_dir() => Err(FilesystemError::NotADirectory {
      path: path.to_path_buf(),
    }),
    Ok(_) => {
      fs::remove_dir_all(path).map_err(|e| FilesystemError::Clear {
        path: path.to_path_buf(),
        source: e,
      })?;
      info!(path = ?path, "removed staging directory");
      Ok(true)
    }
  }
}
