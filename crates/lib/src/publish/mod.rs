//! Publishing: replace the live asset directory with the staging directory.
//!
//! The published directory is always created if absent, then emptied, then
//! filled from staging. With [`PublishStrategy::Swap`] the new content is
//! assembled in a sibling temporary directory first and moved into place by
//! rename, so the live directory is never seen half-copied; on Linux the
//! two directories are exchanged with a single `renameat2` call. With
//! [`PublishStrategy::InPlace`] the live directory is cleared and refilled
//! directly.
//!
//! When the published path is a symlink, the directory it points at is the
//! one replaced and the link itself is kept.
//!
//! Either way the result is hashed and compared with staging before the
//! publish is reported as successful. A failure part way through may leave
//! the published directory empty or partial; the error says so and nothing
//! is retried.

pub mod lock;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::PublishError;
use crate::util::fs::{clear_dir, copy_entry, remove_path, sorted_entries};
use crate::util::hash::{ContentHash, hash_directory, list_files};

pub use lock::{PublishLock, lock_path_for};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishStrategy {
  /// Build beside the live directory, then rename into place.
  #[default]
  Swap,
  /// Clear the live directory and copy into it.
  InPlace,
}

/// How the new content actually reached the live directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishMethod {
  /// Both directories swapped in one atomic rename.
  Exchange,
  /// Live directory moved aside, new one moved in.
  RenamePair,
  /// Live directory cleared and refilled.
  InPlace,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
  pub method: PublishMethod,
  /// Files now in the published directory, relative and sorted.
  pub files: Vec<String>,
  pub content_hash: ContentHash,
}

/// Replace the contents of `published` with the contents of `staging`.
pub fn publish(staging: &Path, published: &Path, strategy: PublishStrategy) -> Result<PublishOutcome, PublishError> {
  let expected = hash_directory(staging).map_err(|e| PublishError::HashStaging {
    path: staging.to_path_buf(),
    source: e,
  })?;

  fs::create_dir_all(published).map_err(|e| PublishError::CreateDir {
    path: published.to_path_buf(),
    source: e,
  })?;

  let live = resolve_live(published)?;
  let method = match strategy {
    PublishStrategy::Swap => publish_swap(staging, &live, &NATIVE_OPS)?,
    PublishStrategy::InPlace => {
      publish_in_place(staging, &live)?;
      PublishMethod::InPlace
    }
  };

  let actual = hash_directory(published).map_err(|e| PublishError::HashPublished {
    path: published.to_path_buf(),
    source: e,
  })?;
  if actual != expected {
    return Err(PublishError::Mismatch {
      path: published.to_path_buf(),
      expected: expected.0,
      actual: actual.0,
    });
  }

  let files = list_files(published).map_err(|e| PublishError::HashPublished {
    path: published.to_path_buf(),
    source: e,
  })?;

  info!(published = ?published, method = ?method, files = files.len(), hash = %expected.short(), "published");
  Ok(PublishOutcome {
    method,
    files,
    content_hash: expected,
  })
}

/// The directory that actually holds the published content.
fn resolve_live(published: &Path) -> Result<PathBuf, PublishError> {
  let is_link = fs::symlink_metadata(published)
    .map(|m| m.file_type().is_symlink())
    .unwrap_or(false);
  if !is_link {
    return Ok(published.to_path_buf());
  }

  let live = dunce::canonicalize(published).map_err(|e| PublishError::Prepare {
    path: published.to_path_buf(),
    source: e,
  })?;
  debug!(published = ?published, live = ?live, "published path is a symlink");
  Ok(live)
}

/// Copy every entry of `staging` into `dest`.
fn copy_all(staging: &Path, dest: &Path, live: bool) -> Result<usize, PublishError> {
  let copy_err = |from: &Path, to: &Path, e: io::Error| PublishError::Copy {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source: e,
    live,
  };

  let mut copied = 0;
  for entry in sorted_entries(staging).map_err(|e| copy_err(staging, dest, e))? {
    let from = entry.path();
    let to = dest.join(entry.file_name());
    copied += copy_entry(&from, &to).map_err(|e| copy_err(&from, &to, e))?;
  }
  Ok(copied)
}

fn publish_in_place(staging: &Path, published: &Path) -> Result<(), PublishError> {
  let removed = clear_dir(published).map_err(|e| PublishError::Clear {
    path: published.to_path_buf(),
    source: e,
  })?;
  debug!(published = ?published, removed, "cleared published directory");

  let copied = copy_all(staging, published, true)?;
  debug!(published = ?published, copied, "copied staging into published directory");
  Ok(())
}

/// Directory operations the swap needs that a filesystem may refuse.
struct SwapOps {
  /// Create an empty directory beside the live one.
  scratch: fn(&Path, &str) -> io::Result<TempDir>,
  /// Exchange two directories in one step.
  exchange: fn(&Path, &Path) -> io::Result<()>,
}

const NATIVE_OPS: SwapOps = SwapOps {
  scratch: sibling_tempdir,
  exchange: exchange_dirs,
};

fn sibling_tempdir(parent: &Path, name: &str) -> io::Result<TempDir> {
  tempfile::Builder::new()
    .prefix(&format!(".{}.next-", name))
    .tempdir_in(parent)
}

fn publish_swap(staging: &Path, published: &Path, ops: &SwapOps) -> Result<PublishMethod, PublishError> {
  let prepare_err = |e: io::Error| PublishError::Prepare {
    path: published.to_path_buf(),
    source: e,
  };

  let parent = published.parent().ok_or_else(|| {
    prepare_err(io::Error::new(
      io::ErrorKind::InvalidInput,
      "published directory has no parent",
    ))
  })?;
  let name = published
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();

  let next = match (ops.scratch)(parent, &name) {
    Ok(next) => next,
    Err(e) => {
      // A writable directory inside a read-only parent.
      warn!(published = ?published, error = %e, "cannot stage beside published directory, publishing in place");
      publish_in_place(staging, published)?;
      return Ok(PublishMethod::InPlace);
    }
  };

  copy_all(staging, next.path(), false)?;

  // The temp dir is created private; give it the live directory's mode so
  // the server can still read it after the swap.
  let permissions = fs::metadata(published).map_err(prepare_err)?.permissions();
  fs::set_permissions(next.path(), permissions).map_err(prepare_err)?;

  match (ops.exchange)(next.path(), published) {
    Ok(()) => {
      // `next` now names the previous content.
      if let Err(e) = next.close() {
        warn!(error = %e, "failed to remove previous published content");
      }
      return Ok(PublishMethod::Exchange);
    }
    Err(e) => debug!(error = %e, "atomic exchange unavailable, falling back to rename"),
  }

  let backup = parent.join(format!(".{}.old-{}", name, std::process::id()));
  if backup.symlink_metadata().is_ok() {
    remove_path(&backup).map_err(prepare_err)?;
  }

  if let Err(e) = fs::rename(published, &backup) {
    // Nothing has moved yet; a mount point or a busy directory cannot be
    // renamed, so fill it in place instead.
    warn!(published = ?published, error = %e, "cannot move published directory, publishing in place");
    publish_in_place(staging, published)?;
    return Ok(PublishMethod::InPlace);
  }

  if let Err(e) = fs::rename(next.path(), published) {
    if let Err(restore) = fs::rename(&backup, published) {
      warn!(backup = ?backup, error = %restore, "failed to restore previous published content");
    }
    return Err(PublishError::Swap {
      path: published.to_path_buf(),
      source: e,
    });
  }

  if let Err(e) = fs::remove_dir_all(&backup) {
    warn!(backup = ?backup, error = %e, "failed to remove previous published content");
  }
  Ok(PublishMethod::RenamePair)
}

/// Atomically exchange two directory entries.
#[cfg(target_os = "linux")]
fn exchange_dirs(a: &Path, b: &Path) -> io::Result<()> {
  use rustix::fs::{CWD, RenameFlags, renameat_with};

  renameat_with(CWD, a, CWD, b, RenameFlags::EXCHANGE).map_err(|e| io::Error::from_raw_os_error(e.raw_os_error()))
}

#[cfg(not(target_os = "linux"))]
fn exchange_dirs(_a: &Path, _b: &Path) -> io::Result<()> {
  Err(io::Error::new(io::ErrorKind::Unsupported, "atomic exchange not supported"))
}
