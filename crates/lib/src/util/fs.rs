//! Filesystem primitives shared by the staging, asset and publish steps.
//!
//! These return plain `io::Error`s; callers attach the path and map them
//! into their own error type so the failing stage is identifiable.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

/// Copy a file or directory to `dst`, recursing into directories.
///
/// Symlinks are followed, so the destination always holds real files.
/// Returns the number of regular files written.
pub fn copy_entry(src: &Path, dst: &Path) -> io::Result<usize> {
  if fs::metadata(src)?.is_dir() {
    copy_dir_all(src, dst)
  } else {
    fs::copy(src, dst)?;
    debug!(from = ?src, to = ?dst, "copied file");
    Ok(1)
  }
}

/// Copy a directory recursively, creating `dst` if needed.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<usize> {
  fs::create_dir_all(dst)?;
  let mut copied = 0;
  for entry in fs::read_dir(src)? {
    let entry = entry?;
    copied += copy_entry(&entry.path(), &dst.join(entry.file_name()))?;
  }
  Ok(copied)
}

/// Remove a path (file, directory, or symlink) without following links.
pub fn remove_path(path: &Path) -> io::Result<()> {
  let meta = fs::symlink_metadata(path)?;
  if meta.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  }
}

/// Remove every entry directly inside `dir`, leaving `dir` itself in place.
///
/// Returns the number of entries removed.
pub fn clear_dir(dir: &Path) -> io::Result<usize> {
  let mut removed = 0;
  for entry in fs::read_dir(dir)? {
    let entry = entry?;
    remove_path(&entry.path())?;
    removed += 1;
  }
  Ok(removed)
}

/// Sorted entries directly inside `dir`, so copies happen in a stable order.
pub fn sorted_entries(dir: &Path) -> io::Result<Vec<fs::DirEntry>> {
  let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
  entries.sort_by_key(|e| e.file_name());
  Ok(entries)
}
