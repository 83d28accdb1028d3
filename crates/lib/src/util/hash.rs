//! Content hashing for comparing asset sets.
//!
//! The publisher hashes the staging directory before it touches the live
//! directory and hashes the live directory again afterward; the two must
//! agree before a publish is reported as successful.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// A full 64-character SHA256 hash of file or directory content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
  /// First 12 characters, for display.
  pub fn short(&self) -> &str {
    let len = self.0.len().min(12);
    &self.0[..len]
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum DirHashError {
  #[error("failed to walk directory: {message}")]
  WalkDir { message: String },

  #[error("failed to read file {path}: {message}")]
  ReadFile { path: String, message: String },
}

/// Compute a deterministic hash of a directory's contents.
///
/// Covers file contents and directory structure, not timestamps or
/// permissions. Symlinks are followed, so a linked file hashes the same as
/// a copied one.
pub fn hash_directory(path: &Path) -> Result<ContentHash, DirHashError> {
  let mut entries: Vec<(String, String)> = Vec::new();

  for (rel_path, entry_path, is_dir) in walk(path)? {
    let entry_hash = if is_dir {
      format!("D:{}", rel_path)
    } else {
      format!("F:{}:{}", rel_path, hash_file(&entry_path)?.0)
    };
    entries.push((rel_path, entry_hash));
  }

  entries.sort_by(|a, b| a.0.cmp(&b.0));

  let mut hasher = Sha256::new();
  for (_, entry_hash) in entries {
    hasher.update(entry_hash.as_bytes());
    hasher.update(b"\n");
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// List every regular file below `path`, relative to it, using `/` separators.
///
/// Sorted, so two directories with the same file set produce equal lists.
pub fn list_files(path: &Path) -> Result<Vec<String>, DirHashError> {
  let mut files: Vec<String> = walk(path)?
    .into_iter()
    .filter(|(_, _, is_dir)| !is_dir)
    .map(|(rel, _, _)| rel)
    .collect();
  files.sort();
  Ok(files)
}

fn walk(path: &Path) -> Result<Vec<(String, PathBuf, bool)>, DirHashError> {
  let walker = WalkDir::new(path).follow_links(true).sort_by_file_name();

  let mut out = Vec::new();
  for entry in walker {
    let entry = entry.map_err(|e| DirHashError::WalkDir { message: e.to_string() })?;
    if entry.depth() == 0 {
      continue;
    }

    let rel_path = entry
      .path()
      .strip_prefix(path)
      .unwrap_or(entry.path())
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");

    let file_type = entry.file_type();
    if file_type.is_dir() {
      out.push((rel_path, entry.path().to_path_buf(), true));
    } else if file_type.is_file() {
      out.push((rel_path, entry.path().to_path_buf(), false));
    }
    // Sockets and devices are not part of an asset set.
  }
  Ok(out)
}

/// Hash a file's contents.
pub fn hash_file(path: &Path) -> Result<ContentHash, DirHashError> {
  let read_err = |e: std::io::Error| DirHashError::ReadFile {
    path: path.display().to_string(),
    message: e.to_string(),
  };

  let mut file = fs::File::open(path).map_err(read_err)?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(read_err)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}
