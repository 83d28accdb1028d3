//! File-based locking of a published directory.
//!
//! Only one run may write a given published directory at a time. Lock files
//! live in the staging root, which the pipeline always owns, and are named
//! after the resolved published path so two spellings of one directory
//! share a lock. Nothing is written beside the published directory.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::consts::LOCK_SUFFIX;
use crate::error::LockError;

#[derive(Debug, Serialize, Deserialize)]
pub struct LockMetadata {
  pub version: u32,
  pub pid: u32,
  pub started_at_unix: u64,
  pub command: String,
  pub published: PathBuf,
}

/// Exclusive lock on one published directory, released on drop.
pub struct PublishLock {
  file: File,
  lock_path: PathBuf,
}

/// Lock file guarding `published`: `<lock_dir>/.<name>-<key>.wasmpub.lock`.
///
/// `key` is derived from the resolved published path.
pub fn lock_path_for(lock_dir: &Path, published: &Path) -> PathBuf {
  let resolved = resolve(published);
  let name = resolved
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "root".to_string());
  let digest = hex::encode(Sha256::digest(resolved.to_string_lossy().as_bytes()));
  lock_dir.join(format!(".{}-{}{}", name, &digest[..16], LOCK_SUFFIX))
}

/// `published` with symlinks resolved, as far as it exists yet.
fn resolve(published: &Path) -> PathBuf {
  if let Ok(path) = dunce::canonicalize(published) {
    return path;
  }
  match (published.parent(), published.file_name()) {
    (Some(parent), Some(name)) => resolve(parent).join(name),
    _ => published.to_path_buf(),
  }
}

impl PublishLock {
  /// Take the lock without waiting; contention is reported, not waited out.
  pub fn acquire(lock_dir: &Path, published: &Path, command: &str) -> Result<Self, LockError> {
    let lock_path = lock_path_for(lock_dir, published);

    if let Some(parent) = lock_path.parent()
      && !parent.exists()
    {
      std::fs::create_dir_all(parent).map_err(|e| LockError::CreateDir {
        path: parent.to_path_buf(),
        source: e,
      })?;
    }

    let file = OpenOptions::new()
      .read(true)
      .write(true)
      .create(true)
      .truncate(false)
      .open(&lock_path)
      .map_err(LockError::OpenFile)?;

    if let Err(err) = try_lock(&file) {
      if err.kind() == io::ErrorKind::WouldBlock {
        return Err(read_contention_error(published, &lock_path));
      }
      return Err(LockError::LockFailed(err));
    }

    write_metadata(&file, command, published)?;
    debug!(lock = ?lock_path, "acquired publish lock");

    Ok(PublishLock { file, lock_path })
  }

  /// Reads the lock metadata from the held file handle.
  ///
  /// Opening the file again would fail on Windows while the lock is held.
  pub fn read_metadata(&self) -> io::Result<LockMetadata> {
    use std::io::{Seek, SeekFrom};

    let mut file = &self.file;
    file.seek(SeekFrom::Start(0))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    serde_json::from_str(&contents).map_err(io::Error::other)
  }

  pub fn lock_path(&self) -> &Path {
    &self.lock_path
  }
}

fn write_metadata(file: &File, command: &str, published: &Path) -> Result<(), LockError> {
  let metadata = LockMetadata {
    version: 1,
    pid: std::process::id(),
    started_at_unix: SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .unwrap_or_default()
      .as_secs(),
    command: command.to_string(),
    published: published.to_path_buf(),
  };

  file.set_len(0).map_err(LockError::WriteMetadata)?;
  let mut writer = io::BufWriter::new(file);
  serde_json::to_writer_pretty(&mut writer, &metadata).map_err(|e| LockError::WriteMetadata(io::Error::other(e)))?;
  writer.flush().map_err(LockError::WriteMetadata)?;

  Ok(())
}

fn read_contention_error(published: &Path, lock_path: &Path) -> LockError {
  if let Ok(mut file) = File::open(lock_path) {
    let mut contents = String::new();
    if file.read_to_string(&mut contents).is_ok()
      && let Ok(metadata) = serde_json::from_str::<LockMetadata>(&contents)
    {
      return LockError::Contention {
        published: published.to_path_buf(),
        command: metadata.command,
        pid: metadata.pid,
        started_at: format!("Unix timestamp {}", metadata.started_at_unix),
        lock_path: lock_path.to_path_buf(),
      };
    }
  }

  LockError::ContentionUnknown {
    published: published.to_path_buf(),
    lock_path: lock_path.to_path_buf(),
  }
}

#[cfg(unix)]
fn try_lock(file: &File) -> io::Result<()> {
  use rustix::fs::{FlockOperation, flock};
  use std::os::unix::io::AsFd;

  flock(file.as_fd(), FlockOperation::NonBlockingLockExclusive)
    .map_err(|e| io::Error::from_raw_os_error(e.raw_os_error()))
}

#[cfg(windows)]
fn try_lock(file: &File) -> io::Result<()> {
  use std::os::windows::io::AsRawHandle;
  use windows_sys::Win32::Foundation::HANDLE;
  use windows_sys::Win32::Storage::FileSystem::{LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY, LockFileEx};

  let handle = file.as_raw_handle() as HANDLE;

  // SAFETY: OVERLAPPED is a plain data struct that is valid when zero-initialized.
  // LockFileEx is safe to call with a valid file handle and zeroed OVERLAPPED.
  let result = unsafe {
    let mut overlapped = std::mem::zeroed();
    LockFileEx(
      handle,
      LOCKFILE_FAIL_IMMEDIATELY | LOCKFILE_EXCLUSIVE_LOCK,
      0,
      1,
      0,
      &mut overlapped,
    )
  };

  if result == 0 {
    Err(io::Error::last_os_error())
  } else {
    Ok(())
  }
}
