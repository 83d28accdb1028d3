//! Error types for each pipeline stage.
//!
//! Every stage returns its own error; [`crate::pipeline::PipelineError`]
//! wraps them and records which stage failed. Tool diagnostics are kept
//! verbatim in the message.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

use crate::util::hash::DirHashError;

fn display_duration(limit: &Duration) -> String {
  humantime::format_duration(*limit).to_string()
}

fn display_paths(paths: &[PathBuf]) -> String {
  paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

/// Staging and asset-merge I/O failures.
#[derive(Debug, Error)]
pub enum FilesystemError {
  #[error("{path} exists and is not a directory")]
  NotADirectory { path: PathBuf },

  #[error("failed to create directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to clear directory {path}: {source}")]
  Clear {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("static assets directory not found: {path}")]
  SourceMissing { path: PathBuf },

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to copy {from} to {to}: {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// The external compiler did not produce an artifact.
#[derive(Debug, Error)]
pub enum CompilationError {
  #[error("failed to run compiler `{program}`: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("compiler failed ({status}) while building package `{package}`\n{diagnostics}")]
  Failed {
    package: String,
    status: ExitStatus,
    diagnostics: String,
  },

  #[error("compiler timed out after {} while building package `{package}`", display_duration(.limit))]
  TimedOut { package: String, limit: Duration },

  #[error("compiler reported success but the artifact is missing: {path}")]
  MissingArtifact { path: PathBuf },
}

/// The external binding generator failed or produced incomplete output.
#[derive(Debug, Error)]
pub enum BindingGenerationError {
  #[error("failed to run binding generator `{program}`: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("binding generator failed ({status}) for {artifact}\n{diagnostics}")]
  Failed {
    artifact: PathBuf,
    status: ExitStatus,
    diagnostics: String,
  },

  #[error("binding generator timed out after {} for {artifact}", display_duration(.limit))]
  TimedOut { artifact: PathBuf, limit: Duration },

  #[error("binding generator reported success but did not write: {}", display_paths(.missing))]
  MissingOutput { missing: Vec<PathBuf> },
}

/// Failure while replacing the published directory.
///
/// Variants that may have touched the live directory say so in their
/// message; [`PublishError::may_be_incomplete`] reports the same.
#[derive(Debug, Error)]
pub enum PublishError {
  #[error("failed to hash staging directory {path}: {source}")]
  HashStaging {
    path: PathBuf,
    #[source]
    source: DirHashError,
  },

  #[error("failed to create published directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to prepare replacement beside {path}: {source}")]
  Prepare {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to clear published directory {path}, it may be incomplete: {source}")]
  Clear {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to copy {from} to {to}, published directory may be incomplete: {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
    live: bool,
  },

  #[error("failed to move new content into {path}, published directory may be missing: {source}")]
  Swap {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to verify published directory {path}: {source}")]
  HashPublished {
    path: PathBuf,
    #[source]
    source: DirHashError,
  },

  #[error("published directory {path} does not match staging (expected {expected}, found {actual})")]
  Mismatch {
    path: PathBuf,
    expected: String,
    actual: String,
  },
}

impl PublishError {
  /// Whether the live directory may have been left empty or partial.
  pub fn may_be_incomplete(&self) -> bool {
    match self {
      PublishError::HashStaging { .. } | PublishError::CreateDir { .. } | PublishError::Prepare { .. } => false,
      PublishError::Copy { live, .. } => *live,
      PublishError::Clear { .. }
      | PublishError::Swap { .. }
      | PublishError::HashPublished { .. }
      | PublishError::Mismatch { .. } => true,
    }
  }
}

/// Another run holds the published directory.
#[derive(Debug, Error)]
pub enum LockError {
  #[error(
    "{published} is being published by another process: {command} (PID {pid}, started {started_at})\n\
     If you're sure no wasmpub process is running, remove the lock file:\n  {lock_path}"
  )]
  Contention {
    published: PathBuf,
    command: String,
    pid: u32,
    started_at: String,
    lock_path: PathBuf,
  },

  #[error(
    "{published} is locked (could not read lock metadata)\n\
     If you're sure no wasmpub process is running, remove the lock file:\n  {lock_path}"
  )]
  ContentionUnknown { published: PathBuf, lock_path: PathBuf },

  #[error("failed to create lock directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to open lock file: {0}")]
  OpenFile(#[source] io::Error),

  #[error("failed to write lock metadata: {0}")]
  WriteMetadata(#[source] io::Error),

  #[error("failed to acquire lock: {0}")]
  LockFailed(#[source] io::Error),
}

/// Problems loading or validating `wasmpub.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("wasmpub.toml not found (searched upward from {start})")]
  NotFound { start: PathBuf },

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("no targets configured; add a [[target]] table")]
  NoTargets,

  #[error("target `{0}` is configured more than once")]
  DuplicateTarget(String),

  #[error("invalid target name `{0}`: must be a plain directory name")]
  InvalidTargetName(String),

  #[error("{tool} command must not be empty")]
  EmptyCommand { tool: &'static str },

  #[error("staging root {staging} overlaps published directory {published} of target `{target}`")]
  StagingOverlapsPublish {
    target: String,
    staging: PathBuf,
    published: PathBuf,
  },

  #[error("staging directory {staging} overlaps static assets {assets} of target `{target}`")]
  StagingOverlapsStatic {
    target: String,
    staging: PathBuf,
    assets: PathBuf,
  },

  #[error("target `{target}` has no {field}; set it on the target or at the top level")]
  MissingPath { target: String, field: &'static str },

  #[error("unknown target `{name}` (available: {available})")]
  UnknownTarget { name: String, available: String },
}
