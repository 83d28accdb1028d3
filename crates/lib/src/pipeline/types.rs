//! Types for pipeline runs: stages, run states, reports and errors.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::assets::MergeSummary;
use crate::bindgen::GeneratedBindings;
use crate::error::{BindingGenerationError, CompilationError, FilesystemError, LockError, PublishError};
use crate::publish::PublishOutcome;

/// A step of the pipeline that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
  Lock,
  Prepare,
  Compile,
  Bind,
  MergeAssets,
  Publish,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Stage::Lock => "lock",
      Stage::Prepare => "prepare",
      Stage::Compile => "compile",
      Stage::Bind => "bind",
      Stage::MergeAssets => "merge-assets",
      Stage::Publish => "publish",
    };
    f.write_str(name)
  }
}

/// Where a run is. States only move forward; a run ends in
/// [`RunState::Published`] or [`RunState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
  Start,
  Prepared,
  Compiled,
  Bound,
  AssetsMerged,
  Published,
  Failed { stage: Stage, reason: String },
}

impl RunState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, RunState::Published | RunState::Failed { .. })
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RunState::Start => f.write_str("start"),
      RunState::Prepared => f.write_str("prepared"),
      RunState::Compiled => f.write_str("compiled"),
      RunState::Bound => f.write_str("bound"),
      RunState::AssetsMerged => f.write_str("assets merged"),
      RunState::Published => f.write_str("published"),
      RunState::Failed { stage, .. } => write!(f, "failed at {}", stage),
    }
  }
}

/// The first failure of a run, tagged with the stage that produced it.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("lock: {0}")]
  Lock(#[from] LockError),

  #[error("prepare: {0}")]
  Prepare(#[source] FilesystemError),

  #[error("compile: {0}")]
  Compile(#[from] CompilationError),

  #[error("bind: {0}")]
  Bind(#[from] BindingGenerationError),

  #[error("merge-assets: {0}")]
  MergeAssets(#[source] FilesystemError),

  #[error("publish: {0}")]
  Publish(#[from] PublishError),
}

impl PipelineError {
  pub fn stage(&self) -> Stage {
    match self {
      PipelineError::Lock(_) => Stage::Lock,
      PipelineError::Prepare(_) => Stage::Prepare,
      PipelineError::Compile(_) => Stage::Compile,
      PipelineError::Bind(_) => Stage::Bind,
      PipelineError::MergeAssets(_) => Stage::MergeAssets,
      PipelineError::Publish(_) => Stage::Publish,
    }
  }

  /// Whether the published directory was left at its previous content.
  pub fn published_untouched(&self) -> bool {
    match self {
      PipelineError::Publish(e) => !e.may_be_incomplete(),
      _ => true,
    }
  }
}

/// A failed target in a multi-target run, plus the targets that finished
/// before it.
#[derive(Debug, Error)]
#[error("target `{target}` failed: {source}")]
pub struct RunAllError {
  pub target: String,
  pub completed: Vec<PipelineReport>,
  #[source]
  pub source: PipelineError,
}

/// Summary of one successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
  pub target: String,
  pub staging_dir: PathBuf,
  pub published_dir: PathBuf,
  pub artifact: PathBuf,
  pub bindings: GeneratedBindings,
  pub assets: MergeSummary,
  pub publish: PublishOutcome,
  pub duration_ms: u64,
}
