//! Compiler invocation.
//!
//! Runs `cargo build --release` for one target and locates the resulting
//! `.wasm` at its deterministic path under the cargo target directory.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::CompilerSettings;
use crate::error::CompilationError;
use crate::process::{ToolError, ToolInvocation, run_tool};
use crate::target::BuildTarget;

/// The binary produced by the compiler for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledArtifact {
  pub path: PathBuf,
}

/// Where the compiler leaves the release artifact for `target`.
pub fn artifact_path(target: &BuildTarget, target_dir: &Path) -> PathBuf {
  target_dir
    .join(&target.platform)
    .join("release")
    .join(target.artifact_file_name())
}

/// The compiler command line for `target`.
pub fn compiler_invocation(target: &BuildTarget, settings: &CompilerSettings) -> ToolInvocation {
  ToolInvocation::new(&settings.command)
    .args(["build", "--release", "--target"])
    .arg(&target.platform)
    .arg("--package")
    .arg(&target.package)
    .arg("--target-dir")
    .arg(&settings.target_dir)
    .args(&settings.args)
    .current_dir(&settings.workspace)
}

/// Compile `target` and return the artifact.
///
/// Succeeds only when the compiler exits zero and the artifact exists. The
/// compiler's own output is carried in the error untouched.
pub async fn compile_artifact(
  target: &BuildTarget,
  settings: &CompilerSettings,
) -> Result<CompiledArtifact, CompilationError> {
  let invocation = compiler_invocation(target, settings);

  let output = run_tool(&invocation, settings.timeout).await.map_err(|e| match e {
    ToolError::Spawn(source) => CompilationError::Spawn {
      program: invocation.program.clone(),
      source,
    },
    ToolError::TimedOut(limit) => CompilationError::TimedOut {
      package: target.package.clone(),
      limit,
    },
  })?;

  if !output.success() {
    return Err(CompilationError::Failed {
      package: target.package.clone(),
      status: output.status,
      diagnostics: output.diagnostics(),
    });
  }

  let path = artifact_path(target, &settings.target_dir);
  if !path.is_file() {
    return Err(CompilationError::MissingArtifact { path });
  }

  info!(target = %target.name, artifact = ?path, "compiled");
  Ok(CompiledArtifact { path })
}
