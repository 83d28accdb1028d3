//! Binding generator invocation.
//!
//! Turns the compiled artifact into a web-loadable module plus JavaScript
//! glue, written straight into the staging directory.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::compile::CompiledArtifact;
use crate::config::BinderSettings;
use crate::error::BindingGenerationError;
use crate::process::{ToolError, ToolInvocation, run_tool};
use crate::target::BuildTarget;

/// Files the binding generator is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedBindings {
  pub module: PathBuf,
  pub glue: PathBuf,
}

impl GeneratedBindings {
  fn missing(&self) -> Vec<PathBuf> {
    [&self.module, &self.glue]
      .into_iter()
      .filter(|p| !p.is_file())
      .cloned()
      .collect()
  }
}

/// Paths of the module and glue file for `target` inside `out_dir`.
pub fn expected_outputs(target: &BuildTarget, binder: &BinderSettings, out_dir: &Path) -> GeneratedBindings {
  GeneratedBindings {
    module: out_dir.join(format!("{}{}.wasm", target.out_name, binder.module_suffix)),
    glue: out_dir.join(format!("{}.js", target.out_name)),
  }
}

/// The binding generator command line.
pub fn bindgen_invocation(
  artifact: &Path,
  target: &BuildTarget,
  binder: &BinderSettings,
  out_dir: &Path,
) -> ToolInvocation {
  let invocation = ToolInvocation::new(&binder.command)
    .arg("--target")
    .arg(&binder.env)
    .arg("--out-name")
    .arg(&target.out_name)
    .arg("--out-dir")
    .arg(out_dir);
  let invocation = if binder.typescript {
    invocation
  } else {
    invocation.arg("--no-typescript")
  };
  invocation.arg(artifact)
}

/// Generate bindings for `artifact` into `out_dir`.
///
/// A generator that exits zero without writing the module and glue file is
/// treated as a failure.
pub async fn generate_bindings(
  artifact: &CompiledArtifact,
  target: &BuildTarget,
  binder: &BinderSettings,
  out_dir: &Path,
) -> Result<GeneratedBindings, BindingGenerationError> {
  let invocation = bindgen_invocation(&artifact.path, target, binder, out_dir);

  let output = run_tool(&invocation, binder.timeout).await.map_err(|e| match e {
    ToolError::Spawn(source) => BindingGenerationError::Spawn {
      program: invocation.program.clone(),
      source,
    },
    ToolError::TimedOut(limit) => BindingGenerationError::TimedOut {
      artifact: artifact.path.clone(),
      limit,
    },
  })?;

  if !output.success() {
    return Err(BindingGenerationError::Failed {
      artifact: artifact.path.clone(),
      status: output.status,
      diagnostics: output.diagnostics(),
    });
  }

  let outputs = expected_outputs(target, binder, out_dir);
  let missing = outputs.missing();
  if !missing.is_empty() {
    return Err(BindingGenerationError::MissingOutput { missing });
  }

  info!(target = %target.name, module = ?outputs.module, glue = ?outputs.glue, "bindings generated");
  Ok(outputs)
}
