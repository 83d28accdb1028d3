//! Pipeline configuration.
//!
//! `wasmpub.toml` is found by walking upward from the working directory,
//! the way cargo finds `Cargo.toml`. Relative paths in it resolve against
//! the directory holding the file, and the result is a [`PipelineConfig`]
//! with every path absolute and every target validated. Stages never read
//! the environment; everything they need is passed in from here.

mod types;

pub use types::{BinderSection, CompilerSection, ConfigFile, TargetSection};

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::consts::CONFIG_FILENAME;
use crate::error::ConfigError;
use crate::publish::PublishStrategy;
use crate::target::{BuildTarget, is_valid_target_name};

/// How the compiler is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerSettings {
  /// Program and leading arguments, e.g. `["cargo", "+nightly"]`.
  pub command: Vec<String>,
  /// Source workspace the compiler runs in.
  pub workspace: PathBuf,
  /// Cargo target directory; artifacts land under it.
  pub target_dir: PathBuf,
  /// Extra arguments appended after the generated ones.
  pub args: Vec<String>,
  pub timeout: Option<Duration>,
}

/// How the binding generator is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinderSettings {
  pub command: Vec<String>,
  /// Target environment passed as `--target`.
  pub env: String,
  /// Suffix of the generated module file name (`<out_name><suffix>.wasm`).
  pub module_suffix: String,
  /// Emit TypeScript declarations alongside the glue code.
  pub typescript: bool,
  pub timeout: Option<Duration>,
}

/// Fully resolved configuration passed into the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
  /// Directory holding the configuration file.
  pub root: PathBuf,
  /// Parent of every per-target staging directory.
  pub staging_root: PathBuf,
  pub strategy: PublishStrategy,
  pub compiler: CompilerSettings,
  pub binder: BinderSettings,
  pub targets: Vec<BuildTarget>,
}

impl PipelineConfig {
  /// Staging directory for `target`.
  pub fn staging_dir(&self, target: &BuildTarget) -> PathBuf {
    self.staging_root.join(&target.name)
  }

  pub fn target(&self, name: &str) -> Result<&BuildTarget, ConfigError> {
    self
      .targets
      .iter()
      .find(|t| t.name == name)
      .ok_or_else(|| ConfigError::UnknownTarget {
        name: name.to_string(),
        available: self.target_names().join(", "),
      })
  }

  pub fn target_names(&self) -> Vec<&str> {
    self.targets.iter().map(|t| t.name.as_str()).collect()
  }

  /// Parse configuration text, resolving relative paths against `root`.
  pub fn from_toml(content: &str, root: &Path, source: &Path) -> Result<Self, ConfigError> {
    let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::Parse {
      path: source.to_path_buf(),
      source: e,
    })?;
    Self::resolve(file, root)
  }

  fn resolve(file: ConfigFile, root: &Path) -> Result<Self, ConfigError> {
    let resolve = |p: &str| normalize(&root.join(p));

    if file.compiler.command.is_empty() {
      return Err(ConfigError::EmptyCommand { tool: "compiler" });
    }
    if file.binder.command.is_empty() {
      return Err(ConfigError::EmptyCommand { tool: "binder" });
    }
    if file.targets.is_empty() {
      return Err(ConfigError::NoTargets);
    }

    let workspace = resolve(&file.workspace);
    let staging_root = resolve(&file.staging_root);

    let compiler = CompilerSettings {
      command: file.compiler.command,
      target_dir: file
        .compiler
        .target_dir
        .as_deref()
        .map(resolve)
        .unwrap_or_else(|| workspace.join("target")),
      workspace,
      args: file.compiler.args,
      timeout: file.compiler.timeout_secs.map(Duration::from_secs),
    };

    let binder = BinderSettings {
      command: file.binder.command,
      env: file.binder.env,
      module_suffix: file.binder.module_suffix,
      typescript: file.binder.typescript,
      timeout: file.binder.timeout_secs.map(Duration::from_secs),
    };

    let mut seen = HashSet::new();
    let mut targets = Vec::with_capacity(file.targets.len());
    for section in file.targets {
      if !is_valid_target_name(&section.name) {
        return Err(ConfigError::InvalidTargetName(section.name));
      }
      if !seen.insert(section.name.clone()) {
        return Err(ConfigError::DuplicateTarget(section.name));
      }

      let static_dir = section
        .static_dir
        .as_deref()
        .or(file.static_dir.as_deref())
        .map(resolve)
        .ok_or_else(|| ConfigError::MissingPath {
          target: section.name.clone(),
          field: "static_dir",
        })?;
      let publish_dir = section
        .publish_dir
        .as_deref()
        .or(file.publish_dir.as_deref())
        .map(resolve)
        .ok_or_else(|| ConfigError::MissingPath {
          target: section.name.clone(),
          field: "publish_dir",
        })?;

      let staging = staging_root.join(&section.name);
      if overlaps(&staging_root, &publish_dir) {
        return Err(ConfigError::StagingOverlapsPublish {
          target: section.name,
          staging: staging_root,
          published: publish_dir,
        });
      }
      if overlaps(&staging, &static_dir) {
        return Err(ConfigError::StagingOverlapsStatic {
          target: section.name,
          staging,
          assets: static_dir,
        });
      }

      targets.push(BuildTarget {
        package: section.package.unwrap_or_else(|| section.name.clone()),
        out_name: section.out_name.unwrap_or_else(|| section.name.clone()),
        name: section.name,
        platform: section.platform,
        static_dir,
        publish_dir,
      });
    }

    Ok(Self {
      root: root.to_path_buf(),
      staging_root,
      strategy: file.strategy,
      compiler,
      binder,
      targets,
    })
  }
}

/// Walk upward from `start` to find `wasmpub.toml`.
pub fn find_config(start: &Path) -> Result<PathBuf, ConfigError> {
  let mut dir = dunce::canonicalize(start).map_err(|e| ConfigError::Read {
    path: start.to_path_buf(),
    source: e,
  })?;
  loop {
    let candidate = dir.join(CONFIG_FILENAME);
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      return Err(ConfigError::NotFound {
        start: start.to_path_buf(),
      });
    }
  }
}

/// Load and validate the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
  let path = dunce::canonicalize(path).map_err(|e| ConfigError::Read {
    path: path.to_path_buf(),
    source: e,
  })?;
  let content = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
    path: path.clone(),
    source: e,
  })?;
  let root = path.parent().unwrap_or(Path::new("/"));
  debug!(path = ?path, "loading configuration");
  PipelineConfig::from_toml(&content, root, &path)
}

/// Lexically resolve `.` and `..` so overlap checks compare like with like.
fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        out.pop();
      }
      other => out.push(other.as_os_str()),
    }
  }
  out
}

fn overlaps(a: &Path, b: &Path) -> bool {
  a.starts_with(b) || b.starts_with(a)
}
