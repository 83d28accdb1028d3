mod build;
mod clean;
mod list;
mod plan;

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use list::cmd_list;
pub use plan::cmd_plan;

use std::path::Path;

use anyhow::{Result, bail};
use tracing::debug;

use wasmpub_lib::config::{PipelineConfig, find_config, load_config};
use wasmpub_lib::target::BuildTarget;

/// Load the configuration named by `--config`, or the nearest `wasmpub.toml`.
fn load(config: Option<&Path>) -> Result<PipelineConfig> {
  let path = match config {
    Some(path) => path.to_path_buf(),
    None => find_config(&std::env::current_dir()?)?,
  };
  debug!(config = ?path, "using configuration");
  Ok(load_config(&path)?)
}

/// Resolve target names, keeping the order given.
///
/// No names means every target when `default_all` is set, otherwise the
/// single configured target.
fn select_targets<'a>(config: &'a PipelineConfig, names: &[String], default_all: bool) -> Result<Vec<&'a BuildTarget>> {
  if !names.is_empty() {
    return Ok(names.iter().map(|name| config.target(name)).collect::<Result<Vec<_>, _>>()?);
  }
  if default_all || config.targets.len() == 1 {
    return Ok(config.targets.iter().collect());
  }
  bail!(
    "{} targets configured ({}); name the ones to build or pass --all",
    config.targets.len(),
    config.target_names().join(", ")
  )
}
