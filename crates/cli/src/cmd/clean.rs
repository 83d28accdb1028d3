//! Implementation of the `wasmpub clean` command.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use wasmpub_lib::staging::remove_staging;

use super::{load, select_targets};
use crate::output::{OutputFormat, print_info, print_json, print_success};

#[derive(Debug, Serialize)]
struct CleanResult {
  target: String,
  removed: bool,
}

pub fn cmd_clean(config: Option<&Path>, names: &[String], output: OutputFormat) -> Result<()> {
  let config = load(config)?;

  let mut results = Vec::new();
  for target in select_targets(&config, names, true)? {
    let staging = config.staging_dir(target);
    let removed = remove_staging(&staging)?;
    if !output.is_json() {
      if removed {
        print_success(&format!("Removed {}", staging.display()));
      } else {
        print_info(&format!("Nothing to clean for {}", target.name));
      }
    }
    results.push(CleanResult {
      target: target.name.clone(),
      removed,
    });
  }

  if output.is_json() {
    print_json(&results)?;
  }

  Ok(())
}
