use std::path::Path;

use anyhow::Result;

use super::load;
use crate::output::{OutputFormat, print_info, print_json, print_stat};

pub fn cmd_list(config: Option<&Path>, output: OutputFormat) -> Result<()> {
  let config = load(config)?;

  if output.is_json() {
    return print_json(&config.targets);
  }

  for (i, target) in config.targets.iter().enumerate() {
    if i > 0 {
      println!();
    }
    print_info(&target.name);
    print_stat("Package", &target.package);
    print_stat("Platform", &target.platform);
    print_stat("Static assets", &target.static_dir.display().to_string());
    print_stat("Publish to", &target.publish_dir.display().to_string());
  }

  Ok(())
}
