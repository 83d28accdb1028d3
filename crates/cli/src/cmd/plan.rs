//! Implementation of the `wasmpub plan` command.
//!
//! Shows the exact command lines and paths a build would use. Nothing is
//! run and nothing on disk changes.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use wasmpub_lib::bindgen::{bindgen_invocation, expected_outputs};
use wasmpub_lib::compile::{artifact_path, compiler_invocation};
use wasmpub_lib::config::PipelineConfig;
use wasmpub_lib::publish::{PublishStrategy, lock_path_for};
use wasmpub_lib::target::BuildTarget;

use super::{load, select_targets};
use crate::output::{OutputFormat, print_info, print_json, print_stat};

#[derive(Debug, Serialize)]
struct TargetPlan {
  target: String,
  staging_dir: PathBuf,
  compile: String,
  artifact: PathBuf,
  bind: String,
  module: PathBuf,
  glue: PathBuf,
  static_dir: PathBuf,
  publish_dir: PathBuf,
  lock_file: PathBuf,
  strategy: PublishStrategy,
}

fn plan_target(config: &PipelineConfig, target: &BuildTarget) -> TargetPlan {
  let staging = config.staging_dir(target);
  let artifact = artifact_path(target, &config.compiler.target_dir);
  let outputs = expected_outputs(target, &config.binder, &staging);

  TargetPlan {
    target: target.name.clone(),
    compile: compiler_invocation(target, &config.compiler).to_string(),
    bind: bindgen_invocation(&artifact, target, &config.binder, &staging).to_string(),
    staging_dir: staging,
    artifact,
    module: outputs.module,
    glue: outputs.glue,
    static_dir: target.static_dir.clone(),
    publish_dir: target.publish_dir.clone(),
    lock_file: lock_path_for(&config.staging_root, &target.publish_dir),
    strategy: config.strategy,
  }
}

pub fn cmd_plan(config: Option<&Path>, names: &[String], output: OutputFormat) -> Result<()> {
  let config = load(config)?;
  let plans: Vec<TargetPlan> = select_targets(&config, names, true)?
    .into_iter()
    .map(|target| plan_target(&config, target))
    .collect();

  if output.is_json() {
    return print_json(&plans);
  }

  for (i, plan) in plans.iter().enumerate() {
    if i > 0 {
      println!();
    }
    print_info(&plan.target);
    print_stat("Staging", &plan.staging_dir.display().to_string());
    print_stat("Compile", &plan.compile);
    print_stat("Artifact", &plan.artifact.display().to_string());
    print_stat("Bind", &plan.bind);
    print_stat("Static assets", &plan.static_dir.display().to_string());
    print_stat("Publish to", &plan.publish_dir.display().to_string());
    print_stat(
      "Strategy",
      match plan.strategy {
        PublishStrategy::Swap => "swap",
        PublishStrategy::InPlace => "in-place",
      },
    );
  }

  Ok(())
}
