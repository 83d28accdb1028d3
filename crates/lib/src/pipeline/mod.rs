//! Pipeline orchestration.
//!
//! One run builds one [`BuildTarget`] and publishes it:
//!
//! 1. Lock the published directory
//! 2. Prepare an empty staging directory
//! 3. Compile the artifact
//! 4. Generate bindings into staging
//! 5. Merge static assets into staging
//! 6. Publish staging over the published directory
//!
//! Each step runs only if the previous one succeeded. The first failure ends
//! the run; nothing is retried and nothing is rolled back. Because the
//! publish step comes last, a failure anywhere before it leaves the
//! published directory exactly as it was.

mod types;

pub use types::{PipelineError, PipelineReport, RunAllError, RunState, Stage};

use std::time::Instant;

use tracing::{error, info};

use crate::assets::merge_assets;
use crate::bindgen::generate_bindings;
use crate::compile::compile_artifact;
use crate::config::PipelineConfig;
use crate::consts::APP_NAME;
use crate::publish::{PublishLock, publish};
use crate::staging::prepare_staging;
use crate::target::BuildTarget;

/// Build and publish `target`.
pub async fn run_pipeline(config: &PipelineConfig, target: &BuildTarget) -> Result<PipelineReport, PipelineError> {
  run_pipeline_with(config, target, |_| {}).await
}

/// Build and publish `target`, reporting every state the run passes through
/// to `on_state`, ending with [`RunState::Published`] or
/// [`RunState::Failed`].
pub async fn run_pipeline_with<F>(
  config: &PipelineConfig,
  target: &BuildTarget,
  mut on_state: F,
) -> Result<PipelineReport, PipelineError>
where
  F: FnMut(&RunState),
{
  info!(target = %target.name, published = ?target.publish_dir, "starting pipeline");
  let started = Instant::now();
  on_state(&RunState::Start);

  match run_stages(config, target, &mut on_state, started).await {
    Ok(report) => {
      on_state(&RunState::Published);
      info!(
        target = %target.name,
        files = report.publish.files.len(),
        duration_ms = report.duration_ms,
        "pipeline complete"
      );
      Ok(report)
    }
    Err(err) => {
      let stage = err.stage();
      error!(target = %target.name, stage = %stage, error = %err, "pipeline failed");
      on_state(&RunState::Failed {
        stage,
        reason: err.to_string(),
      });
      Err(err)
    }
  }
}

async fn run_stages<F>(
  config: &PipelineConfig,
  target: &BuildTarget,
  on_state: &mut F,
  started: Instant,
) -> Result<PipelineReport, PipelineError>
where
  F: FnMut(&RunState),
{
  // Held until the run ends, successful or not.
  let _lock = PublishLock::acquire(
    &config.staging_root,
    &target.publish_dir,
    &format!("{} build {}", APP_NAME, target.name),
  )?;

  let staging = config.staging_dir(target);
  prepare_staging(&staging).map_err(PipelineError::Prepare)?;
  on_state(&RunState::Prepared);

  let artifact = compile_artifact(target, &config.compiler).await?;
  on_state(&RunState::Compiled);

  let bindings = generate_bindings(&artifact, target, &config.binder, &staging).await?;
  on_state(&RunState::Bound);

  let assets = merge_assets(&target.static_dir, &staging).map_err(PipelineError::MergeAssets)?;
  on_state(&RunState::AssetsMerged);

  let outcome = publish(&staging, &target.publish_dir, config.strategy)?;

  Ok(PipelineReport {
    target: target.name.clone(),
    staging_dir: staging,
    published_dir: target.publish_dir.clone(),
    artifact: artifact.path,
    bindings,
    assets,
    publish: outcome,
    duration_ms: started.elapsed().as_millis() as u64,
  })
}

/// Run the pipeline for each target in order, stopping at the first
/// failure. Every state of every run is passed to `on_state` with its
/// target.
pub async fn run_all<F>(
  config: &PipelineConfig,
  targets: &[&BuildTarget],
  mut on_state: F,
) -> Result<Vec<PipelineReport>, RunAllError>
where
  F: FnMut(&BuildTarget, &RunState),
{
  let mut completed = Vec::with_capacity(targets.len());
  for &target in targets {
    match run_pipeline_with(config, target, |state| on_state(target, state)).await {
      Ok(report) => completed.push(report),
      Err(source) => {
        return Err(RunAllError {
          target: target.name.clone(),
          completed,
          source,
        });
      }
    }
  }
  Ok(completed)
}
