//! Implementation of the `wasmpub build` command.
//!
//! Runs the pipeline for each selected target in order and stops at the
//! first failure, so a later target is never published after an earlier one
//! failed.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use wasmpub_lib::pipeline::{PipelineReport, RunState, run_all};
use wasmpub_lib::target::BuildTarget;

use super::{load, select_targets};
use crate::output::{
  OutputFormat, format_duration, print_error, print_info, print_json, print_stat, print_step, print_success,
  print_warning,
};

pub fn cmd_build(config: Option<&Path>, names: &[String], all: bool, output: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let config = load(config)?;
  let targets = select_targets(&config, names, all)?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  let result = rt.block_on(run_all(&config, &targets, |target, state| {
    if !output.is_json() {
      print_state(target, state);
    }
  }));

  let reports = match result {
    Ok(reports) => reports,
    Err(err) => {
      if !output.is_json() {
        err.completed.iter().for_each(print_report);
      }
      let publish_dir = targets
        .iter()
        .find(|t| t.name == err.target)
        .map(|t| t.publish_dir.display().to_string())
        .unwrap_or_else(|| err.target.clone());
      if err.source.published_untouched() {
        print_warning(&format!("{} left unchanged", publish_dir));
      } else {
        print_warning(&format!("{} may be incomplete", publish_dir));
      }
      return Err(err.into());
    }
  };

  if output.is_json() {
    print_json(&reports)?;
    return Ok(());
  }

  reports.iter().for_each(print_report);
  if reports.len() > 1 {
    println!();
    print_success(&format!(
      "Published {} targets in {}",
      reports.len(),
      format_duration(start.elapsed())
    ));
  }

  Ok(())
}

fn print_state(target: &BuildTarget, state: &RunState) {
  match state {
    RunState::Start => print_info(&format!("Building {}", target.name)),
    RunState::Failed { stage, .. } => print_error(&format!("{} failed", stage)),
    other => print_step(&other.to_string()),
  }
}

fn print_report(report: &PipelineReport) {
  println!();
  print_success(&format!("Published {}", report.target));
  print_stat("Directory", &report.published_dir.display().to_string());
  print_stat("Files", &report.publish.files.len().to_string());
  if !report.assets.overwritten.is_empty() {
    print_stat("Overwritten by static assets", &report.assets.overwritten.join(", "));
  }
  print_stat("Hash", report.publish.content_hash.short());
  print_stat("Duration", &format_duration(Duration::from_millis(report.duration_ms)));
}
