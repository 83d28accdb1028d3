//! Failed runs: the published directory keeps its previous content.

use wasmpub_lib::error::{BindingGenerationError, CompilationError};
use wasmpub_lib::pipeline::{PipelineError, RunState, Stage, run_pipeline, run_pipeline_with};
use wasmpub_lib::publish::PublishLock;

use super::common::{Project, hash, names};

/// Publish once so there is a live set to protect.
async fn published_project() -> Project {
  let project = Project::sdfbox();
  let config = project.config();
  run_pipeline(&config, &config.targets[0]).await.unwrap();
  project
}

#[tokio::test]
async fn compiler_failure_leaves_published_set_unchanged() {
  let project = published_project().await;
  let before = hash(&project.published());
  project.break_compiler("error: undefined symbol: sdf_eval");
  let config = project.config();

  let err = run_pipeline(&config, &config.targets[0]).await.unwrap_err();

  match &err {
    PipelineError::Compile(CompilationError::Failed { status, diagnostics, .. }) => {
      assert_eq!(status.code(), Some(1));
      assert!(diagnostics.contains("undefined symbol"));
    }
    other => panic!("unexpected error: {other}"),
  }
  assert!(err.to_string().starts_with("compile: "));
  assert!(err.published_untouched());
  assert_eq!(hash(&project.published()), before);
}

#[tokio::test]
async fn silent_binder_fails_before_assets_are_merged() {
  let project = published_project().await;
  let before = hash(&project.published());
  project.silence_binder();
  let config = project.config();
  let mut states = Vec::new();

  let err = run_pipeline_with(&config, &config.targets[0], |s| states.push(s.clone()))
    .await
    .unwrap_err();

  assert!(matches!(err, PipelineError::Bind(BindingGenerationError::MissingOutput { .. })));
  assert!(!states.contains(&RunState::AssetsMerged));
  assert!(names(&project.staging()).is_empty());
  assert_eq!(hash(&project.published()), before);
}

#[tokio::test]
async fn missing_static_assets_leave_published_set_unchanged() {
  let project = published_project().await;
  let before = hash(&project.published());
  std::fs::remove_dir_all(project.path("client/static")).unwrap();
  let config = project.config();

  let err = run_pipeline(&config, &config.targets[0]).await.unwrap_err();

  assert_eq!(err.stage(), Stage::MergeAssets);
  assert_eq!(hash(&project.published()), before);
}

#[tokio::test]
async fn concurrent_run_is_refused() {
  let project = published_project().await;
  let config = project.config();
  let _held = PublishLock::acquire(&config.staging_root, &project.published(), "wasmpub build sdfbox-client").unwrap();

  let err = run_pipeline(&config, &config.targets[0]).await.unwrap_err();

  assert_eq!(err.stage(), Stage::Lock);
  assert!(err.to_string().contains("another process") || err.to_string().contains("is locked"));
}
