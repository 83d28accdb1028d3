//! Successful runs: what ends up in the published directory.

use std::fs;

use wasmpub_lib::config::find_config;
use wasmpub_lib::pipeline::run_pipeline;
use wasmpub_lib::publish::PublishMethod;

use super::common::{Project, hash, names};

#[tokio::test]
async fn sdfbox_client_publishes_exactly_four_files() {
  let project = Project::sdfbox();
  let config = project.config();

  let report = run_pipeline(&config, config.target("sdfbox-client").unwrap())
    .await
    .unwrap();

  let expected = vec!["a.png", "b.json", "sdfbox-client.js", "sdfbox-client.wasm"];
  assert_eq!(names(&project.published()), expected);
  assert_eq!(report.publish.files, expected);
  assert_eq!(
    fs::read_to_string(project.published().join("sdfbox-client.wasm")).unwrap(),
    "wasm-bytes-v1"
  );
}

#[tokio::test]
async fn published_set_equals_staging_set() {
  let project = Project::sdfbox();
  let config = project.config();

  let report = run_pipeline(&config, &config.targets[0]).await.unwrap();

  assert_eq!(hash(&project.published()), hash(&project.staging()));
  assert_eq!(report.publish.content_hash, hash(&project.staging()));
}

#[tokio::test]
async fn leftover_staging_file_does_not_reach_published_set() {
  let project = Project::sdfbox();
  project.write_file("build/sdfbox-client/old.wasm", "stale");
  let config = project.config();

  run_pipeline(&config, &config.targets[0]).await.unwrap();

  assert!(!project.staging().join("old.wasm").exists());
  assert!(!project.published().join("old.wasm").exists());
}

#[tokio::test]
async fn stale_published_files_are_removed() {
  let project = Project::sdfbox();
  project.write_file("server/assets/previous.wasm", "old build");
  project.write_file("server/assets/fonts/old.ttf", "old font");
  let config = project.config();

  run_pipeline(&config, &config.targets[0]).await.unwrap();

  assert_eq!(
    names(&project.published()),
    vec!["a.png", "b.json", "sdfbox-client.js", "sdfbox-client.wasm"]
  );
}

#[tokio::test]
async fn rerun_without_changes_is_idempotent() {
  let project = Project::sdfbox();
  let config = project.config();

  run_pipeline(&config, &config.targets[0]).await.unwrap();
  let staging_first = hash(&project.staging());
  let published_first = hash(&project.published());

  run_pipeline(&config, &config.targets[0]).await.unwrap();

  assert_eq!(hash(&project.staging()), staging_first);
  assert_eq!(hash(&project.published()), published_first);
}

#[tokio::test]
async fn source_change_reaches_published_set() {
  let project = Project::sdfbox();
  let config = project.config();
  run_pipeline(&config, &config.targets[0]).await.unwrap();

  project.write_file("src/lib.rs", "wasm-bytes-v2");
  run_pipeline(&config, &config.targets[0]).await.unwrap();

  assert_eq!(
    fs::read_to_string(project.published().join("sdfbox-client.wasm")).unwrap(),
    "wasm-bytes-v2"
  );
}

#[tokio::test]
async fn in_place_strategy_publishes_same_set() {
  let project = Project::sdfbox();
  project.write_config(r#"strategy = "in-place""#);
  project.write_file("server/assets/previous.wasm", "old build");
  let config = project.config();

  let report = run_pipeline(&config, &config.targets[0]).await.unwrap();

  assert_eq!(report.publish.method, PublishMethod::InPlace);
  assert_eq!(hash(&project.published()), hash(&project.staging()));
}

#[tokio::test]
async fn config_is_found_from_a_nested_directory() {
  let project = Project::sdfbox();
  project.write_file("client/src/main.rs", "fn main() {}");

  let found = find_config(&project.path("client/src")).unwrap();

  assert_eq!(found, project.path("wasmpub.toml"));
}

#[tokio::test]
async fn symlinked_publish_dir_keeps_link_and_updates_target() {
  let project = Project::sdfbox();
  let current = project.path("server/releases/current");
  fs::create_dir_all(&current).unwrap();
  fs::write(current.join("old.wasm"), "previous build").unwrap();
  std::os::unix::fs::symlink(&current, project.published()).unwrap();
  let config = project.config();

  run_pipeline(&config, &config.targets[0]).await.unwrap();

  assert!(fs::symlink_metadata(project.published()).unwrap().file_type().is_symlink());
  assert_eq!(
    names(&current),
    vec!["a.png", "b.json", "sdfbox-client.js", "sdfbox-client.wasm"]
  );
  assert_eq!(names(&project.path("server/releases")), vec!["current"]);
}
