//! On-disk shape of `wasmpub.toml`.

use serde::Deserialize;

use crate::consts::{DEFAULT_BINDGEN_ENV, DEFAULT_MODULE_SUFFIX, DEFAULT_PLATFORM};
use crate::publish::PublishStrategy;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
  #[serde(default = "default_workspace")]
  pub workspace: String,
  pub static_dir: Option<String>,
  pub publish_dir: Option<String>,
  #[serde(default = "default_staging_root")]
  pub staging_root: String,
  #[serde(default)]
  pub strategy: PublishStrategy,
  #[serde(default)]
  pub compiler: CompilerSection,
  #[serde(default)]
  pub binder: BinderSection,
  #[serde(default, rename = "target")]
  pub targets: Vec<TargetSection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerSection {
  #[serde(default = "default_compiler_command")]
  pub command: Vec<String>,
  pub target_dir: Option<String>,
  #[serde(default)]
  pub args: Vec<String>,
  pub timeout_secs: Option<u64>,
}

impl Default for CompilerSection {
  fn default() -> Self {
    Self {
      command: default_compiler_command(),
      target_dir: None,
      args: Vec::new(),
      timeout_secs: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinderSection {
  #[serde(default = "default_binder_command")]
  pub command: Vec<String>,
  #[serde(default = "default_env")]
  pub env: String,
  #[serde(default = "default_module_suffix")]
  pub module_suffix: String,
  #[serde(default)]
  pub typescript: bool,
  pub timeout_secs: Option<u64>,
}

impl Default for BinderSection {
  fn default() -> Self {
    Self {
      command: default_binder_command(),
      env: default_env(),
      module_suffix: default_module_suffix(),
      typescript: false,
      timeout_secs: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSection {
  pub name: String,
  pub package: Option<String>,
  pub out_name: Option<String>,
  #[serde(default = "default_platform")]
  pub platform: String,
  pub static_dir: Option<String>,
  pub publish_dir: Option<String>,
}

fn default_workspace() -> String {
  ".".to_string()
}

fn default_staging_root() -> String {
  "build".to_string()
}

fn default_compiler_command() -> Vec<String> {
  vec!["cargo".to_string()]
}

fn default_binder_command() -> Vec<String> {
  vec!["wasm-bindgen".to_string()]
}

fn default_env() -> String {
  DEFAULT_BINDGEN_ENV.to_string()
}

fn default_module_suffix() -> String {
  DEFAULT_MODULE_SUFFIX.to_string()
}

fn default_platform() -> String {
  DEFAULT_PLATFORM.to_string()
}
