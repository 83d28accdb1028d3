//! Build targets: one entry per client variant.

use std::path::PathBuf;

use serde::Serialize;

/// One client variant, fully resolved from configuration.
///
/// Every target goes through the same pipeline; only these fields differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
  /// Variant identifier, also the staging directory name.
  pub name: String,
  /// Cargo package compiled for this variant.
  pub package: String,
  /// Base name of the generated module and glue files.
  pub out_name: String,
  /// Compiler target triple.
  pub platform: String,
  /// Static assets merged into the staging directory.
  pub static_dir: PathBuf,
  /// The published asset set this variant replaces.
  pub publish_dir: PathBuf,
}

impl BuildTarget {
  /// File name of the compiled artifact: cargo replaces `-` with `_`.
  pub fn artifact_file_name(&self) -> String {
    format!("{}.wasm", self.package.replace('-', "_"))
  }
}

/// Whether `name` can be used as a single directory component.
pub fn is_valid_target_name(name: &str) -> bool {
  !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\']) && !name.contains('\0')
}
