//! Shared helpers for pipeline integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wasmpub_lib::config::{PipelineConfig, load_config};
use wasmpub_lib::util::hash::{ContentHash, hash_directory};

/// Compiler stand-in: honours `--target`, `--package` and `--target-dir` and
/// writes the workspace's `src/lib.rs` as the artifact.
const FAKE_CARGO: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --target) platform="$2"; shift ;;
    --package) package="$2"; shift ;;
    --target-dir) target_dir="$2"; shift ;;
  esac
  shift
done
file=$(echo "$package" | tr '-' '_')
mkdir -p "$target_dir/$platform/release"
cp src/lib.rs "$target_dir/$platform/release/$file.wasm"
"#;

/// Binder stand-in: copies the artifact to `<out-name>.wasm` and writes glue.
const FAKE_BINDGEN: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --out-dir) out="$2"; shift ;;
    --out-name) name="$2"; shift ;;
    --target) shift ;;
    --no-typescript) ;;
    *) artifact="$1" ;;
  esac
  shift
done
cp "$artifact" "$out/$name.wasm"
printf 'import init from "./%s.wasm";\n' "$name" > "$out/$name.js"
"#;

/// A project directory with a config file, fake tools, sources and assets.
pub struct Project {
  _temp: TempDir,
  root: PathBuf,
}

impl Project {
  /// The sdfbox layout: one client target, two static assets.
  pub fn sdfbox() -> Self {
    let temp = TempDir::new().unwrap();
    let root = dunce::canonicalize(temp.path()).unwrap();
    let project = Self { _temp: temp, root };
    project.write_file("tools/cargo.sh", FAKE_CARGO);
    project.write_file("tools/bindgen.sh", FAKE_BINDGEN);
    project.write_file("src/lib.rs", "wasm-bytes-v1");
    project.write_file("client/static/a.png", "png");
    project.write_file("client/static/b.json", "{}");
    project.write_config("");
    project
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.root().join(relative)
  }

  pub fn write_file(&self, relative: &str, content: &str) {
    let path = self.path(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
  }

  /// Write `wasmpub.toml`; `extra` is appended to the top-level table.
  pub fn write_config(&self, extra: &str) {
    let tools = self.path("tools");
    self.write_file(
      "wasmpub.toml",
      &format!(
        r#"static_dir = "client/static"
publish_dir = "server/assets"
{extra}

[compiler]
command = ["/bin/sh", "{cargo}"]

[binder]
command = ["/bin/sh", "{bindgen}"]
module_suffix = ""

[[target]]
name = "sdfbox-client"
package = "client"
"#,
        cargo = tools.join("cargo.sh").display(),
        bindgen = tools.join("bindgen.sh").display(),
      ),
    );
  }

  /// Replace the compiler stand-in with one that fails.
  pub fn break_compiler(&self, message: &str) {
    self.write_file("tools/cargo.sh", &format!("#!/bin/sh\necho '{}' >&2\nexit 1\n", message));
  }

  /// Replace the binder stand-in with one that succeeds without output.
  pub fn silence_binder(&self) {
    self.write_file("tools/bindgen.sh", "#!/bin/sh\nexit 0\n");
  }

  pub fn config(&self) -> PipelineConfig {
    load_config(&self.path("wasmpub.toml")).unwrap()
  }

  pub fn staging(&self) -> PathBuf {
    self.path("build/sdfbox-client")
  }

  pub fn published(&self) -> PathBuf {
    self.path("server/assets")
  }
}

pub fn hash(dir: &Path) -> ContentHash {
  hash_directory(dir).unwrap()
}

/// Names directly inside `dir`, sorted.
pub fn names(dir: &Path) -> Vec<String> {
  let mut names: Vec<_> = fs::read_dir(dir)
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  names.sort();
  names
}
