//! Test utilities for wasmpub-lib.
//!
//! Stand-ins for the compiler and binding generator are small shell
//! scripts run through `/bin/sh`, so they need no exec permission.

use std::path::Path;

/// Write `body` to `dir/name` and return a tool command line that runs it.
pub fn sh_tool(dir: &Path, name: &str, body: &str) -> Vec<String> {
  let script = dir.join(name);
  std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
  vec!["/bin/sh".to_string(), script.display().to_string()]
}

/// A compiler stand-in that writes `content` to `artifact` and exits 0.
pub fn fake_compiler(dir: &Path, artifact: &Path, content: &str) -> Vec<String> {
  let parent = artifact.parent().unwrap();
  sh_tool(
    dir,
    "fake-cargo.sh",
    &format!(
      "mkdir -p '{}'\nprintf '%s' '{}' > '{}'",
      parent.display(),
      content,
      artifact.display()
    ),
  )
}

/// A compiler stand-in that prints `message` on stderr and exits with `code`.
pub fn failing_tool(dir: &Path, message: &str, code: i32) -> Vec<String> {
  sh_tool(
    dir,
    "failing-tool.sh",
    &format!("echo '{}' >&2\nexit {}", message, code),
  )
}

/// A binding generator stand-in that honours `--out-dir`/`--out-name` and
/// writes `<name><suffix>.wasm` plus `<name>.js`.
pub fn fake_bindgen(dir: &Path, suffix: &str) -> Vec<String> {
  sh_tool(
    dir,
    "fake-bindgen.sh",
    &format!(
      r#"while [ $# -gt 0 ]; do
  case "$1" in
    --out-dir) out="$2"; shift ;;
    --out-name) name="$2"; shift ;;
  esac
  shift
done
printf 'module' > "$out/${{name}}{suffix}.wasm"
printf 'glue' > "$out/$name.js""#
    ),
  )
}
