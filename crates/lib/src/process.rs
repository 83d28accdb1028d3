//! Running external tools.
//!
//! The compiler and binding generator are both invoked through
//! [`run_tool`]: the child inherits the caller's environment, its output is
//! captured so diagnostics can be reported verbatim, and the pipeline waits
//! for it to exit. An optional timeout kills the child when it expires.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

/// A fully resolved command line for an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
  pub program: String,
  pub args: Vec<OsString>,
  pub cwd: Option<PathBuf>,
}

impl ToolInvocation {
  /// Build an invocation from a configured command (`["cargo", "+nightly"]`)
  /// followed by per-call arguments.
  pub fn new(command: &[String]) -> Self {
    let (program, leading) = command.split_first().map(|(p, rest)| (p.clone(), rest)).unwrap_or_default();
    Self {
      program,
      args: leading.iter().map(OsString::from).collect(),
      cwd: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: &Path) -> Self {
    self.cwd = Some(dir.to_path_buf());
    self
  }
}

impl fmt::Display for ToolInvocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg.to_string_lossy())?;
    }
    Ok(())
  }
}

/// Captured result of a tool that ran to completion.
#[derive(Debug, Clone)]
pub struct ToolOutput {
  pub status: ExitStatus,
  pub stdout: String,
  pub stderr: String,
}

impl ToolOutput {
  pub fn success(&self) -> bool {
    self.status.success()
  }

  /// Everything the tool printed, stderr first, unmodified.
  pub fn diagnostics(&self) -> String {
    match (self.stderr.is_empty(), self.stdout.is_empty()) {
      (false, false) => format!("{}\n{}", self.stderr.trim_end(), self.stdout.trim_end()),
      (false, true) => self.stderr.trim_end().to_string(),
      (true, false) => self.stdout.trim_end().to_string(),
      (true, true) => String::new(),
    }
  }
}

#[derive(Debug)]
pub enum ToolError {
  /// The program could not be started.
  Spawn(io::Error),
  /// The program did not exit within the allotted time and was killed.
  TimedOut(Duration),
}

/// Run `invocation` and wait for it to exit.
///
/// A non-zero exit is not an error here; callers inspect
/// [`ToolOutput::status`] and map it into their own error type.
pub async fn run_tool(invocation: &ToolInvocation, timeout: Option<Duration>) -> Result<ToolOutput, ToolError> {
  info!(cmd = %invocation, "running tool");

  let mut command = Command::new(&invocation.program);
  command
    .args(&invocation.args)
    .stdin(Stdio::null())
    .kill_on_drop(true);
  if let Some(cwd) = &invocation.cwd {
    command.current_dir(cwd);
  }

  debug!(program = %invocation.program, cwd = ?invocation.cwd, "spawning process");

  let output = match timeout {
    Some(limit) => tokio::time::timeout(limit, command.output())
      .await
      .map_err(|_| ToolError::TimedOut(limit))?,
    None => command.output().await,
  }
  .map_err(ToolError::Spawn)?;

  let result = ToolOutput {
    status: output.status,
    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
  };

  if !result.success() {
    debug!(status = %result.status, stderr = %result.stderr, "tool failed");
  } else if !result.stdout.is_empty() {
    debug!(stdout = %result.stdout, "tool output");
  }

  Ok(result)
}
