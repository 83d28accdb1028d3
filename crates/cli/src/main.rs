mod cmd;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_build, cmd_clean, cmd_list, cmd_plan};
use output::{OutputFormat, print_error};

/// wasmpub - build WebAssembly clients and publish them as static assets
#[derive(Parser)]
#[command(name = "wasmpub")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Path to wasmpub.toml (default: search upward from the current directory)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile, bind and publish one or more targets
  Build {
    /// Targets to build (default: the only configured target)
    targets: Vec<String>,

    /// Build every configured target, in order
    #[arg(long, conflicts_with = "targets")]
    all: bool,
  },

  /// Show the commands and paths a build would use, without running anything
  Plan {
    /// Targets to show (default: all)
    targets: Vec<String>,
  },

  /// List configured targets
  List,

  /// Remove staging directories (published directories are left alone)
  Clean {
    /// Targets to clean (default: all)
    targets: Vec<String>,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let config = cli.config.as_deref();
  let result = match cli.command {
    Commands::Build { targets, all } => cmd_build(config, &targets, all, cli.output),
    Commands::Plan { targets } => cmd_plan(config, &targets, cli.output),
    Commands::List => cmd_list(config, cli.output),
    Commands::Clean { targets } => cmd_clean(config, &targets, cli.output),
  };

  if let Err(err) = result {
    print_error(&err.to_string());
    std::process::exit(1);
  }
}
