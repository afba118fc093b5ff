mod artifacts;
mod commands;
mod core;
mod manifest;
mod patch;
mod release;
mod ui;
mod utils;

use clap::{Parser, Subcommand};
use core::context::Workspace;
use core::error::{BumpError, BumpResult, print_error};
use core::vcs::SystemGit;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Republish SpiderMonkey ESR security releases and bump the mozjs crates
#[derive(Parser)]
#[command(name = "sm-bump")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Config file (default: sm-bump.toml in the repository root)
  #[arg(long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Publish the latest ESR source release and bump crate versions (default)
  Bump {
    /// Stop after the existence check and print the plan
    #[arg(long)]
    dry_run: bool,
  },

  /// Show the latest upstream ESR release
  Latest {
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Replace the vendored source with an archive and apply local patches
  ApplyPatches {
    /// Path to the source archive (mozjs.tar.xz)
    archive: PathBuf,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(verbose: bool) {
  let level = if verbose {
    tracing::Level::DEBUG
  } else {
    tracing::Level::WARN
  };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let current_dir = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(BumpError::message(format!("Failed to get current directory: {}", e))),
  };

  let command = cli.command.unwrap_or(Commands::Bump { dry_run: false });
  let result = match command {
    Commands::Bump { dry_run } => {
      with_repository(&current_dir, cli.config.as_deref(), |ws, git| commands::run_bump(ws, git, dry_run))
    }
    Commands::Latest { json } => latest_config(&current_dir, cli.config.as_deref())
      .and_then(|config| commands::run_latest(&config, json)),
    Commands::ApplyPatches { archive } => with_repository(&current_dir, cli.config.as_deref(), |ws, git| {
      commands::run_apply_patches(ws, git, &archive)
    }),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

/// Resolve the repository and its config, then run `f`
fn with_repository<F>(start: &Path, config: Option<&Path>, f: F) -> BumpResult<()>
where
  F: FnOnce(&Workspace, &SystemGit) -> BumpResult<()>,
{
  let git = SystemGit::open(start)?;
  let root = git.work_tree().to_path_buf();
  let bump_config = core::config::BumpConfig::load(&root, config)?;
  let ws = Workspace::new(root, bump_config);
  tracing::debug!(root = %ws.root.display(), "workspace resolved");
  f(&ws, &git)
}

/// `latest` also works outside a repository
fn latest_config(start: &Path, config: Option<&Path>) -> BumpResult<core::config::BumpConfig> {
  let root = match SystemGit::open(start) {
    Ok(git) => git.work_tree().to_path_buf(),
    Err(_) => start.to_path_buf(),
  };
  core::config::BumpConfig::load(&root, config)
}

fn handle_error(err: BumpError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
