mod app;
mod cache;
mod config;
mod endpoint;
mod page;
mod progress;
mod render;
mod scanner;

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "goal-progress")]
#[command(about = "Add tracking issue progress indicators to built goal pages")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/goal-progress/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Write logs to this file instead of stderr
  #[arg(long)]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Enrich HTML pages with progress indicators
  Pages {
    /// Pages to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[command(flatten)]
    site: SiteArgs,

    /// Overwrite each page
    #[arg(long, conflicts_with = "out_dir")]
    in_place: bool,

    /// Write pages into this directory, keeping their path within the site
    #[arg(long)]
    out_dir: Option<PathBuf>,
  },

  /// Print the indicator for tracking identifiers (period:org:repo:number)
  Status {
    #[arg(required = true)]
    ids: Vec<String>,

    #[command(flatten)]
    site: SiteArgs,
  },
}

#[derive(ClapArgs, Debug)]
struct SiteArgs {
  /// Built site directory to read api/<period>.json from
  #[arg(long)]
  site_dir: Option<PathBuf>,

  /// URL path the pages are served under
  #[arg(long, default_value = "/")]
  base: String,

  /// Fetch period documents from this origin (e.g. https://rust-lang.github.io)
  #[arg(long)]
  origin: Option<String>,
}

impl From<SiteArgs> for app::SiteOptions {
  fn from(args: SiteArgs) -> Self {
    Self {
      site_dir: args.site_dir,
      base: args.base,
      origin: args.origin,
    }
  }
}

fn init_logging(log_file: Option<&Path>) -> Result<WorkerGuard> {
  let filter =
    EnvFilter::try_from_env("GOAL_PROGRESS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

  let (writer, guard) = match log_file {
    Some(path) => {
      let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;
      let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
      tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
    }
    None => tracing_appender::non_blocking(std::io::stderr()),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(log_file.is_none())
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _guard = init_logging(args.log_file.as_deref())?;

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let app = app::App::new(config);

  match args.command {
    Command::Pages {
      files,
      site,
      in_place,
      out_dir,
    } => {
      let output = match (in_place, out_dir) {
        (true, _) => app::Output::InPlace,
        (false, Some(dir)) => app::Output::Dir(dir),
        (false, None) => app::Output::Stdout,
      };
      app.enrich_pages(&files, &site.into(), &output).await?;
    }
    Command::Status { ids, site } => {
      app.print_status(&ids, &site.into()).await?;
    }
  }

  Ok(())
}
