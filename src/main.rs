use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tailf::app::{self, config, FollowConfig};
use tailf::group::ProfileTable;
use tailf::interrupt::{self, CancelToken};
use tailf::render::{LineRenderer, SyntectRenderer};

/// Language value meaning "guess from content"
const GUESSING: &str = "guessing";

/// tail -f for humans
#[derive(Parser)]
#[command(name = "tailf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level for the log file (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow a file as it grows
    Follow(FollowArgs),
    /// List language identifiers matching a regular expression
    Languages {
        /// Pattern matched against the start of each identifier
        pattern: String,
    },
}

#[derive(Args)]
struct FollowArgs {
    /// File to follow
    file: PathBuf,

    /// Separate each event with a line
    #[arg(short, long)]
    separator: bool,

    /// Indent output (reformats SQL)
    #[arg(short, long)]
    indent: bool,

    /// Number output
    #[arg(short, long)]
    number: bool,

    /// Mark duplicate lines
    #[arg(short = 'd', long)]
    show_duplicates: bool,

    /// Language for syntax colouring [default: guessing]
    #[arg(short, long, env = "TAILF_LANG")]
    lang: Option<String>,

    /// Group events by time; don't if 0
    #[arg(short, long, value_name = "SECONDS", env = "TAILF_GROUPING",
          default_value_t = config::default_grouping_secs())]
    grouping: u64,

    /// Milliseconds between checks for new data
    #[arg(long, value_name = "MS", env = "TAILF_POLL_INTERVAL_MS",
          default_value_t = config::default_poll_interval_ms())]
    poll_interval: u64,
}

impl FollowArgs {
    fn into_config(self) -> FollowConfig {
        FollowConfig {
            path: self.file,
            language: self.lang.filter(|lang| lang != GUESSING),
            grouping: Duration::from_secs(self.grouping),
            poll_interval: Duration::from_millis(self.poll_interval),
            separator: self.separator,
            indent: self.indent,
            number: self.number,
            show_duplicates: self.show_duplicates,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let renderer = SyntectRenderer::new()?;

    match cli.command {
        Commands::Languages { pattern } => {
            println!("{}", app::languages(&renderer, &pattern)?);
            Ok(())
        }
        Commands::Follow(args) => run_follow(args.into_config(), &renderer),
    }
}

fn run_follow(config: FollowConfig, renderer: &dyn LineRenderer) -> Result<()> {
    let profiles = ProfileTable::builtin()?;

    let cancel = CancelToken::new();
    interrupt::install(&cancel)?;

    match app::follow(&config, renderer, &profiles, cancel) {
        // Reader of a pipe went away, e.g. `tailf follow x.log | head`
        Err(e) if is_broken_pipe(&e) => {
            info!("Output closed");
            Ok(())
        }
        result => result,
    }
}

fn is_broken_pipe(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|e| e.kind() == io::ErrorKind::BrokenPipe)
}

fn init_logging(level: &str) -> Result<()> {
    let log_dir = directories::ProjectDirs::from("", "", "tailf")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("tailf"));

    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("tailf.log"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    info!("tailf {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}
