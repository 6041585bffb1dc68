mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "roster-sync",
    about = "Reconcile the record store with the membership roster and the chat platform",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .roster-sync/)
    #[arg(long, global = true, env = "ROSTER_SYNC_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .roster-sync/ with a default config and an empty store
    Init,

    /// Load records from a YAML or JSON snapshot into the store
    Import {
        /// Snapshot file
        file: PathBuf,
    },

    /// Show record counts per table
    Status,

    /// Run a full sync against the roster
    Sync {
        /// Roster file (default: roster.path from config)
        #[arg(long)]
        roster: Option<PathBuf>,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Sync { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Import { file } => cmd::import::run(&root, &file, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Sync { roster } => cmd::sync::run(&root, roster.as_deref(), cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
