//! gdbind command-line tool
//!
//! Validates class database exports and shows how classes are bound,
//! without a running engine.

mod commands;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gdbind")]
#[command(about = "Class database tooling for gdbind", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Colored output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and synthesize a class database, then print a summary
    Check {
        /// Class database (JSON)
        database: PathBuf,
        /// Runtime options (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the ancestor chain and bound members of one class
    Inspect {
        /// Class database (JSON)
        database: PathBuf,
        /// Class name
        class: String,
        /// Runtime options (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Only list members declared by the class itself
        #[arg(long)]
        own: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let color = output::resolve_color_choice(cli.color.as_deref());

    match cli.command {
        Commands::Check { database, config } => {
            commands::check::execute(&database, config.as_deref(), color)
        }
        Commands::Inspect {
            database,
            class,
            config,
            own,
        } => commands::inspect::execute(&database, &class, config.as_deref(), own, color),
    }
}
