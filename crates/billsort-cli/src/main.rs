//! CLI application for classifying and archiving bill PDFs.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{accounts, config, explain, sort, text};

/// Environment variable that turns off colored output.
const DISABLE_COLOR_ENV: &str = "CLASSIFY_BILLS_DISABLE_COLOR";

/// Environment variable holding a tracing filter that overrides -v/-e.
const LOG_ENV: &str = "BILLSORT_LOG";

/// billsort - Recognize bill PDFs and file them into a dated archive
#[derive(Parser)]
#[command(name = "billsort")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the settings file
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify bills and move them into the archive
    Sort(sort::SortArgs),

    /// Show how every account judges a single file
    Explain(explain::ExplainArgs),

    /// Print the text extracted from a file
    Text(text::TextArgs),

    /// Inspect and convert account configurations
    Accounts(accounts::AccountsArgs),

    /// Manage settings
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let color = std::env::var_os(DISABLE_COLOR_ENV).is_none();
    if !color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let only_errors = matches!(&cli.command, Commands::Sort(args) if args.only_errors);
    let level = if only_errors {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
    });

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let settings_path = cli.settings.as_deref();

    match cli.command {
        Commands::Sort(args) => sort::run(args, settings_path),
        Commands::Explain(args) => explain::run(args, settings_path),
        Commands::Text(args) => text::run(args, settings_path),
        Commands::Accounts(args) => accounts::run(args, settings_path),
        Commands::Config(args) => config::run(args, settings_path),
    }
}
