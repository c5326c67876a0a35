//! Config command - manage settings.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use billsort_core::models::config::BillsortConfig;

use super::default_settings_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current settings
    Show,

    /// Initialize a new settings file
    Init(InitArgs),

    /// Show settings file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for the settings file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, settings_path: Option<&Path>) -> anyhow::Result<()> {
    let path = settings_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_settings_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, path),
        ConfigCommand::Path => show_path(&path),
    }
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    let config = if path.exists() {
        BillsortConfig::from_file(path)?
    } else {
        eprintln!(
            "{} No settings file found, showing defaults.",
            style("ℹ").blue()
        );
        BillsortConfig::default()
    };

    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, default_path: PathBuf) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or(default_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Settings file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    BillsortConfig::default().save(&output_path)?;

    println!(
        "{} Created settings file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Settings file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'billsort config init' to create a settings file.");
    }

    Ok(())
}
