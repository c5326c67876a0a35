//! Accounts command - inspect and convert account configurations.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use tracing::warn;

use billsort_core::models::account::AccountConfig;
use billsort_core::store::{read_legacy, record_file_name, write_account};

use super::{load_accounts, load_settings, resolve_accounts_dir, CONFIG_DIR_ENV};

/// Arguments for the accounts command.
#[derive(Args)]
pub struct AccountsArgs {
    #[command(subcommand)]
    command: AccountsCommand,
}

#[derive(Subcommand)]
enum AccountsCommand {
    /// List loaded accounts in the order they are tried
    List {
        /// Directory holding the account configuration files
        #[arg(short = 'c', long, env = CONFIG_DIR_ENV, value_name = "DIR")]
        config_dir: Option<PathBuf>,
    },

    /// Convert a legacy JSON configuration into XML records
    Convert(ConvertArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Legacy JSON configuration file
    input: PathBuf,

    /// Directory to write the XML records to
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Overwrite existing records
    #[arg(long)]
    force: bool,
}

pub fn run(args: AccountsArgs, settings_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        AccountsCommand::List { config_dir } => list_accounts(config_dir, settings_path),
        AccountsCommand::Convert(convert_args) => convert_accounts(convert_args),
    }
}

fn list_accounts(config_dir: Option<PathBuf>, settings_path: Option<&Path>) -> anyhow::Result<()> {
    let settings = load_settings(settings_path)?;
    let dir = resolve_accounts_dir(config_dir, &settings);
    let loaded = load_accounts(&dir)?;

    println!("Accounts in {}:", dir.display());
    for (index, account) in loaded.accounts.iter().enumerate() {
        println!(
            "  {:>3}. {} {}",
            index + 1,
            style(account.account_name()).bold(),
            style(describe(account)).dim()
        );
    }

    if !loaded.rejected.is_empty() {
        println!();
        println!("{}", style("Rejected files:").red());
        for rejected in &loaded.rejected {
            println!("  - {}: {}", rejected.path.display(), rejected.error);
        }
    }

    Ok(())
}

fn describe(account: &AccountConfig) -> String {
    let rule = account.date_rule();
    let mut parts = vec![
        format!("{} pattern(s)", account.match_patterns().len()),
        format!("date '{}'", rule.format),
    ];
    if rule.year_pattern.is_some() {
        parts.push("year pattern".to_string());
    }
    if rule.adjust_month_back {
        parts.push("month back".to_string());
    }
    if let Some(template) = account.output_template() {
        parts.push(format!("template '{template}'"));
    }
    format!("({})", parts.join(", "))
}

fn convert_accounts(args: ConvertArgs) -> anyhow::Result<()> {
    let specs = read_legacy(&args.input)?;
    if specs.is_empty() {
        anyhow::bail!("No accounts found in {}", args.input.display());
    }

    fs::create_dir_all(&args.output)?;

    let mut written = 0;
    for spec in specs {
        // Reject what the store would reject on load.
        if let Err(e) = AccountConfig::new(spec.clone()) {
            warn!("skipping account '{}': {}", spec.account_name, e);
            continue;
        }

        let path = args.output.join(record_file_name(&spec.account_name));
        if path.exists() && !args.force {
            warn!(
                "{} already exists, skipping (use --force to overwrite)",
                path.display()
            );
            continue;
        }

        write_account(&spec, &path)?;
        println!("{} Wrote {}", style("✓").green(), path.display());
        written += 1;
    }

    println!("Converted {written} account(s) into {}", args.output.display());
    Ok(())
}
