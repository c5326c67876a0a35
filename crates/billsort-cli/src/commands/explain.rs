//! Explain command - show how every account judges one file.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;

use billsort_core::classify::{Classifier, MatchOutcome};
use billsort_core::placement::place;

use super::{
    build_extractor, load_accounts, load_settings, resolve_accounts_dir, short_name, ExtractorArg,
    CONFIG_DIR_ENV,
};

/// Arguments for the explain command.
#[derive(Args)]
pub struct ExplainArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Directory holding the account configuration files
    #[arg(short = 'c', long, env = CONFIG_DIR_ENV, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Text extraction backend
    #[arg(long, value_enum)]
    extractor: Option<ExtractorArg>,

    /// Date the run is considered to happen on (YYYY-MM-DD)
    #[arg(long, hide = true)]
    run_date: Option<NaiveDate>,
}

pub fn run(args: ExplainArgs, settings_path: Option<&Path>) -> anyhow::Result<()> {
    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let settings = load_settings(settings_path)?;
    let accounts_dir = resolve_accounts_dir(args.config_dir.clone(), &settings);
    let loaded = load_accounts(&accounts_dir)?;
    let extractor = build_extractor(&settings, args.extractor)?;

    let text = extractor.extract_text(&args.input)?;
    let run_date = args.run_date.unwrap_or_else(|| Local::now().date_naive());
    let classifier = Classifier::new(loaded.accounts, run_date);
    let name = short_name(&args.input);

    println!("{}", style(&name).bold());

    let outcomes = classifier.explain(&text, &name);
    let matching = outcomes.iter().filter(|(_, outcome)| outcome.is_match()).count();

    let mut winner = None;
    for (account, outcome) in outcomes {
        let verdict = match &outcome {
            MatchOutcome::Matched(date) => style(format!("matched, bill date {date}")).green(),
            MatchOutcome::PatternMismatch { pattern } => {
                style(format!("pattern '{pattern}' not found")).dim()
            }
            MatchOutcome::DateNotFound => style("date string not found".to_string()).yellow(),
            MatchOutcome::DateUnparsable(err) => style(err.to_string()).red(),
        };
        println!("  {:<24} {}", account.account_name(), verdict);

        if winner.is_none() {
            if let MatchOutcome::Matched(date) = outcome {
                winner = Some((account, date));
            }
        }
    }

    println!();
    match winner {
        Some((account, date)) => {
            let placement = place(account, date, Path::new("<output>"))?;
            println!(
                "{} {} -> {}",
                style("✓").green(),
                account.account_name(),
                placement.path().display()
            );
            if matching > 1 {
                println!("  {matching} accounts match, the first one wins");
            }
        }
        None => println!("{} no account classifies this file", style("✗").red()),
    }

    Ok(())
}
