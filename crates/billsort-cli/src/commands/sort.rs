//! Sort command - classify bills and file them into the archive.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;
use tracing::{debug, error, warn};

use billsort_core::archive::{ArchiveOptions, Archiver, FileAction};
use billsort_core::classify::Classifier;
use billsort_core::pdf::{is_pdf, TextExtractor};
use billsort_core::placement::place;

use super::{
    build_extractor, load_accounts, load_settings, resolve_accounts_dir, resolve_output_dir,
    short_name, ExtractorArg, CONFIG_DIR_ENV, OUTPUT_DIR_ENV,
};

/// Arguments for the sort command.
#[derive(Args)]
pub struct SortArgs {
    /// PDF files, or directories holding PDF files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory holding the account configuration files
    #[arg(short = 'c', long, env = CONFIG_DIR_ENV, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Root of the bill archive
    #[arg(short = 'O', long, env = OUTPUT_DIR_ENV, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Perform actions (the default is a dry run)
    #[arg(short, long)]
    force: bool,

    /// Overwrite if the destination file exists
    #[arg(short = 'w', long)]
    overwrite: bool,

    /// Do not report files that cannot be read or classified
    #[arg(short, long)]
    ignore_errors: bool,

    /// Only show errors
    #[arg(short = 'e', long)]
    pub only_errors: bool,

    /// Text extraction backend
    #[arg(long, value_enum)]
    extractor: Option<ExtractorArg>,

    /// Write a CSV report of every document's outcome
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Date the run is considered to happen on (YYYY-MM-DD)
    #[arg(long, hide = true)]
    run_date: Option<NaiveDate>,
}

/// What happened to one document.
enum Outcome {
    Filed {
        account: String,
        bill_date: NaiveDate,
        action: FileAction,
    },
    ExtractionFailed(String),
    Unclassified,
    Failed {
        account: String,
        bill_date: NaiveDate,
        reason: String,
    },
}

/// Result of handling a single file.
struct SortResult {
    path: PathBuf,
    outcome: Outcome,
}

pub fn run(args: SortArgs, settings_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    if args.only_errors && (args.force || args.ignore_errors) {
        anyhow::bail!(
            "Conflicting options passed: --only-errors cannot be combined with \
             --force or --ignore-errors"
        );
    }

    let settings = load_settings(settings_path)?;

    let accounts_dir = resolve_accounts_dir(args.config_dir.clone(), &settings);
    let loaded = load_accounts(&accounts_dir)?;

    let files = collect_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No files to process");
    }

    let output_dir = resolve_output_dir(args.output_dir.clone(), &settings)?;
    let extractor = build_extractor(&settings, args.extractor)?;

    let run_date = args.run_date.unwrap_or_else(|| Local::now().date_naive());
    let classifier = Classifier::new(loaded.accounts, run_date);
    debug!(
        "{} accounts loaded, run date {}",
        classifier.accounts().len(),
        classifier.run_date()
    );

    let mut archiver = Archiver::new(ArchiveOptions {
        dry_run: !args.force,
        overwrite: args.overwrite,
    });

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let outcome = sort_file(
            &path,
            &classifier,
            extractor.as_ref(),
            &mut archiver,
            &output_dir,
            args.ignore_errors,
        )?;
        results.push(SortResult { path, outcome });
    }

    if let Some(report_path) = &args.report {
        write_report(report_path, &results)?;
        if !args.only_errors {
            println!(
                "{} Report written to {}",
                style("✓").green(),
                report_path.display()
            );
        }
    }

    if !args.only_errors {
        print_summary(&results, !args.force, start);
    }

    Ok(())
}

/// Expand the command-line inputs into the PDF files to handle.
///
/// Directories contribute their PDF entries, non-recursively and sorted.
fn collect_inputs(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && is_pdf(path))
                .collect();
            entries.sort();
            files.extend(entries);
        } else if input.is_file() {
            if is_pdf(input) {
                files.push(input.clone());
            } else {
                debug!("skipping '{}': not a PDF", input.display());
            }
        } else {
            warn!("'{}' does not exist, skipping", input.display());
        }
    }

    Ok(files)
}

/// Handle one document. Only failures that doom the whole run are errors.
fn sort_file(
    path: &Path,
    classifier: &Classifier,
    extractor: &dyn TextExtractor,
    archiver: &mut Archiver,
    output_dir: &Path,
    ignore_errors: bool,
) -> anyhow::Result<Outcome> {
    let name = short_name(path);

    let text = match extractor.extract_text(path) {
        Ok(text) => text,
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(e) => {
            if !ignore_errors {
                error!("Failed to extract text from file '{}': {}", name, e);
            }
            return Ok(Outcome::ExtractionFailed(e.to_string()));
        }
    };

    let Some(classification) = classifier.classify(&text, &name) else {
        if !ignore_errors {
            error!("Failed to categorize {}", name);
        }
        return Ok(Outcome::Unclassified);
    };

    let account = classification.account.account_name().to_string();
    let bill_date = classification.bill_date;

    let placement = match place(classification.account, bill_date, output_dir) {
        Ok(placement) => placement,
        Err(e) => {
            error!("{}: {}", name, e);
            return Ok(Outcome::Failed {
                account,
                bill_date,
                reason: e.to_string(),
            });
        }
    };
    debug!("{}: will be moved to {}", name, placement.path().display());

    match archiver.file(path, &placement) {
        Ok(action) => Ok(Outcome::Filed {
            account,
            bill_date,
            action,
        }),
        Err(e) => {
            error!("{}: {}", name, e);
            Ok(Outcome::Failed {
                account,
                bill_date,
                reason: e.to_string(),
            })
        }
    }
}

fn write_report(path: &Path, results: &[SortResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["file", "status", "account", "bill_date", "destination", "error"])?;

    for result in results {
        let file = result.path.display().to_string();

        let record: [String; 6] = match &result.outcome {
            Outcome::Filed {
                account,
                bill_date,
                action,
            } => {
                let status = match action {
                    FileAction::Moved(_) => "moved",
                    FileAction::WouldMove(_) => "would-move",
                    FileAction::SkippedExisting(_) => "exists",
                };
                [
                    file,
                    status.to_string(),
                    account.clone(),
                    bill_date.to_string(),
                    action.destination().display().to_string(),
                    String::new(),
                ]
            }
            Outcome::ExtractionFailed(reason) => [
                file,
                "extraction-failed".to_string(),
                String::new(),
                String::new(),
                String::new(),
                reason.clone(),
            ],
            Outcome::Unclassified => [
                file,
                "unclassified".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ],
            Outcome::Failed {
                account,
                bill_date,
                reason,
            } => [
                file,
                "error".to_string(),
                account.clone(),
                bill_date.to_string(),
                String::new(),
                reason.clone(),
            ],
        };

        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

fn print_summary(results: &[SortResult], dry_run: bool, start: Instant) {
    let mut filed = 0;
    let mut existing = 0;
    let mut unclassified = 0;
    let mut failed = 0;

    for result in results {
        match &result.outcome {
            Outcome::Filed {
                action: FileAction::SkippedExisting(_),
                ..
            } => existing += 1,
            Outcome::Filed { .. } => filed += 1,
            Outcome::Unclassified => unclassified += 1,
            Outcome::ExtractionFailed(_) | Outcome::Failed { .. } => failed += 1,
        }
    }

    println!();
    println!(
        "{} Processed {} files in {:?}{}",
        style("✓").green(),
        results.len(),
        start.elapsed(),
        if dry_run { " (dry run)" } else { "" }
    );
    println!(
        "   {} {}, {} already present, {} unclassified, {} failed",
        style(filed).green(),
        if dry_run { "to file" } else { "filed" },
        style(existing).yellow(),
        style(unclassified).yellow(),
        style(failed).red()
    );

    if dry_run && filed > 0 {
        println!();
        println!("Nothing was moved. Run again with --force to file the documents.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::write(nested.join("c.pdf"), "x").unwrap();
        let single = nested.join("c.pdf");

        let files = collect_inputs(&[
            dir.path().to_path_buf(),
            single.clone(),
            dir.path().join("missing.pdf"),
            dir.path().join("notes.txt"),
        ])
        .unwrap();

        assert_eq!(
            files,
            vec![dir.path().join("a.PDF"), dir.path().join("b.pdf"), single]
        );
    }
}
