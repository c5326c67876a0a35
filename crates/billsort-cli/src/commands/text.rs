//! Text command - print the text an extractor sees, for writing patterns.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use super::{build_extractor, load_settings, ExtractorArg};

/// Arguments for the text command.
#[derive(Args)]
pub struct TextArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text extraction backend
    #[arg(long, value_enum)]
    extractor: Option<ExtractorArg>,
}

pub fn run(args: TextArgs, settings_path: Option<&Path>) -> anyhow::Result<()> {
    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let settings = load_settings(settings_path)?;
    let extractor = build_extractor(&settings, args.extractor)?;

    info!("Extracting text from {} with {}", args.input.display(), extractor.name());
    let text = extractor.extract_text(&args.input)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &text)?;
        eprintln!(
            "{} Text written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{text}");
    }

    Ok(())
}
