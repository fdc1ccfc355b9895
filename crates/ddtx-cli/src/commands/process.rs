//! Process command: extract a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use ddtx_core::{load_content, ExtractionOrchestrator};

use super::load_config;
use super::output::{format_document, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.pdf, .txt or reader dump .json)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Read only the first page
    #[arg(long)]
    first_page: bool,

    /// Print extraction warnings
    #[arg(long)]
    validate: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    if args.first_page {
        config.pdf.all_pages = false;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Reading document...");

    let content = load_content(&args.input, &config.pdf)?;

    pb.set_message("Extracting fields...");
    let orchestrator = ExtractionOrchestrator::from_config(&config);
    let result = orchestrator.parse(&content.text, &content.tables, &content.source)?;
    pb.finish_and_clear();

    if args.validate && !result.warnings.is_empty() {
        eprintln!("{}", style("Extraction warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_document(&result.document, args.format, config.output.pretty_json)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {} ({:.2}s)",
            style("✓").green(),
            output_path.display(),
            start.elapsed().as_secs_f64()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}
