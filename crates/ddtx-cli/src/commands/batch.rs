//! Batch command: extract every document matching a directory or glob.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use ddtx_core::extract::rules::format_amount;
use ddtx_core::input::SUPPORTED_EXTENSIONS;
use ddtx_core::models::PdfConfig;
use ddtx_core::{load_content, ExtractionOrchestrator, ExtractionResult};

use super::load_config;
use super::output::{format_document, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Per-file time limit in seconds
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of a single file.
struct FileOutcome {
    path: PathBuf,
    result: Result<ExtractionResult, String>,
    pages: usize,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = collect_inputs(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let orchestrator = Arc::new(ExtractionOrchestrator::from_config(&config));
    let pdf_config = Arc::new(config.pdf.clone());
    let permits = Arc::new(Semaphore::new(args.jobs.max(1)));
    let timeout = Duration::from_secs(args.timeout_secs.max(1));

    let mut tasks = JoinSet::new();
    for path in files {
        let orchestrator = Arc::clone(&orchestrator);
        let pdf_config = Arc::clone(&pdf_config);
        let permits = Arc::clone(&permits);

        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let file_start = Instant::now();

            let worker_path = path.clone();
            let work = tokio::task::spawn_blocking(move || {
                extract_file(&worker_path, &orchestrator, &pdf_config)
            });

            let (result, pages) = match tokio::time::timeout(timeout, work).await {
                Ok(Ok(Ok((result, pages)))) => (Ok(result), pages),
                Ok(Ok(Err(message))) => (Err(message), 0),
                Ok(Err(e)) => (Err(format!("worker failed: {}", e)), 0),
                Err(_) => (Err(format!("timed out after {}s", timeout.as_secs())), 0),
            };

            FileOutcome {
                path,
                result,
                pages,
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            }
        });
    }

    // Outcomes are merged here only, in completion order
    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined?;
        pb.inc(1);

        match &outcome.result {
            Ok(result) => {
                debug!(
                    "{}: {} line items in {}ms",
                    outcome.path.display(),
                    result.document.line_items.len(),
                    outcome.processing_time_ms
                );
                if let Some(ref output_dir) = args.output_dir {
                    write_output(output_dir, &outcome.path, result, args.format, config.output.pretty_json)?;
                }
            }
            Err(message) if args.continue_on_error => {
                warn!("Failed to process {}: {}", outcome.path.display(), message);
            }
            Err(message) => {
                error!("Failed to process {}: {}", outcome.path.display(), message);
                pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", outcome.path.display(), message);
            }
        }

        outcomes.push(outcome);
    }
    pb.finish_and_clear();

    outcomes.sort_by(|a, b| a.path.cmp(&b.path));

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_report(&outcomes, start.elapsed());
    Ok(())
}

/// Expand a directory or glob into supported input files, sorted.
fn collect_inputs(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = if Path::new(input).is_dir() {
        Path::new(input).join("*").to_string_lossy().into_owned()
    } else {
        input.to_string()
    };

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && is_supported(p))
        .collect();
    files.sort();
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Extract one file, returning the result and the number of pages read.
fn extract_file(
    path: &Path,
    orchestrator: &ExtractionOrchestrator,
    pdf_config: &PdfConfig,
) -> Result<(ExtractionResult, usize), String> {
    let content = load_content(path, pdf_config).map_err(|e| e.to_string())?;
    let result = orchestrator
        .parse(&content.text, &content.tables, &content.source)
        .map_err(|e| e.to_string())?;
    Ok((result, content.pages.len()))
}

fn write_output(
    output_dir: &Path,
    path: &Path,
    result: &ExtractionResult,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<()> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

    fs::write(&output_path, format_document(&result.document, format, pretty)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

#[derive(Serialize, Default)]
struct SummaryRow {
    filename: String,
    status: &'static str,
    doc_type: String,
    number: String,
    date: String,
    supplier: String,
    customer: String,
    pages: usize,
    line_items: usize,
    total_amount: String,
    warnings: usize,
    processing_time_ms: u64,
    error: String,
}

fn write_summary(path: &Path, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for outcome in outcomes {
        let filename = outcome
            .path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let row = match &outcome.result {
            Ok(result) => {
                let doc = &result.document;
                SummaryRow {
                    filename,
                    status: "success",
                    doc_type: doc.doc_type.label().to_string(),
                    number: doc.number.clone(),
                    date: doc.date.clone(),
                    supplier: doc.supplier.name.clone(),
                    customer: doc.customer.name.clone(),
                    pages: outcome.pages,
                    line_items: doc.line_items.len(),
                    total_amount: doc.total_amount.to_string(),
                    warnings: result.warnings.len(),
                    processing_time_ms: outcome.processing_time_ms,
                    error: String::new(),
                }
            }
            Err(message) => SummaryRow {
                filename,
                status: "error",
                processing_time_ms: outcome.processing_time_ms,
                error: message.clone(),
                ..SummaryRow::default()
            },
        };
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

fn print_report(outcomes: &[FileOutcome], elapsed: Duration) {
    let mut by_type: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut total = Decimal::ZERO;
    let mut failed = Vec::new();

    for outcome in outcomes {
        match &outcome.result {
            Ok(result) => {
                *by_type.entry(result.document.doc_type.label()).or_default() += 1;
                total += result.document.total_amount;
            }
            Err(message) => failed.push((&outcome.path, message)),
        }
    }
    let successful = outcomes.len() - failed.len();

    println!();
    println!(
        "{} Processed {} files in {:.2}s",
        style("✓").green(),
        outcomes.len(),
        elapsed.as_secs_f64()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );
    for (label, count) in &by_type {
        println!("   {}: {}", label, count);
    }
    println!("   Total amount: € {}", format_amount(total));

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, message) in failed {
            println!("  - {}: {}", path.display(), message);
        }
    }
}
