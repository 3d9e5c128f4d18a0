//! Batch command - match many invoice request files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use trimatch_core::match_invoice;

use crate::request::{MatchRequest, resolve_policy};

use super::run::{OutputFormat, format_result};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Request files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for per-invoice result files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each result file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Continue past files that fail to load or match
    #[arg(long)]
    continue_on_error: bool,
}

pub fn run(args: BatchArgs, policy_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching request files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} request files",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut matched = 0usize;
    let mut with_exceptions = 0usize;
    let mut failed = 0usize;

    for path in &files {
        debug!("processing {}", path.display());
        match run_one(path, &args, policy_path) {
            Ok(clean) => {
                if clean {
                    matched += 1;
                } else {
                    with_exceptions += 1;
                }
            }
            Err(e) => {
                if !args.continue_on_error {
                    progress.finish_and_clear();
                    return Err(e.context(format!("while processing {}", path.display())));
                }
                error!("{}: {e:#}", path.display());
                failed += 1;
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();

    println!(
        "{} {} matched, {} with exceptions, {} failed in {:.1}s",
        style("✓").green(),
        matched,
        with_exceptions,
        failed,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Match one request file; returns whether the invoice matched cleanly.
fn run_one(path: &PathBuf, args: &BatchArgs, policy_path: Option<&str>) -> anyhow::Result<bool> {
    let request = MatchRequest::from_file(path)?;
    let policy = resolve_policy(policy_path, request.policy.clone())?;
    let result = match_invoice(&request.invoice, &request.context, &policy)?;

    if let Some(ref output_dir) = args.output_dir {
        let extension = match args.format {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        };
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("result");
        let out_path = output_dir.join(format!("{stem}.result.{extension}"));
        fs::write(&out_path, format_result(&result, args.format)?)?;
    }

    Ok(result.is_matched())
}
