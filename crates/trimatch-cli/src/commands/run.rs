//! Match command - reconcile a single invoice request file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use trimatch_core::{MatchResult, MatchStatus, match_invoice};

use crate::request::{MatchRequest, resolve_policy};

/// Arguments for the match command.
#[derive(Args)]
pub struct MatchArgs {
    /// Request file (invoice + resolved documents + prior billing state)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (one row per exception)
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: MatchArgs, policy_path: Option<&str>) -> anyhow::Result<()> {
    let request = MatchRequest::from_file(&args.input)?;
    let policy = resolve_policy(policy_path, request.policy.clone())?;

    info!("matching invoice {}", request.invoice.id);
    let result = match_invoice(&request.invoice, &request.context, &policy)?;

    let output = format_result(&result, args.format)?;
    match &args.output {
        Some(path) => {
            fs::write(path, &output)?;
            println!(
                "{} Result written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{output}"),
    }

    Ok(())
}

/// Render a match result in the requested output format.
pub fn format_result(result: &MatchResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &MatchResult) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["invoice_id", "status", "type", "message", "details"])?;

    if result.exceptions.is_empty() {
        writer.write_record([result.invoice_id.as_str(), result.status.as_str(), "", "", ""])?;
    }
    for exception in &result.exceptions {
        let message = exception.message();
        let details = serde_json::Value::Object(exception.details()).to_string();
        writer.write_record([
            result.invoice_id.as_str(),
            result.status.as_str(),
            exception.kind().as_str(),
            message.as_str(),
            details.as_str(),
        ])?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

fn format_text(result: &MatchResult) -> String {
    let status = match result.status {
        MatchStatus::Matched => style("matched").green().to_string(),
        MatchStatus::Exception => style("exception").red().to_string(),
    };
    let mut out = format!("Invoice {}: {}\n", result.invoice_id, status);
    for exception in &result.exceptions {
        out.push_str(&format!(
            "  - {}: {}\n",
            exception.kind(),
            exception.message()
        ));
    }
    out
}
