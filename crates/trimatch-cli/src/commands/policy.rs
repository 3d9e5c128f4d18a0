//! Policy command - manage the tolerance policy.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use trimatch_core::TolerancePolicy;

/// Arguments for the policy command.
#[derive(Args)]
pub struct PolicyArgs {
    #[command(subcommand)]
    command: PolicyCommand,
}

#[derive(Subcommand)]
enum PolicyCommand {
    /// Show the effective tolerance policy
    Show,

    /// Write a default policy file
    Init(InitArgs),
}

#[derive(Args)]
struct InitArgs {
    /// Output path for the policy file
    #[arg(short, long, default_value = "policy.json")]
    output: PathBuf,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: PolicyArgs, policy_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        PolicyCommand::Show => show_policy(policy_path),
        PolicyCommand::Init(init_args) => init_policy(init_args),
    }
}

fn show_policy(policy_path: Option<&str>) -> anyhow::Result<()> {
    let policy = match policy_path {
        Some(path) => TolerancePolicy::from_file(Path::new(path))?,
        None => {
            println!(
                "{} No policy file given, showing defaults.",
                style("ℹ").blue()
            );
            TolerancePolicy::default()
        }
    };

    println!("{}", serde_json::to_string_pretty(&policy)?);

    Ok(())
}

fn init_policy(args: InitArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "Policy file already exists at {}. Use --force to overwrite.",
            args.output.display()
        );
    }

    TolerancePolicy::default().save(&args.output)?;
    println!(
        "{} Policy file written to {}",
        style("✓").green(),
        args.output.display()
    );

    Ok(())
}
