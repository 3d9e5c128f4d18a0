//! CLI application for 3-way invoice matching.

mod commands;
mod request;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, policy, run};

/// 3-way match - reconcile vendor invoices against purchase orders and goods receipts
#[derive(Parser)]
#[command(name = "trimatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a tolerance policy file
    #[arg(short, long, global = true)]
    policy: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a single invoice request file
    Match(run::MatchArgs),

    /// Match multiple invoice request files
    Batch(batch::BatchArgs),

    /// Manage the tolerance policy
    Policy(policy::PolicyArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Match(args) => run::run(args, cli.policy.as_deref()),
        Commands::Batch(args) => batch::run(args, cli.policy.as_deref()),
        Commands::Policy(args) => policy::run(args, cli.policy.as_deref()),
    }
}
