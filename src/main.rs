use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use costctl::commands::{self, AnalyzeArgs};
use costctl::config::{init_config, Config};
use costctl::error::CostctlError;
use costctl::exit_codes::{codes, exit_code_for_error};

#[derive(Parser)]
#[command(name = "costctl")]
#[command(
    about = "EC2 cost optimization CLI",
    long_about = "costctl analyzes EC2 fleet utilization and recommends cost optimizations.\n\nSources:\n  - Offline JSON metrics snapshot (--input-json)\n  - Live fetch via EC2 + CloudWatch (--aws-live)\n\nRecommendations:\n  - Scheduling: run underutilized non-production instances part-time\n  - Rightsizing: drop oversized instances one size within their family"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    output: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze fleet utilization and emit cost recommendations
    Analyze(AnalyzeArgs),
    /// Initialize analysis configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".costctl.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Suppress INFO by default, only show warnings and errors
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err
            .downcast_ref::<CostctlError>()
            .map(exit_code_for_error)
            .unwrap_or(codes::USER_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze(args) => commands::analyze_command(args, &config, &cli.output).await?,
        Commands::Init { output } => init_config(&output)?,
    }

    Ok(())
}
