mod commands;
mod config;
mod input;
mod output;
mod store;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::compare::CompareArgs;
use commands::decompose::{DecomposeArgs, DiffArgs};
use commands::record::RecordArgs;
use commands::risk_profile::RiskProfileArgs;
use commands::sectors::SectorsArgs;
use commands::valuation::ValueArgs;
use config::Settings;

/// Scenario-based portfolio allocation, risk and return
#[derive(Parser)]
#[command(
    name = "pfa",
    version,
    about = "Scenario-based portfolio allocation, risk and return",
    long_about = "A CLI for valuing multi-asset portfolios under bad / base / good \
                  return scenarios with decimal precision. Supports weighted risk, \
                  currency-coupled returns, base/active decomposition, rebalance \
                  deltas, sector fan-out and risk profile scoring."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// YAML config file with data file locations
    #[arg(long, global = true, env = "PFA_CONFIG")]
    config: Option<PathBuf>,

    /// Asset catalog file
    #[arg(long, global = true, env = "PFA_CATALOG")]
    catalog: Option<PathBuf>,

    /// People file
    #[arg(long, global = true, env = "PFA_PEOPLE")]
    people: Option<PathBuf>,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Value one portfolio: positions, weighted risk, scenario projections
    Value(ValueArgs),
    /// Split holdings into base and active sub-portfolios
    Decompose(DecomposeArgs),
    /// Buy / sell amounts moving a current distribution to a target
    Diff(DiffArgs),
    /// Current vs base vs target comparison report
    Compare(CompareArgs),
    /// Fan one allocation bucket out across sectors
    Sectors(SectorsArgs),
    /// Score the risk profile survey
    RiskProfile(RiskProfileArgs),
    /// Record a person's current holdings and report on them
    RecordCurrent(RecordArgs),
    /// List people in the people file
    People,
    /// Show the resolved asset catalog
    Catalog,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<Option<serde_json::Value>, Box<dyn std::error::Error>> {
    if let Commands::Version = cli.command {
        println!("pfa {}", env!("CARGO_PKG_VERSION"));
        return Ok(None);
    }
    let settings = Settings::load(cli.config.as_deref())?.with_overrides(cli.catalog, cli.people);

    let value = match cli.command {
        Commands::Value(args) => commands::valuation::run_value(args, &settings),
        Commands::Decompose(args) => commands::decompose::run_decompose(args, &settings),
        Commands::Diff(args) => commands::decompose::run_diff(args, &settings),
        Commands::Compare(args) => commands::compare::run_compare(args, &settings),
        Commands::Sectors(args) => commands::sectors::run_sectors(args, &settings),
        Commands::RiskProfile(args) => commands::risk_profile::run_risk_profile(args, &settings),
        Commands::RecordCurrent(args) => commands::record::run_record_current(args, &settings),
        Commands::People => commands::people::run_people(&settings),
        Commands::Catalog => commands::catalog::run_catalog(&settings),
        Commands::Version => return Ok(None),
    }?;
    Ok(Some(value))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = cli.output.clone();
    match run(cli) {
        Ok(None) => {}
        Ok(Some(value)) => {
            if let Some(warnings) = value.get("warnings").and_then(|w| w.as_array()) {
                for w in warnings.iter().filter_map(|w| w.as_str()) {
                    tracing::warn!("{}", w);
                }
            }
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
