use anyhow::{Context, Result};
use backtester::Backtester;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use core_types::{AssetInfo, PriceSeries};
use market_data::{CsvMarketData, MarketData, MarketDataError};
use multi_backtester::{AssetOutcome, MultiBacktester};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

/// The main entry point for the cadence backtesting CLI.
fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install the tracing subscriber");

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => handle_run(args),
        Commands::Compare(args) => handle_compare(args),
    };
    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Simulates a monthly fixed-contribution investment plan over historical prices.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest the plan against a single asset's price history.
    Run(RunArgs),
    /// Compare the same plan across 2-5 assets on their shared calendar.
    Compare(CompareArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// CSV price file with `date` and `close` columns.
    #[arg(long)]
    prices: PathBuf,

    /// Lump sum for the first purchase. Defaults to config.toml.
    #[arg(long)]
    initial: Option<Decimal>,

    /// Amount for each later monthly purchase. Defaults to config.toml.
    #[arg(long)]
    monthly: Option<Decimal>,

    /// Write the full JSON report to this path.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct CompareArgs {
    /// Asset codes to compare; each resolves to `<data-dir>/<code>.csv`
    /// (repeat the flag 2-5 times).
    #[arg(long = "asset", required = true)]
    assets: Vec<String>,

    /// Directory holding the per-asset price files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Market label recorded on every asset (e.g. "US", "A-Share").
    #[arg(long, default_value = "US")]
    market: String,

    /// Lump sum for the first purchase. Defaults to config.toml.
    #[arg(long)]
    initial: Option<Decimal>,

    /// Amount for each later monthly purchase. Defaults to config.toml.
    #[arg(long)]
    monthly: Option<Decimal>,

    /// Worker-thread cap. Defaults to config.toml, then to the CPU count.
    #[arg(long)]
    workers: Option<usize>,

    /// Write the full JSON report to this path.
    #[arg(long)]
    output: Option<PathBuf>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_run(args: RunArgs) -> Result<()> {
    let config = configuration::load_config()?;
    let initial = args.initial.unwrap_or(config.backtest.initial_investment);
    let monthly = args.monthly.unwrap_or(config.backtest.monthly_investment);

    let series = load_series(&args.prices)?;
    let code = asset_code(&args.prices);
    tracing::info!(asset = %code, days = series.len(), "loaded price history");

    let engine = Backtester::new(Uuid::new_v4(), initial, monthly);
    let report = engine
        .run(&series)
        .with_context(|| format!("backtest failed for '{code}'"))?;

    let mut table = Table::new();
    table.set_header(vec!["Metric".to_string(), "Value".to_string()]);
    table.add_row(vec!["Asset".to_string(), code]);
    table.add_row(vec![
        "Trading days".to_string(),
        report.strategy_stats.trading_days.to_string(),
    ]);
    table.add_row(vec![
        "Purchases".to_string(),
        report.total_investments.to_string(),
    ]);
    table.add_row(vec![
        "Total invested".to_string(),
        report.total_invested.round_dp(2).to_string(),
    ]);
    table.add_row(vec![
        "Final value".to_string(),
        report.final_total.round_dp(2).to_string(),
    ]);
    table.add_row(vec![
        "Total return %".to_string(),
        report.total_return_pct.round_dp(2).to_string(),
    ]);
    table.add_row(vec![
        "Max drawdown %".to_string(),
        report.max_drawdown_pct.round_dp(2).to_string(),
    ]);
    table.add_row(vec![
        "Absolute profit".to_string(),
        report.absolute_profit.round_dp(2).to_string(),
    ]);
    println!("{table}");

    if let Some(path) = args.output {
        write_json(&path, &report)?;
        println!("Full report written to {}", path.display());
    }
    Ok(())
}

fn handle_compare(args: CompareArgs) -> Result<()> {
    let config = configuration::load_config()?;
    let initial = args.initial.unwrap_or(config.backtest.initial_investment);
    let monthly = args.monthly.unwrap_or(config.backtest.monthly_investment);
    let workers = args
        .workers
        .or(config.comparison.max_workers)
        .unwrap_or_else(num_cpus::get);

    let store = CsvMarketData::new(&args.data_dir);
    let mut requests: Vec<(AssetInfo, PriceSeries)> = Vec::with_capacity(args.assets.len());
    for code in &args.assets {
        let series = store
            .fetch_series(code)
            .with_context(|| format!("failed to load price history for '{code}'"))?;
        tracing::info!(asset = %code, days = series.len(), "loaded price history");
        requests.push((
            AssetInfo {
                code: code.clone(),
                name: code.clone(),
                market: args.market.clone(),
            },
            series,
        ));
    }

    let coordinator = MultiBacktester::new(initial, monthly, workers);
    let report = coordinator.run(&requests).context("comparison failed")?;

    println!(
        "Shared calendar: {} trading days, {} purchases per asset.",
        report.trading_days,
        report.investment_dates.len()
    );

    let mut table = Table::new();
    table.set_header(vec![
        "Asset".to_string(),
        "Invested".to_string(),
        "Final value".to_string(),
        "Return %".to_string(),
        "Max DD %".to_string(),
        "Profit".to_string(),
    ]);
    for outcome in &report.outcomes {
        match outcome {
            AssetOutcome::Completed { asset, report } => {
                table.add_row(vec![
                    asset.code.clone(),
                    report.total_invested.round_dp(2).to_string(),
                    report.final_total.round_dp(2).to_string(),
                    report.total_return_pct.round_dp(2).to_string(),
                    report.max_drawdown_pct.round_dp(2).to_string(),
                    report.absolute_profit.round_dp(2).to_string(),
                ]);
            }
            AssetOutcome::Failed { asset, error } => {
                table.add_row(vec![
                    asset.code.clone(),
                    format!("failed: {error}"),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ]);
            }
        }
    }
    println!("{table}");

    if let Some(path) = args.output {
        write_json(&path, &report)?;
        println!("Full report written to {}", path.display());
    }
    Ok(())
}

// ==============================================================================
// Helpers
// ==============================================================================

fn load_series(path: &Path) -> Result<PriceSeries, MarketDataError> {
    let store = CsvMarketData::new(path.parent().unwrap_or_else(|| Path::new(".")));
    store.load_file(path)
}

/// Asset code derived from the price file's stem ("data/AAPL.csv" -> "AAPL").
fn asset_code(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_json<T: serde::Serialize>(path: &Path, report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
