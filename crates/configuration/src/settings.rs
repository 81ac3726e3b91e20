use rust_decimal::Decimal;
use serde::Deserialize;

/// The root configuration structure for the cadence CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub backtest: BacktestSettings,
    pub comparison: ComparisonSettings,
}

/// Default contribution amounts for a backtest run.
#[derive(Debug, Clone, Deserialize)]
pub struct BacktestSettings {
    /// Lump sum committed on the first trading day of the series.
    pub initial_investment: Decimal,
    /// Amount committed on each subsequent monthly purchase date.
    pub monthly_investment: Decimal,
}

/// Parameters for multi-asset comparisons.
#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonSettings {
    /// Upper bound on comparison worker threads. The pool never exceeds the
    /// number of assets in a request. Defaults to the CPU count when unset.
    pub max_workers: Option<usize>,
}
