use core_types::DailyRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The standardized result record for one simulated asset.
///
/// This struct is the final output of the `AnalyticsEngine` and serves as the
/// data transfer object for backtest results throughout the system. Curve
/// maps are keyed by `YYYY-MM-DD` date strings so an external transport can
/// serialize them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    // I. Echoed inputs
    pub initial_investment: Decimal,
    pub monthly_investment: Decimal,

    // II. Final totals
    pub total_invested: Decimal,
    pub final_total: Decimal,

    // III. Performance metrics
    pub total_return_pct: Decimal,
    /// Largest gap between the return series and its running peak. Zero or
    /// negative by construction.
    pub max_drawdown_pct: Decimal,
    /// The baseline is committed principal with no growth, so this is 0 by
    /// definition.
    pub benchmark_return_pct: Decimal,
    pub absolute_profit: Decimal,
    pub total_investments: usize,

    // IV. Time series
    pub equity_curve: BTreeMap<String, Decimal>,
    pub benchmark_curve: BTreeMap<String, Decimal>,
    pub daily_records: Vec<DailyRecord>,

    pub strategy_stats: StrategyStats,
}

/// Descriptive statistics about the purchase plan itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyStats {
    /// Purchase dates, formatted `YYYY-MM-DD`.
    pub investment_dates: Vec<String>,
    pub trading_days: usize,
    pub investment_period_months: usize,
}
