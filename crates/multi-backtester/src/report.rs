use analytics::BacktestReport;
use core_types::AssetInfo;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The result of one asset's leg of a comparison.
///
/// A failed asset never aborts its siblings; it is reported here instead.
/// The `#[serde(tag = "status", content = "payload")]` attribute serializes
/// each outcome as a tagged JSON object an external transport can route on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload")]
pub enum AssetOutcome {
    Completed {
        asset: AssetInfo,
        report: BacktestReport,
    },
    Failed {
        asset: AssetInfo,
        error: String,
    },
}

impl AssetOutcome {
    pub fn asset(&self) -> &AssetInfo {
        match self {
            AssetOutcome::Completed { asset, .. } | AssetOutcome::Failed { asset, .. } => asset,
        }
    }

    pub fn report(&self) -> Option<&BacktestReport> {
        match self {
            AssetOutcome::Completed { report, .. } => Some(report),
            AssetOutcome::Failed { .. } => None,
        }
    }
}

/// The combined result of a multi-asset comparison.
///
/// All assets were simulated with the same purchase dates and contribution
/// amounts on the shared trading calendar, so their reports are directly
/// comparable. `outcomes` is in the caller's original asset order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiBacktestReport {
    pub initial_investment: Decimal,
    pub monthly_investment: Decimal,

    /// Shared purchase dates, formatted `YYYY-MM-DD`.
    pub investment_dates: Vec<String>,
    /// The zero-growth principal baseline common to every asset.
    pub benchmark_curve: BTreeMap<String, Decimal>,
    /// Number of dates in the shared trading calendar.
    pub trading_days: usize,

    pub outcomes: Vec<AssetOutcome>,
}
