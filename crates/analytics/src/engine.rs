use crate::error::AnalyticsError;
use crate::report::{BacktestReport, StrategyStats};
use core_types::DailyRecord;
use rust_decimal::Decimal;
use schedule::{InvestmentSchedule, PrincipalCurve};
use std::collections::BTreeMap;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A stateless calculator for deriving performance metrics from a simulated
/// purchase plan.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `records` - The simulated per-day portfolio state, in date order.
    /// * `principal` - The zero-growth baseline built from the same calendar.
    /// * `schedule` - The purchase dates the simulation executed.
    /// * `initial_investment` / `monthly_investment` - The contribution
    ///   amounts, echoed into the report.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `BacktestReport` or an `AnalyticsError`.
    pub fn calculate(
        &self,
        records: &[DailyRecord],
        principal: &PrincipalCurve,
        schedule: &InvestmentSchedule,
        initial_investment: Decimal,
        monthly_investment: Decimal,
    ) -> Result<BacktestReport, AnalyticsError> {
        let last = records.last().ok_or_else(|| {
            AnalyticsError::NotEnoughData("the simulation produced no daily records".to_string())
        })?;
        if principal.points().len() != records.len() {
            return Err(AnalyticsError::CurveMismatch {
                principal_points: principal.points().len(),
                record_points: records.len(),
            });
        }

        let final_total = last.total;
        let total_invested = last.invested;
        let total_return_pct = return_pct(final_total, total_invested);
        let max_drawdown_pct = self.calculate_max_drawdown(records);

        let equity_curve: BTreeMap<String, Decimal> = records
            .iter()
            .map(|r| (r.date.format(DATE_FORMAT).to_string(), r.total))
            .collect();
        let benchmark_curve: BTreeMap<String, Decimal> = principal
            .points()
            .iter()
            .map(|&(date, value)| (date.format(DATE_FORMAT).to_string(), value))
            .collect();

        tracing::debug!(
            %total_invested,
            %final_total,
            %total_return_pct,
            %max_drawdown_pct,
            "analytics pass complete"
        );

        Ok(BacktestReport {
            initial_investment,
            monthly_investment,
            total_invested,
            final_total,
            total_return_pct,
            max_drawdown_pct,
            // Committed principal has no growth, so the baseline return is 0%.
            benchmark_return_pct: Decimal::ZERO,
            absolute_profit: final_total - total_invested,
            total_investments: schedule.len(),
            equity_curve,
            benchmark_curve,
            daily_records: records.to_vec(),
            strategy_stats: StrategyStats {
                investment_dates: schedule
                    .dates()
                    .iter()
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .collect(),
                trading_days: records.len(),
                investment_period_months: schedule.len().saturating_sub(1),
            },
        })
    }

    /// Single left-to-right pass: track the running peak of the return
    /// series and the deepest gap below it.
    fn calculate_max_drawdown(&self, records: &[DailyRecord]) -> Decimal {
        let mut running_max: Option<Decimal> = None;
        let mut max_drawdown = Decimal::ZERO;

        for record in records {
            let ret = return_pct(record.total, record.invested);
            let peak = match running_max {
                Some(peak) if peak >= ret => peak,
                _ => {
                    running_max = Some(ret);
                    ret
                }
            };
            let drawdown = ret - peak;
            if drawdown < max_drawdown {
                max_drawdown = drawdown;
            }
        }

        max_drawdown
    }
}

/// Percentage gain of `total` over `invested`, defined as 0 when nothing has
/// been invested yet.
fn return_pct(total: Decimal, invested: Decimal) -> Decimal {
    if invested.is_zero() {
        Decimal::ZERO
    } else {
        (total / invested - Decimal::ONE) * Decimal::ONE_HUNDRED
    }
}
