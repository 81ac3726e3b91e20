use crate::error::BacktestError;
use analytics::{AnalyticsEngine, BacktestReport};
use core_types::{DailyRecord, PriceSeries};
use rust_decimal::Decimal;
use schedule::{InvestmentSchedule, PrincipalCurve};
use uuid::Uuid;

pub mod error;

/// Fewest data points a series may have and still be simulated.
pub const MIN_SERIES_LEN: usize = 30;

/// The single-asset backtesting engine.
///
/// Walks the price series once in date order, buying on each scheduled
/// purchase date and recording the resulting portfolio state per day, then
/// hands the state to the analytics engine. The simulation is a pure
/// function of its inputs: no I/O, no shared state, no clock.
pub struct Backtester {
    // The unique ID for this specific run, used for log correlation.
    run_id: Uuid,
    initial_investment: Decimal,
    monthly_investment: Decimal,
    analytics_engine: AnalyticsEngine,
}

impl Backtester {
    pub fn new(run_id: Uuid, initial_investment: Decimal, monthly_investment: Decimal) -> Self {
        Self {
            run_id,
            initial_investment,
            monthly_investment,
            analytics_engine: AnalyticsEngine::new(),
        }
    }

    /// Runs the full single-asset pipeline: validate, derive the purchase
    /// schedule from the series' own calendar, simulate, analyze.
    pub fn run(&self, series: &PriceSeries) -> Result<BacktestReport, BacktestError> {
        self.validate(series)?;
        let calendar = series.dates();
        let schedule = InvestmentSchedule::build(&calendar)?;
        self.run_with_schedule(series, &schedule)
    }

    /// Runs the simulation against an externally supplied schedule.
    ///
    /// The comparison engine uses this to apply one shared purchase plan to
    /// several assets; every schedule date must be a trading date of
    /// `series`.
    pub fn run_with_schedule(
        &self,
        series: &PriceSeries,
        schedule: &InvestmentSchedule,
    ) -> Result<BacktestReport, BacktestError> {
        self.validate(series)?;

        let records = self.simulate(series, schedule)?;
        let calendar = series.dates();
        let principal = PrincipalCurve::build(
            schedule,
            self.initial_investment,
            self.monthly_investment,
            &calendar,
        );

        let report = self.analytics_engine.calculate(
            &records,
            &principal,
            schedule,
            self.initial_investment,
            self.monthly_investment,
        )?;

        tracing::info!(
            run_id = %self.run_id,
            trading_days = records.len(),
            purchases = schedule.len(),
            total_return_pct = %report.total_return_pct,
            "backtest complete"
        );

        Ok(report)
    }

    /// All validation failures are detected here, before simulation begins.
    fn validate(&self, series: &PriceSeries) -> Result<(), BacktestError> {
        if series.is_empty() {
            return Err(BacktestError::EmptySeries);
        }
        if series.len() < MIN_SERIES_LEN {
            return Err(BacktestError::InsufficientData {
                required: MIN_SERIES_LEN,
                actual: series.len(),
            });
        }
        Ok(())
    }

    /// One pass over the series, oldest date first.
    ///
    /// On a scheduled date the contribution is converted to shares at that
    /// day's close; every day records the cumulative state. Shares and
    /// invested capital never decrease: the strategy only buys, holds no
    /// cash, and never sells.
    fn simulate(
        &self,
        series: &PriceSeries,
        schedule: &InvestmentSchedule,
    ) -> Result<Vec<DailyRecord>, BacktestError> {
        let first_purchase = schedule.first();
        let mut shares = Decimal::ZERO;
        let mut invested = Decimal::ZERO;
        let mut records = Vec::with_capacity(series.len());

        for point in series.points() {
            if schedule.contains(point.date) {
                if point.close <= Decimal::ZERO {
                    return Err(BacktestError::NonPositivePrice {
                        date: point.date,
                        close: point.close,
                    });
                }
                let amount = if point.date == first_purchase {
                    self.initial_investment
                } else {
                    self.monthly_investment
                };
                shares += amount / point.close;
                invested += amount;
            }

            let holdings = shares * point.close;
            records.push(DailyRecord {
                date: point.date,
                shares,
                invested,
                holdings,
                total: holdings,
                cash: Decimal::ZERO,
            });
        }

        Ok(records)
    }
}
