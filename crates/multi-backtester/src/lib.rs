use backtester::Backtester;
use chrono::NaiveDate;
use core_types::{AssetInfo, PriceSeries};
use rust_decimal::Decimal;
use schedule::{InvestmentSchedule, PrincipalCurve};
use std::collections::{BTreeMap, HashSet};
use std::sync::mpsc;
use uuid::Uuid;

pub mod error;
pub mod report;

pub use error::MultiBacktestError;
pub use report::{AssetOutcome, MultiBacktestReport};

/// Bounds on how many assets one comparison may contain.
pub const MIN_ASSETS: usize = 2;
pub const MAX_ASSETS: usize = 5;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Coordinates a comparison backtest across several assets.
///
/// The coordinator intersects the assets' trading calendars, builds one
/// shared purchase schedule and principal curve from the intersection, and
/// runs the single-asset pipeline per asset on a bounded worker pool. Each
/// worker operates on its own restricted copy of its own series, so no
/// locking is needed; failures are captured per asset instead of aborting
/// the batch.
pub struct MultiBacktester {
    initial_investment: Decimal,
    monthly_investment: Decimal,
    // Upper bound on worker threads; the pool never exceeds the asset count.
    max_workers: usize,
}

impl MultiBacktester {
    pub fn new(initial_investment: Decimal, monthly_investment: Decimal, max_workers: usize) -> Self {
        Self {
            initial_investment,
            monthly_investment,
            max_workers,
        }
    }

    /// Runs the comparison. Structural problems (asset count, an empty
    /// series, no shared history) fail the whole batch up front; anything
    /// that goes wrong inside a single asset's simulation is reported as a
    /// `Failed` outcome in that asset's slot.
    ///
    /// The returned outcomes are always in the caller's asset order,
    /// regardless of which worker finished first.
    pub fn run(
        &self,
        requests: &[(AssetInfo, PriceSeries)],
    ) -> Result<MultiBacktestReport, MultiBacktestError> {
        self.validate(requests)?;

        let calendar = self.shared_calendar(requests)?;
        let calendar_set: HashSet<NaiveDate> = calendar.iter().copied().collect();
        let schedule = InvestmentSchedule::build(&calendar)?;
        let principal = PrincipalCurve::build(
            &schedule,
            self.initial_investment,
            self.monthly_investment,
            &calendar,
        );

        tracing::info!(
            assets = requests.len(),
            trading_days = calendar.len(),
            purchases = schedule.len(),
            "starting comparison backtest"
        );

        let outcomes = self.run_all(requests, &calendar_set, &schedule)?;

        Ok(MultiBacktestReport {
            initial_investment: self.initial_investment,
            monthly_investment: self.monthly_investment,
            investment_dates: schedule
                .dates()
                .iter()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .collect(),
            benchmark_curve: principal
                .points()
                .iter()
                .map(|&(date, value)| (date.format(DATE_FORMAT).to_string(), value))
                .collect::<BTreeMap<String, Decimal>>(),
            trading_days: calendar.len(),
            outcomes,
        })
    }

    fn validate(&self, requests: &[(AssetInfo, PriceSeries)]) -> Result<(), MultiBacktestError> {
        if requests.len() < MIN_ASSETS {
            return Err(MultiBacktestError::TooFewAssets {
                required: MIN_ASSETS,
                count: requests.len(),
            });
        }
        if requests.len() > MAX_ASSETS {
            return Err(MultiBacktestError::TooManyAssets {
                limit: MAX_ASSETS,
                count: requests.len(),
            });
        }
        for (asset, series) in requests {
            if series.is_empty() {
                return Err(MultiBacktestError::EmptySeries {
                    code: asset.code.clone(),
                });
            }
        }
        Ok(())
    }

    /// Intersects every asset's date set and sorts the result ascending.
    /// Every asset is restricted to this same calendar, so a calendar below
    /// the single-asset minimum is a structural failure, not a per-asset one.
    fn shared_calendar(
        &self,
        requests: &[(AssetInfo, PriceSeries)],
    ) -> Result<Vec<NaiveDate>, MultiBacktestError> {
        let mut shared = requests[0].1.date_set();
        for (_, series) in &requests[1..] {
            let other = series.date_set();
            shared.retain(|date| other.contains(date));
        }
        if shared.is_empty() {
            return Err(MultiBacktestError::EmptyIntersection);
        }

        let mut calendar: Vec<NaiveDate> = shared.into_iter().collect();
        calendar.sort_unstable();

        if calendar.len() < backtester::MIN_SERIES_LEN {
            return Err(MultiBacktestError::InsufficientSharedHistory {
                required: backtester::MIN_SERIES_LEN,
                actual: calendar.len(),
            });
        }
        Ok(calendar)
    }

    /// Fans the per-asset runs out onto a pool of `min(max_workers, assets)`
    /// threads and fans the results back in over an index-tagged channel.
    /// Completion order is nondeterministic; sorting by the request index
    /// restores the caller's order before anything is returned.
    fn run_all(
        &self,
        requests: &[(AssetInfo, PriceSeries)],
        calendar_set: &HashSet<NaiveDate>,
        schedule: &InvestmentSchedule,
    ) -> Result<Vec<AssetOutcome>, MultiBacktestError> {
        let workers = self.max_workers.max(1).min(requests.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| MultiBacktestError::WorkerPool(e.to_string()))?;

        let (tx, rx) = mpsc::channel();
        // The scope takes the sender by value, so every clone is dropped once
        // the workers finish and the receiver below drains to completion.
        pool.scope(move |s| {
            for (index, (asset, series)) in requests.iter().enumerate() {
                let tx = tx.clone();
                s.spawn(move |_| {
                    let outcome = self.run_single(asset, series, calendar_set, schedule);
                    // The receiver outlives the scope; a send cannot fail here.
                    let _ = tx.send((index, outcome));
                });
            }
        });

        let mut indexed: Vec<(usize, AssetOutcome)> = rx.into_iter().collect();
        indexed.sort_by_key(|&(index, _)| index);
        Ok(indexed.into_iter().map(|(_, outcome)| outcome).collect())
    }

    fn run_single(
        &self,
        asset: &AssetInfo,
        series: &PriceSeries,
        calendar_set: &HashSet<NaiveDate>,
        schedule: &InvestmentSchedule,
    ) -> AssetOutcome {
        let restricted = series.restrict_to(calendar_set);
        let run_id = Uuid::new_v4();
        let engine = Backtester::new(run_id, self.initial_investment, self.monthly_investment);

        match engine.run_with_schedule(&restricted, schedule) {
            Ok(report) => AssetOutcome::Completed {
                asset: asset.clone(),
                report,
            },
            Err(e) => {
                tracing::warn!(run_id = %run_id, asset = %asset, error = %e, "asset leg failed");
                AssetOutcome::Failed {
                    asset: asset.clone(),
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use core_types::PricePoint;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn asset(code: &str) -> AssetInfo {
        AssetInfo {
            code: code.to_string(),
            name: code.to_string(),
            market: "US".to_string(),
        }
    }

    fn daily_series(start: NaiveDate, days: usize, price: impl Fn(usize) -> Decimal) -> PriceSeries {
        PriceSeries::new(
            (0..days)
                .map(|i| PricePoint {
                    date: start + Days::new(i as u64),
                    close: price(i),
                })
                .collect(),
        )
    }

    fn coordinator() -> MultiBacktester {
        MultiBacktester::new(dec!(1000), dec!(500), 4)
    }

    #[test]
    fn one_asset_is_too_few() {
        let requests = vec![(asset("A"), daily_series(d(2023, 5, 1), 60, |_| dec!(10)))];
        let result = coordinator().run(&requests);
        assert!(matches!(
            result,
            Err(MultiBacktestError::TooFewAssets { count: 1, .. })
        ));
    }

    #[test]
    fn six_assets_are_too_many() {
        let requests: Vec<_> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|code| (asset(code), daily_series(d(2023, 5, 1), 60, |_| dec!(10))))
            .collect();
        let result = coordinator().run(&requests);
        assert!(matches!(
            result,
            Err(MultiBacktestError::TooManyAssets { count: 6, .. })
        ));
    }

    #[test]
    fn empty_series_fails_the_batch() {
        let requests = vec![
            (asset("A"), daily_series(d(2023, 5, 1), 60, |_| dec!(10))),
            (asset("B"), PriceSeries::new(vec![])),
        ];
        let result = coordinator().run(&requests);
        assert!(matches!(
            result,
            Err(MultiBacktestError::EmptySeries { code }) if code == "B"
        ));
    }

    #[test]
    fn disjoint_calendars_fail_with_empty_intersection() {
        let requests = vec![
            (asset("A"), daily_series(d(2023, 1, 1), 60, |_| dec!(10))),
            (asset("B"), daily_series(d(2024, 1, 1), 60, |_| dec!(10))),
        ];
        let result = coordinator().run(&requests);
        assert!(matches!(result, Err(MultiBacktestError::EmptyIntersection)));
    }

    #[test]
    fn short_shared_history_fails_the_batch() {
        // 60 and 20 day series overlapping on the last 20 days only.
        let requests = vec![
            (asset("A"), daily_series(d(2023, 5, 1), 60, |_| dec!(10))),
            (asset("B"), daily_series(d(2023, 6, 10), 20, |_| dec!(10))),
        ];
        let result = coordinator().run(&requests);
        assert!(matches!(
            result,
            Err(MultiBacktestError::InsufficientSharedHistory { actual: 20, .. })
        ));
    }

    #[test]
    fn shared_schedule_and_baseline_apply_to_every_asset() {
        // B has extra earlier history; only the shared window counts.
        let requests = vec![
            (asset("A"), daily_series(d(2023, 5, 1), 60, |_| dec!(10))),
            (asset("B"), daily_series(d(2023, 4, 1), 90, |_| dec!(20))),
        ];
        let report = coordinator().run(&requests).unwrap();

        assert_eq!(report.trading_days, 60);
        assert_eq!(report.investment_dates, vec!["2023-05-01", "2023-06-01"]);
        assert_eq!(report.benchmark_curve["2023-06-29"], dec!(1500));

        for outcome in &report.outcomes {
            let r = outcome.report().expect("both legs should complete");
            assert_eq!(r.total_investments, 2);
            assert_eq!(r.total_invested, dec!(1500));
            assert_eq!(r.strategy_stats.trading_days, 60);
        }
    }

    #[test]
    fn outcomes_keep_request_order_even_when_one_asset_fails() {
        // C carries a zero close on the second shared purchase date, which
        // fails its leg mid-simulation while A and B complete.
        let requests = vec![
            (asset("A"), daily_series(d(2023, 5, 1), 60, |_| dec!(10))),
            (asset("B"), daily_series(d(2023, 5, 1), 60, |i| dec!(15) + Decimal::from(i as u64))),
            (
                asset("C"),
                daily_series(d(2023, 5, 1), 60, |i| {
                    if i == 31 { Decimal::ZERO } else { dec!(10) }
                }),
            ),
        ];
        let report = coordinator().run(&requests).unwrap();

        let codes: Vec<&str> = report
            .outcomes
            .iter()
            .map(|o| o.asset().code.as_str())
            .collect();
        assert_eq!(codes, vec!["A", "B", "C"]);

        assert!(report.outcomes[0].report().is_some());
        assert!(report.outcomes[1].report().is_some());
        assert!(matches!(
            &report.outcomes[2],
            AssetOutcome::Failed { error, .. } if error.contains("2023-06-01")
        ));
    }

    #[test]
    fn worker_cap_does_not_change_results() {
        let requests: Vec<_> = ["A", "B", "C", "D", "E"]
            .iter()
            .enumerate()
            .map(|(n, code)| {
                (
                    asset(code),
                    daily_series(d(2023, 5, 1), 90, move |i| {
                        dec!(10) + Decimal::from((i * (n + 1)) as u64 % 13)
                    }),
                )
            })
            .collect();

        let serial = MultiBacktester::new(dec!(1000), dec!(500), 1)
            .run(&requests)
            .unwrap();
        let parallel = MultiBacktester::new(dec!(1000), dec!(500), 8)
            .run(&requests)
            .unwrap();
        assert_eq!(serial, parallel);
    }
}
