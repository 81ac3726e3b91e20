use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One trading day's closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// An ordered daily close-price history for a single asset.
///
/// The data provider is responsible for delivering the points sorted
/// ascending by date with no duplicates (see `market-data`). The engine
/// treats the series as read-only input and only enforces its minimum-length
/// requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// The series' trading calendar, in series order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// The series' trading dates as a set, for intersection tests.
    pub fn date_set(&self) -> HashSet<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// A copy of the series containing only the dates in `calendar`.
    /// Order is preserved, so the restriction of a sorted series is sorted.
    pub fn restrict_to(&self, calendar: &HashSet<NaiveDate>) -> PriceSeries {
        PriceSeries {
            points: self
                .points
                .iter()
                .filter(|p| calendar.contains(&p.date))
                .copied()
                .collect(),
        }
    }
}

/// Identifies one asset in a backtest or comparison request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// The asset's symbol (e.g. "AAPL", "600519").
    pub code: String,
    /// A human-readable display name.
    pub name: String,
    /// The market the symbol belongs to (e.g. "US", "A-Share").
    pub market: String,
}

impl fmt::Display for AssetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.market)
    }
}

/// Portfolio state recorded at the close of a single trading day.
///
/// The strategy is fully invested: `cash` is always zero and `total` equals
/// `holdings`. Both fields are kept so the serialized record matches the
/// result payload consumed by external transports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Cumulative shares held. Never decreases; the strategy only buys.
    pub shares: Decimal,
    /// Cumulative capital committed as of this date.
    pub invested: Decimal,
    /// Market value of the held shares at this date's close.
    pub holdings: Decimal,
    pub total: Decimal,
    pub cash: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, n).unwrap()
    }

    fn series(days: &[u32]) -> PriceSeries {
        PriceSeries::new(
            days.iter()
                .map(|&n| PricePoint {
                    date: day(n),
                    close: dec!(10),
                })
                .collect(),
        )
    }

    #[test]
    fn restriction_preserves_order() {
        let full = series(&[2, 3, 4, 5, 6]);
        let calendar: HashSet<NaiveDate> = [day(6), day(3), day(4)].into_iter().collect();

        let restricted = full.restrict_to(&calendar);
        assert_eq!(restricted.dates(), vec![day(3), day(4), day(6)]);
    }

    #[test]
    fn restriction_to_disjoint_calendar_is_empty() {
        let full = series(&[2, 3, 4]);
        let calendar: HashSet<NaiveDate> = [day(20), day(21)].into_iter().collect();

        assert!(full.restrict_to(&calendar).is_empty());
    }

    #[test]
    fn first_and_last_date() {
        let s = series(&[2, 3, 9]);
        assert_eq!(s.first_date(), Some(day(2)));
        assert_eq!(s.last_date(), Some(day(9)));
        assert_eq!(PriceSeries::new(vec![]).first_date(), None);
    }
}
