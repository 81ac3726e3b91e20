//! Purchase-date scheduling and principal-curve construction.
//!
//! This is a pure logic crate: it knows nothing about prices or portfolios.
//! Given a trading calendar it derives the monthly purchase dates, and from
//! those the cumulative capital committed as of any date.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashSet;

pub mod error;

pub use error::ScheduleError;

/// The ordered purchase dates of a fixed-contribution plan.
///
/// The first entry is always the calendar's first trading date. Every later
/// entry is the earliest trading date on or after "previous entry plus one
/// calendar month". Dates are held both in order and as a set so membership
/// checks during simulation are O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestmentSchedule {
    dates: Vec<NaiveDate>,
    members: HashSet<NaiveDate>,
}

impl InvestmentSchedule {
    /// Derives the schedule from a trading calendar.
    ///
    /// `calendar` must be sorted ascending with no duplicate dates. The
    /// schedule seeds with the first date and then repeatedly advances the
    /// anchor by one calendar month (Jan 31 + 1 month = Feb 28/29), snapping
    /// each target to the earliest trading date at or after it. The loop
    /// stops when the calendar runs out of dates past the target.
    pub fn build(calendar: &[NaiveDate]) -> Result<Self, ScheduleError> {
        let (&start, &end) = match (calendar.first(), calendar.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ScheduleError::EmptyCalendar),
        };

        let mut dates = vec![start];
        let mut anchor = start;

        while anchor < end {
            let target = anchor
                .checked_add_months(Months::new(1))
                .ok_or(ScheduleError::DateOverflow(anchor))?;

            // Earliest trading date at or after the target.
            let idx = calendar.partition_point(|&d| d < target);
            let Some(&next) = calendar.get(idx) else {
                break;
            };
            if next > end || dates.last() == Some(&next) {
                break;
            }

            dates.push(next);
            anchor = next;
        }

        tracing::debug!(
            purchases = dates.len(),
            start = %start,
            end = %end,
            "built investment schedule"
        );

        let members = dates.iter().copied().collect();
        Ok(Self { dates, members })
    }

    /// O(1) membership test used on every simulated day.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.members.contains(&date)
    }

    /// The initial purchase date (always the calendar's first trading date).
    pub fn first(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Cumulative capital committed per date, independent of prices.
///
/// With `k` purchases made on or before a date, the principal there is
/// `initial + (k - 1) * monthly` (zero when `k` is zero). This is the
/// zero-growth baseline the strategy's returns are measured against, and it
/// must agree exactly with the simulator's invested-so-far bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalCurve {
    points: Vec<(NaiveDate, Decimal)>,
}

impl PrincipalCurve {
    pub fn build(
        schedule: &InvestmentSchedule,
        initial: Decimal,
        monthly: Decimal,
        calendar: &[NaiveDate],
    ) -> Self {
        let mut points = Vec::with_capacity(calendar.len());
        let mut purchases = 0usize;

        for &date in calendar {
            while purchases < schedule.len() && schedule.dates()[purchases] <= date {
                purchases += 1;
            }
            let principal = if purchases == 0 {
                Decimal::ZERO
            } else {
                initial + Decimal::from(purchases as u64 - 1) * monthly
            };
            points.push((date, principal));
        }

        Self { points }
    }

    pub fn points(&self) -> &[(NaiveDate, Decimal)] {
        &self.points
    }

    pub fn final_principal(&self) -> Decimal {
        self.points.last().map(|&(_, p)| p).unwrap_or(Decimal::ZERO)
    }
}
