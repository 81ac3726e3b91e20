use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("The price series contains no data.")]
    EmptySeries,

    #[error("The price series is too short: {actual} data points, at least {required} required.")]
    InsufficientData { required: usize, actual: usize },

    #[error("Close price on purchase date {date} is {close}; prices must be positive.")]
    NonPositivePrice { date: NaiveDate, close: Decimal },

    #[error("Scheduling error: {0}")]
    Schedule(#[from] schedule::ScheduleError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
}
