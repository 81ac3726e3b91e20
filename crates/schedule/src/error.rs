use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Cannot build an investment schedule from an empty trading calendar.")]
    EmptyCalendar,

    #[error("Date arithmetic overflowed while advancing one month past {0}.")]
    DateOverflow(NaiveDate),
}
