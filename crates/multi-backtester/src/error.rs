use thiserror::Error;

#[derive(Error, Debug)]
pub enum MultiBacktestError {
    #[error("A comparison needs at least {required} assets; {count} provided.")]
    TooFewAssets { required: usize, count: usize },

    #[error("A comparison supports at most {limit} assets; {count} provided.")]
    TooManyAssets { limit: usize, count: usize },

    #[error("The price series for asset '{code}' contains no data.")]
    EmptySeries { code: String },

    #[error("The assets share no trading dates; their histories cannot be compared.")]
    EmptyIntersection,

    #[error(
        "The shared trading calendar has only {actual} dates, at least {required} required."
    )]
    InsufficientSharedHistory { required: usize, actual: usize },

    #[error("Scheduling error: {0}")]
    Schedule(#[from] schedule::ScheduleError),

    #[error("Failed to build the comparison worker pool: {0}")]
    WorkerPool(String),
}
