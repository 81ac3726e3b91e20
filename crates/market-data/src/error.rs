use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Failed to read price data: {0}")]
    Read(#[from] csv::Error),

    #[error("Price file '{path}' has no '{column}' column.")]
    MissingColumn { path: String, column: String },

    #[error("Price file '{path}' contains no rows.")]
    EmptySeries { path: String },
}
