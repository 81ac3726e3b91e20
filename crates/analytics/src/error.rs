use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error(
        "Principal curve covers {principal_points} dates but the simulation produced {record_points}; \
         both must be built from the same calendar"
    )]
    CurveMismatch {
        principal_points: usize,
        record_points: usize,
    },
}
