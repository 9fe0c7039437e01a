use thiserror::Error;

/// Failure kinds signalled by the matching core.
///
/// None of these abort the process: they are handed to the caller, which
/// decides whether to continue the run or stop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    /// A required table is absent or has no series / no rows.
    #[error("missing data: {0}")]
    MissingData(String),

    /// Row counts or x-grids disagree between two compared tables.
    #[error("misaligned data: {0}")]
    MisalignedData(String),

    /// Observations lack a required column, or a parameter is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type MatchResult<T> = std::result::Result<T, MatchError>;
