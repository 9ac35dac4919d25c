use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised when constructing domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid state code: {0:?} (expected 2 ASCII letters)")]
    InvalidStateCode(String),

    #[error("Invalid rating: {0} (expected 1-5)")]
    InvalidRating(i64),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
