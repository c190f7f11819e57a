use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Numeric input the skill model refuses to turn into a score.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("elapsed time must be positive, got {0}s")]
    NonPositiveElapsed(f64),

    #[error("{0} is not a finite number")]
    NonFinite(&'static str),

    #[error("skill model needs a finite mean and a positive spread, got mean {mean_wpm} and spread {std_dev_wpm}")]
    InvalidModel { mean_wpm: f64, std_dev_wpm: f64 },
}

/// The record store (or history log) could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("could not persist records: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("invalid quote pool: {0}")]
    QuotePool(String),
}
