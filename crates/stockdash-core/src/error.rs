//! Error types for Stockdash Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
