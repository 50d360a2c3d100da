//! Error types for session operations.

use crate::feed::FeedError;
use thiserror::Error;
use varsim_models::{EstimatorError, SeriesError};

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while driving a volatility session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Sample rejected by the return series
    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    /// Invalid parameters or a failed estimation pass
    #[error("Estimator error: {0}")]
    Estimator(#[from] EstimatorError),

    /// Invalid feed configuration or price
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Malformed session configuration
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}
