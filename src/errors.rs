// errors.rs
use crate::scraper::BrowseError;
use thiserror::Error;

/// Errors that can end a discovery run, or a single source within it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Browse(BrowseError),

    #[error("Run cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Fatal errors abort the whole run instead of just the current source.
    pub fn is_fatal(&self) -> bool {
        match self {
            PipelineError::Cancelled => true,
            PipelineError::Browse(e) => e.is_fatal(),
        }
    }
}

impl From<BrowseError> for PipelineError {
    fn from(err: BrowseError) -> Self {
        match err {
            BrowseError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Browse(other),
        }
    }
}

/// Errors from the run store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DbError(String),

    #[error("Connection slot unavailable")]
    InternalError,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::DbError(err.to_string())
    }
}
