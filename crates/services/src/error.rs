//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::MediaValidationError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by media gateways.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MediaError {
    #[error("media request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("media file is not available: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Invalid(#[from] MediaValidationError),
}

/// Errors emitted by the progress and bookmark services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while starting or finalizing a quiz session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session has not ended yet")]
    NotEnded,
    #[error("session summary already saved")]
    AlreadySaved,
    #[error(transparent)]
    Summary(#[from] quiz_core::model::SessionSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
