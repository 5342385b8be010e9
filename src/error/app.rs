use thiserror::Error;

use super::{BackendError, ConfigError, ExportError, SyncError, ValidationError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Join error: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn backend<E>(error: E) -> Self
    where
        E: Into<BackendError>,
    {
        error.into().into()
    }

    pub fn sync<E>(error: E) -> Self
    where
        E: Into<SyncError>,
    {
        error.into().into()
    }

    pub fn export<E>(error: E) -> Self
    where
        E: Into<ExportError>,
    {
        error.into().into()
    }

    /// True when the failure came from talking to the control plane rather
    /// than from local validation or configuration.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, AppError::Backend(_) | AppError::Sync(_))
    }
}
