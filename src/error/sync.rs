use thiserror::Error;

use super::BackendError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(
        "Backend rejected {service}/{class}.{method} -> {behaviour}; local state resynchronised: {source}"
    )]
    ReconciliationMismatch {
        service: String,
        class: String,
        method: String,
        behaviour: String,
        #[source]
        source: Box<BackendError>,
    },
    #[error("Failed to reset service '{service}': {source}")]
    ResetFailed {
        service: String,
        #[source]
        source: BackendError,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
