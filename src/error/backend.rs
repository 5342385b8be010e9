use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Base URL '{url}' cannot carry path segments.")]
    BaseUrlCannotBeABase { url: String },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{endpoint}: {message}")]
    Unavailable { endpoint: String, message: String },
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

impl BackendError {
    /// Message suitable for showing to the operator. Non-2xx answers carry the
    /// backend's own plain-text explanation, which is preferred when present.
    #[must_use]
    pub fn operator_message(&self) -> String {
        match self {
            BackendError::Status { body, status, .. } if body.trim().is_empty() => {
                format!("backend answered HTTP {}", status)
            }
            BackendError::Status { body, .. } => body.trim().to_owned(),
            other => other.to_string(),
        }
    }
}
