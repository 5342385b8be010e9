use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Test duration must be at least {min} seconds (got {total}).")]
    TestDurationTooShort { total: u64, min: u64 },
    #[error("Test duration overflow.")]
    TestDurationOverflow,
    #[error("A test start is already in flight.")]
    TestStartInFlight,
    #[error("Unknown service '{service}'.")]
    UnknownService { service: String },
    #[error("Unknown method '{class}.{method}' in service '{service}'.")]
    UnknownMethod {
        service: String,
        class: String,
        method: String,
    },
    #[error("Behaviour '{behaviour}' is not available for {class}.{method} (available: {available}).")]
    BehaviourNotAvailable {
        class: String,
        method: String,
        behaviour: String,
        available: String,
    },
    #[error("Metrics window must be one of 5, 15, 30, or 60 minutes (got {minutes}).")]
    InvalidMetricsWindow { minutes: u32 },
    #[error("Invalid number '{value}': {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Failed to build runtime: {source}")]
    RuntimeBuildFailed {
        #[source]
        source: std::io::Error,
    },
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
