use std::time::Duration;

use crate::config::parse_duration_value;
use crate::error::{AppError, AppResult, ValidationError};
use crate::metrics::validate_window;

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    let duration = parse_duration_value(s)?;
    if duration.is_zero() {
        return Err(AppError::validation(ValidationError::DurationZero));
    }
    Ok(duration)
}

pub(super) fn parse_metrics_window(s: &str) -> AppResult<u32> {
    let minutes: u32 = s.trim().parse().map_err(|source| {
        AppError::validation(ValidationError::InvalidNumber {
            value: s.to_owned(),
            source,
        })
    })?;
    validate_window(minutes).map_err(AppError::from)
}
