use crate::error::ValidationError;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3600;

/// Test length as entered by the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestDuration {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TestDuration {
    #[must_use]
    pub const fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    #[must_use]
    pub const fn from_seconds(seconds: u64) -> Self {
        Self::new(0, 0, seconds)
    }

    /// # Errors
    ///
    /// Returns an error when the total does not fit in `u64` seconds.
    pub fn total_seconds(&self) -> Result<u64, ValidationError> {
        self.hours
            .checked_mul(SECS_PER_HOUR)
            .and_then(|total| {
                self.minutes
                    .checked_mul(SECS_PER_MINUTE)
                    .and_then(|minutes| total.checked_add(minutes))
            })
            .and_then(|total| total.checked_add(self.seconds))
            .ok_or(ValidationError::TestDurationOverflow)
    }
}

fn unit(count: u64, singular: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}s", count, singular)
    }
}

/// Human form of a duration, e.g. `5 minutes` or
/// `1 hour, 2 minutes, 5 seconds`. Zero components are left out.
#[must_use]
pub fn describe_duration(total_seconds: u64) -> String {
    let hours = total_seconds / SECS_PER_HOUR;
    let minutes = (total_seconds % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let seconds = total_seconds % SECS_PER_MINUTE;

    let parts: Vec<String> = [(hours, "hour"), (minutes, "minute"), (seconds, "second")]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, name)| unit(count, name))
        .collect();
    if parts.is_empty() {
        unit(0, "second")
    } else {
        parts.join(", ")
    }
}
