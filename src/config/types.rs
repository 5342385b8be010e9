use std::time::Duration;

use serde::Deserialize;

use crate::error::ValidationError;

/// Contents of `marionette.toml` / `marionette.json`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub request_timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub discovery_settle: Option<DurationValue>,
    pub results_poll_interval: Option<DurationValue>,
    pub results_buffer: Option<DurationValue>,
    pub live_poll_interval: Option<DurationValue>,
    pub min_test_duration: Option<u64>,
    pub metrics_minutes: Option<u32>,
    pub export_dir: Option<String>,
}

/// Either bare seconds or a string with a unit suffix.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
