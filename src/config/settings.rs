use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult, ConfigError};
use crate::metrics::validate_window;

use super::types::{ConfigFile, DurationValue};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Values given on the command line (or through their env fallbacks).
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub base_url: Option<String>,
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

/// Fully resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Wait between triggering full discovery and re-reading the tree.
    pub discovery_settle: Duration,
    pub results_poll_interval: Duration,
    /// Added to the test duration before the first results check.
    pub results_buffer: Duration,
    pub live_poll_interval: Duration,
    pub min_test_duration_secs: u64,
    pub metrics_minutes: u32,
    pub export_dir: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            discovery_settle: Duration::from_secs(3),
            results_poll_interval: Duration::from_secs(10),
            results_buffer: Duration::from_secs(10),
            live_poll_interval: Duration::from_secs(30),
            min_test_duration_secs: 30,
            metrics_minutes: 15,
            export_dir: PathBuf::from("."),
        }
    }
}

fn file_duration(
    field: &'static str,
    value: Option<&DurationValue>,
    fallback: Duration,
) -> Result<Duration, ConfigError> {
    value.map_or(Ok(fallback), |value| {
        value
            .to_duration()
            .map_err(|err| ConfigError::InvalidDuration {
                field,
                message: err.to_string(),
            })
    })
}

impl ClientSettings {
    /// Layer command-line overrides over the config file over defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when a config file value is invalid.
    pub fn resolve(overrides: SettingsOverrides, file: Option<&ConfigFile>) -> AppResult<Self> {
        let defaults = Self::default();
        let Some(file) = file else {
            return Ok(defaults.with_overrides(overrides));
        };

        if file.min_test_duration == Some(0) {
            return Err(AppError::config(ConfigError::FieldMustBePositive {
                field: "min_test_duration",
            }));
        }
        let metrics_minutes = match file.metrics_minutes {
            Some(minutes) => validate_window(minutes).map_err(|err| {
                AppError::config(ConfigError::InvalidField {
                    field: "metrics_minutes",
                    message: err.to_string(),
                })
            })?,
            None => defaults.metrics_minutes,
        };

        let settings = Self {
            base_url: file.base_url.clone().unwrap_or(defaults.base_url),
            request_timeout: file_duration(
                "request_timeout",
                file.request_timeout.as_ref(),
                defaults.request_timeout,
            )?,
            connect_timeout: file_duration(
                "connect_timeout",
                file.connect_timeout.as_ref(),
                defaults.connect_timeout,
            )?,
            discovery_settle: file_duration(
                "discovery_settle",
                file.discovery_settle.as_ref(),
                defaults.discovery_settle,
            )?,
            results_poll_interval: file_duration(
                "results_poll_interval",
                file.results_poll_interval.as_ref(),
                defaults.results_poll_interval,
            )?,
            results_buffer: file_duration(
                "results_buffer",
                file.results_buffer.as_ref(),
                defaults.results_buffer,
            )?,
            live_poll_interval: file_duration(
                "live_poll_interval",
                file.live_poll_interval.as_ref(),
                defaults.live_poll_interval,
            )?,
            min_test_duration_secs: file
                .min_test_duration
                .unwrap_or(defaults.min_test_duration_secs),
            metrics_minutes,
            export_dir: file
                .export_dir
                .as_ref()
                .map_or(defaults.export_dir, PathBuf::from),
        };
        Ok(settings.with_overrides(overrides))
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(timeout) = overrides.request_timeout {
            self.request_timeout = timeout;
        }
        if let Some(timeout) = overrides.connect_timeout {
            self.connect_timeout = timeout;
        }
        self
    }
}
