use std::time::Duration;

use clap::Parser;

use crate::args::CtlArgs;
use crate::args::parsers::parse_duration_arg;
use crate::backend::ServicesPayload;
use crate::config::types::ConfigFile;
use crate::config::{ClientSettings, SettingsOverrides, parse_duration_value};
use crate::domain::ConfigTree;
use crate::error::{AppError, AppResult, ConfigError};
use crate::metrics::{ChartPoint, LiveSnapshot, MetricsPayload, aggregate_series};

/// Parses a duration argument (e.g. `10s`, `500ms`).
///
/// # Errors
///
/// Returns an error when the duration is invalid or zero.
pub fn parse_duration_arg_input(input: &str) -> AppResult<Duration> {
    parse_duration_arg(input)
}

/// Parses a duration value from config.
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_value_input(input: &str) -> AppResult<Duration> {
    parse_duration_value(input).map_err(AppError::from)
}

/// Parses command-line tokens (without the program name).
///
/// # Errors
///
/// Returns an error when clap rejects the arguments.
pub fn parse_cli_args_input(tokens: &[&str]) -> AppResult<()> {
    let args = std::iter::once("marionette-ctl").chain(tokens.iter().copied());
    CtlArgs::try_parse_from(args)?;
    Ok(())
}

/// Parses TOML config and resolves it over the defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn resolve_config_from_toml(input: &str) -> AppResult<ClientSettings> {
    let config: ConfigFile = toml::from_str(input).map_err(|err| {
        AppError::config(ConfigError::ParseToml {
            path: "fuzz.toml".into(),
            source: err,
        })
    })?;
    ClientSettings::resolve(SettingsOverrides::default(), Some(&config))
}

/// Parses JSON config and resolves it over the defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn resolve_config_from_json(input: &[u8]) -> AppResult<ClientSettings> {
    let config: ConfigFile = serde_json::from_slice(input)?;
    ClientSettings::resolve(SettingsOverrides::default(), Some(&config))
}

/// Loads a config file from disk to exercise extension handling.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn load_config_file_input(path: &std::path::Path) -> AppResult<()> {
    crate::config::load_config_file(path).map(|_| ())
}

/// Decodes a `GET /services` body into a tree.
///
/// # Errors
///
/// Returns an error when the body is not a services payload.
pub fn decode_services_input(input: &[u8]) -> AppResult<ConfigTree> {
    let payload: ServicesPayload = serde_json::from_slice(input)?;
    Ok(ConfigTree::from_services(payload.into_services()))
}

/// Decodes a historical metrics body and aggregates every key.
///
/// # Errors
///
/// Returns an error when the body is not a metrics payload.
pub fn aggregate_metrics_input(input: &[u8]) -> AppResult<Vec<(String, Vec<ChartPoint>)>> {
    let payload: MetricsPayload = serde_json::from_slice(input)?;
    Ok(payload
        .metrics
        .iter()
        .map(|(key, series)| (key.clone(), aggregate_series(key, series)))
        .collect())
}

/// Decodes a live metrics body.
///
/// # Errors
///
/// Returns an error when the body is not a live snapshot.
pub fn decode_live_input(input: &[u8]) -> AppResult<LiveSnapshot> {
    serde_json::from_slice(input).map_err(AppError::from)
}
