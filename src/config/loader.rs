use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["marionette.toml", "marionette.json"];

/// Load `explicit` when given, otherwise the first default file found in
/// `search_dir`.
///
/// # Errors
///
/// Returns an error when the chosen file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>, search_dir: &Path) -> AppResult<Option<ConfigFile>> {
    if let Some(path) = explicit {
        return load_config_file(path).map(Some);
    }

    let found = DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| search_dir.join(name))
        .find(|candidate| candidate.is_file());
    match found {
        Some(path) => {
            tracing::debug!("Using config file {}", path.display());
            load_config_file(&path).map(Some)
        }
        None => Ok(None),
    }
}

/// Parse one file, choosing the format by extension.
///
/// # Errors
///
/// Returns an error when the file cannot be read, has an unsupported
/// extension, or does not parse.
pub fn load_config_file(path: &Path) -> AppResult<ConfigFile> {
    let owned = || PathBuf::from(path);
    let content = std::fs::read_to_string(path).map_err(|source| {
        AppError::config(ConfigError::ReadConfig {
            path: owned(),
            source,
        })
    })?;
    parse_config(path.extension().and_then(|ext| ext.to_str()), &content).map_err(|err| {
        AppError::config(match err {
            ParseFailure::Toml(source) => ConfigError::ParseToml {
                path: owned(),
                source,
            },
            ParseFailure::Json(source) => ConfigError::ParseJson {
                path: owned(),
                source,
            },
            ParseFailure::Config(err) => err,
        })
    })
}

pub(crate) enum ParseFailure {
    Toml(toml::de::Error),
    Json(serde_json::Error),
    Config(ConfigError),
}

/// Parse already-read content for the given extension.
pub(crate) fn parse_config(extension: Option<&str>, content: &str) -> Result<ConfigFile, ParseFailure> {
    match extension {
        Some("toml") => toml::from_str(content).map_err(ParseFailure::Toml),
        Some("json") => serde_json::from_str(content).map_err(ParseFailure::Json),
        Some(ext) => Err(ParseFailure::Config(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(ParseFailure::Config(ConfigError::MissingExtension)),
    }
}
