//! Configuration file loading and settings resolution.
mod loader;
mod parse;
mod settings;
pub mod types;


pub use loader::{DEFAULT_CONFIG_FILES, load_config, load_config_file};
pub use settings::{ClientSettings, DEFAULT_BASE_URL, SettingsOverrides};

pub(crate) use parse::parse_duration_value;
