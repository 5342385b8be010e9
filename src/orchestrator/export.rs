use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::Value;

use crate::error::ExportError;

/// Persists downloaded results.
pub trait ResultsExporter: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the payload cannot be written.
    fn export(&self, payload: &Value) -> Result<PathBuf, ExportError>;
}

/// `marionette-test-results-YYYY-MM-DD.json`
#[must_use]
pub fn results_file_name(date: NaiveDate) -> String {
    format!(
        "marionette-test-results-{:04}-{:02}-{:02}.json",
        date.year(),
        date.month(),
        date.day()
    )
}

/// Writes pretty-printed JSON into a directory, one file per UTC day.
#[derive(Debug, Clone)]
pub struct JsonFileExporter {
    dir: PathBuf,
}

impl JsonFileExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or the file
    /// cannot be written.
    pub fn export_on(&self, payload: &Value, date: NaiveDate) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let body =
            serde_json::to_vec_pretty(payload).map_err(|source| ExportError::Serialize { source })?;
        let path = self.dir.join(results_file_name(date));
        std::fs::write(&path, body).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Wrote results to {}", path.display());
        Ok(path)
    }
}

impl ResultsExporter for JsonFileExporter {
    fn export(&self, payload: &Value) -> Result<PathBuf, ExportError> {
        self.export_on(payload, Utc::now().date_naive())
    }
}
