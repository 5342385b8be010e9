mod app;
mod backend;
mod config;
mod export;
mod sync;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use backend::BackendError;
pub use config::ConfigError;
pub use export::ExportError;
pub use sync::SyncError;
pub use validation::ValidationError;
