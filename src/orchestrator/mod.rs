//! A/B test lifecycle: start, availability tracking, and download.
mod duration;
mod engine;
mod export;
mod state;

#[cfg(test)]
mod tests;

pub use duration::{TestDuration, describe_duration};
pub use engine::{OrchestratorSettings, TestOrchestrator};
pub use export::{JsonFileExporter, ResultsExporter, results_file_name};
pub use state::{OrchestratorStatus, TestPhase, TestSession};
