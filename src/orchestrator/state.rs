use std::time::Duration;

use chrono::{DateTime, Utc};

/// Where the orchestrator is in the test lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TestPhase {
    #[default]
    Idle,
    Validating,
    Running,
    AwaitingResults,
    ResultsReady,
}

impl TestPhase {
    /// A start request is between validation and the backend's answer.
    #[must_use]
    pub const fn is_starting(self) -> bool {
        matches!(self, TestPhase::Validating | TestPhase::Running)
    }

    /// Phase after an availability poll answered `available`.
    #[must_use]
    pub const fn after_poll(self, available: bool) -> Self {
        match (self, available) {
            (TestPhase::Validating | TestPhase::Running, _) => self,
            (_, true) => TestPhase::ResultsReady,
            (TestPhase::ResultsReady, false) => TestPhase::Idle,
            (TestPhase::Idle | TestPhase::AwaitingResults, false) => self,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TestPhase::Idle => "idle",
            TestPhase::Validating => "validating",
            TestPhase::Running => "running",
            TestPhase::AwaitingResults => "awaiting results",
            TestPhase::ResultsReady => "results ready",
        }
    }
}

/// The most recently started test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSession {
    pub duration_seconds: u64,
    pub started_at: DateTime<Utc>,
    /// Delay between the start and the scheduled availability check.
    pub check_after: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestratorStatus {
    pub phase: TestPhase,
    pub results_available: bool,
    pub session: Option<TestSession>,
}
