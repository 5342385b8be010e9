use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use crate::backend::ControlPlane;
use crate::error::{AppError, AppResult, ValidationError};
use crate::notify::{Notice, Notifier};
use crate::schedule::ScheduledTask;

use super::duration::{TestDuration, describe_duration};
use super::export::ResultsExporter;
use super::state::{OrchestratorStatus, TestPhase, TestSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub min_duration_secs: u64,
    /// Added to the test length before the scheduled availability check.
    pub results_buffer: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            min_duration_secs: 30,
            results_buffer: Duration::from_secs(10),
        }
    }
}

/// Starts A/B tests and tracks when their results can be downloaded.
pub struct TestOrchestrator {
    backend: Arc<dyn ControlPlane>,
    notifier: Arc<dyn Notifier>,
    exporter: Arc<dyn ResultsExporter>,
    settings: OrchestratorSettings,
    status: watch::Sender<OrchestratorStatus>,
    scheduled_check: Mutex<Option<ScheduledTask>>,
    /// Set from a successful start until its scheduled check fires.
    check_pending: AtomicBool,
}

impl TestOrchestrator {
    pub fn new(
        backend: Arc<dyn ControlPlane>,
        notifier: Arc<dyn Notifier>,
        exporter: Arc<dyn ResultsExporter>,
        settings: OrchestratorSettings,
    ) -> Arc<Self> {
        let (status, _) = watch::channel(OrchestratorStatus::default());
        Arc::new(Self {
            backend,
            notifier,
            exporter,
            settings,
            status,
            scheduled_check: Mutex::new(None),
            check_pending: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn status(&self) -> OrchestratorStatus {
        self.status.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<OrchestratorStatus> {
        self.status.subscribe()
    }

    fn reject(&self, err: ValidationError) -> AppError {
        self.notifier.notify(Notice::error(err.to_string()));
        AppError::validation(err)
    }

    fn settle_after_failed_start(&self, previous: TestPhase) {
        self.status.send_modify(|status| status.phase = previous);
    }

    /// Start an A/B test and schedule one availability check for when it
    /// should be done.
    ///
    /// # Errors
    ///
    /// Returns a validation error (no request is sent) when another start is
    /// in flight or the duration is too short, and a backend error when the
    /// backend refuses the test.
    pub async fn start_test(self: &Arc<Self>, duration: TestDuration) -> AppResult<String> {
        let mut in_flight = false;
        let mut previous = TestPhase::Idle;
        self.status.send_if_modified(|status| {
            if status.phase.is_starting() {
                in_flight = true;
                return false;
            }
            previous = status.phase;
            status.phase = TestPhase::Validating;
            true
        });
        if in_flight {
            return Err(self.reject(ValidationError::TestStartInFlight));
        }

        let total = match duration.total_seconds() {
            Ok(total) if total < self.settings.min_duration_secs => {
                self.settle_after_failed_start(previous);
                return Err(self.reject(ValidationError::TestDurationTooShort {
                    total,
                    min: self.settings.min_duration_secs,
                }));
            }
            Ok(total) => total,
            Err(err) => {
                self.settle_after_failed_start(previous);
                return Err(self.reject(err));
            }
        };

        self.status
            .send_modify(|status| status.phase = TestPhase::Running);
        let ack = match self.backend.start_ab_test(total).await {
            Ok(ack) => ack,
            Err(err) => {
                self.settle_after_failed_start(previous);
                self.notifier.notify(Notice::error(format!(
                    "Failed to start A/B test: {}",
                    err.operator_message()
                )));
                return Err(AppError::backend(err));
            }
        };

        let check_after = Duration::from_secs(total).saturating_add(self.settings.results_buffer);
        self.check_pending.store(true, Ordering::Release);
        self.status.send_modify(|status| {
            status.phase = TestPhase::AwaitingResults;
            status.results_available = false;
            status.session = Some(TestSession {
                duration_seconds: total,
                started_at: Utc::now(),
                check_after,
            });
        });
        self.schedule_check(check_after);
        self.notifier.notify(Notice::info(format!(
            "A/B test started for {}: {}",
            describe_duration(total),
            ack.trim()
        )));
        Ok(ack)
    }

    fn schedule_check(self: &Arc<Self>, delay: Duration) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let task = ScheduledTask::delayed("results-check", delay, async move {
            if let Some(orchestrator) = weak.upgrade() {
                orchestrator.check_pending.store(false, Ordering::Release);
                orchestrator.check_results_availability().await;
            }
        });
        let replaced = self
            .scheduled_check
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        drop(replaced);
    }

    /// Drop the pending availability check, if any.
    pub fn cancel_scheduled_check(&self) {
        let pending = self
            .scheduled_check
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(pending);
    }

    /// Ask whether results can be downloaded. Failures count as "not
    /// available" and are only logged. While a started test has not reached
    /// its scheduled check, a positive answer belongs to an earlier run and
    /// counts as "not available".
    pub async fn check_results_availability(&self) -> bool {
        let reported = match self.backend.results_available().await {
            Ok(available) => available,
            Err(err) => {
                tracing::debug!("Results availability poll failed: {}", err);
                false
            }
        };
        let check_due = !self.check_pending.load(Ordering::Acquire);
        let mut available = reported;
        self.status.send_if_modified(|status| {
            if status.phase == TestPhase::AwaitingResults && !check_due {
                available = false;
            }
            let phase = status.phase.after_poll(available);
            let changed = phase != status.phase || status.results_available != available;
            status.phase = phase;
            status.results_available = available;
            changed
        });
        if reported && !available {
            tracing::debug!("Ignoring results from an earlier test");
        }
        available
    }

    /// Fetch the results and hand them to the exporter. Never changes the
    /// phase, so repeated downloads are allowed.
    ///
    /// # Errors
    ///
    /// Returns an error when the download or the export fails.
    pub async fn download_results(&self) -> AppResult<PathBuf> {
        let payload = self.backend.download_results().await.map_err(|err| {
            self.notifier.notify(Notice::error(format!(
                "Failed to download test results: {}",
                err.operator_message()
            )));
            AppError::backend(err)
        })?;
        let path = self.exporter.export(&payload).map_err(|err| {
            self.notifier.notify(Notice::error(format!(
                "Failed to save test results: {}",
                err
            )));
            AppError::export(err)
        })?;
        self.notifier
            .notify(Notice::info(format!("Results saved to {}", path.display())));
        Ok(path)
    }
}
