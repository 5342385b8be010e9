//! Wires one backend to every component and owns their timers.
use std::sync::{Arc, Weak};

use crate::backend::{ControlPlane, HttpControlPlane};
use crate::config::ClientSettings;
use crate::discovery::DiscoveryController;
use crate::error::{AppError, AppResult, ValidationError};
use crate::metrics::{MetricsPanel, validate_window};
use crate::notify::Notifier;
use crate::orchestrator::{
    JsonFileExporter, OrchestratorSettings, ResultsExporter, TestOrchestrator,
};
use crate::schedule::ScheduledTask;
use crate::store::ConfigStore;
use crate::sync::SyncEngine;

const RESULTS_POLL_TASK: &str = "results-poll";

pub struct ControlSession {
    settings: ClientSettings,
    backend: Arc<dyn ControlPlane>,
    store: ConfigStore,
    sync: SyncEngine,
    discovery: Arc<DiscoveryController>,
    orchestrator: Arc<TestOrchestrator>,
    tasks: Vec<ScheduledTask>,
}

impl ControlSession {
    /// Session talking HTTP to `settings.base_url`, exporting into
    /// `settings.export_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn connect(settings: ClientSettings, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        let backend = HttpControlPlane::new(
            &settings.base_url,
            settings.request_timeout,
            settings.connect_timeout,
        )?;
        let exporter = Arc::new(JsonFileExporter::new(settings.export_dir.clone()));
        Ok(Self::with_backend(
            settings,
            Arc::new(backend),
            notifier,
            exporter,
        ))
    }

    pub fn with_backend(
        settings: ClientSettings,
        backend: Arc<dyn ControlPlane>,
        notifier: Arc<dyn Notifier>,
        exporter: Arc<dyn ResultsExporter>,
    ) -> Self {
        let store = ConfigStore::new();
        let sync = SyncEngine::new(Arc::clone(&backend), store.clone(), Arc::clone(&notifier));
        let discovery = Arc::new(DiscoveryController::new(
            Arc::clone(&backend),
            store.clone(),
            Arc::clone(&notifier),
            settings.discovery_settle,
        ));
        let orchestrator = TestOrchestrator::new(
            Arc::clone(&backend),
            notifier,
            exporter,
            OrchestratorSettings {
                min_duration_secs: settings.min_test_duration_secs,
                results_buffer: settings.results_buffer,
            },
        );
        Self {
            settings,
            backend,
            store,
            sync,
            discovery,
            orchestrator,
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    #[must_use]
    pub const fn store(&self) -> &ConfigStore {
        &self.store
    }

    #[must_use]
    pub const fn sync(&self) -> &SyncEngine {
        &self.sync
    }

    #[must_use]
    pub fn discovery(&self) -> &DiscoveryController {
        &self.discovery
    }

    #[must_use]
    pub const fn orchestrator(&self) -> &Arc<TestOrchestrator> {
        &self.orchestrator
    }

    /// Initial load: service tree plus one availability check.
    ///
    /// # Errors
    ///
    /// Returns an error when the service list cannot be fetched.
    pub async fn load(&self) -> AppResult<usize> {
        let (services, _) = tokio::join!(
            self.discovery.quick_refresh(),
            self.orchestrator.check_results_availability(),
        );
        services
    }

    /// Start the periodic results poll. Calling it twice is a no-op.
    pub fn start_background(&mut self) {
        if self
            .tasks
            .iter()
            .any(|task| task.name() == RESULTS_POLL_TASK)
        {
            return;
        }
        let weak: Weak<TestOrchestrator> = Arc::downgrade(&self.orchestrator);
        self.tasks.push(ScheduledTask::periodic(
            RESULTS_POLL_TASK,
            self.settings.results_poll_interval,
            move || {
                let weak = weak.clone();
                async move {
                    if let Some(orchestrator) = weak.upgrade() {
                        orchestrator.check_results_availability().await;
                    }
                }
            },
        ));
    }

    /// Start full discovery in the background, owned by this session.
    pub fn spawn_full_discovery(&mut self) {
        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(self.discovery.spawn_full_discovery());
    }

    /// Metrics panel for one service, using the session's backend.
    ///
    /// # Errors
    ///
    /// Returns an error when `minutes` is not an allowed window.
    pub fn metrics_panel(
        &self,
        service: &str,
        minutes: Option<u32>,
    ) -> Result<MetricsPanel, ValidationError> {
        let minutes = validate_window(minutes.unwrap_or(self.settings.metrics_minutes))?;
        MetricsPanel::new(Arc::clone(&self.backend), service, minutes)
    }

    /// Same as [`ControlSession::metrics_panel`], loaded once.
    ///
    /// # Errors
    ///
    /// Returns an error when the window is invalid or the historical fetch
    /// fails.
    pub async fn load_metrics(&self, service: &str, minutes: Option<u32>) -> AppResult<MetricsPanel> {
        let panel = self.metrics_panel(service, minutes).map_err(AppError::validation)?;
        panel.load().await?;
        Ok(panel)
    }

    #[must_use]
    pub fn active_tasks(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }

    /// Cancel every owned timer, including a pending results check.
    pub fn shutdown(&mut self) {
        if !self.tasks.is_empty() {
            tracing::debug!("Stopping {} background tasks", self.tasks.len());
        }
        self.tasks.clear();
        self.orchestrator.cancel_scheduled_check();
    }
}

impl Drop for ControlSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
