use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::backend::ControlPlane;
use crate::error::{AppError, AppResult, ValidationError};
use crate::schedule::ScheduledTask;

use super::aggregate::aggregate_series;
use super::display::{DisplayProfile, display_name, display_profile, display_unit};
use super::format::format_value;
use super::types::{ChartPoint, LiveSnapshot, MetricConfiguration, MetricsPayload};

/// Historical windows the backend is asked for, in minutes.
pub const METRIC_WINDOWS: [u32; 4] = [5, 15, 30, 60];
pub const DEFAULT_METRIC_WINDOW: u32 = 15;

/// # Errors
///
/// Returns an error when `minutes` is not one of [`METRIC_WINDOWS`].
pub fn validate_window(minutes: u32) -> Result<u32, ValidationError> {
    if METRIC_WINDOWS.contains(&minutes) {
        Ok(minutes)
    } else {
        Err(ValidationError::InvalidMetricsWindow { minutes })
    }
}

/// Both payloads as last fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelSnapshot {
    pub historical: MetricsPayload,
    pub live: LiveSnapshot,
}

impl PanelSnapshot {
    /// Union of historical and live keys, sorted.
    #[must_use]
    pub fn metric_keys(&self) -> Vec<&str> {
        self.historical
            .metrics
            .keys()
            .chain(self.live.metrics.keys())
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn configuration(&self, metric_key: &str) -> Option<&MetricConfiguration> {
        self.historical
            .configurations
            .get(metric_key)
            .or_else(|| self.live.configurations.get(metric_key))
    }

    #[must_use]
    pub fn view(&self, metric_key: &str) -> MetricView {
        let configuration = self.configuration(metric_key);
        let unit = display_unit(configuration);
        let current = self.live.current_value(metric_key);
        let series = self
            .historical
            .metrics
            .get(metric_key)
            .map(|series| aggregate_series(metric_key, series))
            .unwrap_or_default();
        MetricView {
            key: metric_key.to_owned(),
            display_name: display_name(metric_key, configuration),
            unit: unit.to_owned(),
            profile: display_profile(metric_key, unit, current),
            current,
            series,
        }
    }

    #[must_use]
    pub fn views(&self) -> Vec<MetricView> {
        self.metric_keys()
            .into_iter()
            .map(|key| self.view(key))
            .collect()
    }
}

/// Everything needed to show one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricView {
    pub key: String,
    pub display_name: String,
    pub unit: String,
    pub profile: DisplayProfile,
    pub current: Option<f64>,
    pub series: Vec<ChartPoint>,
}

impl MetricView {
    #[must_use]
    pub fn current_display(&self) -> String {
        format_value(self.profile.format, self.current, &self.unit)
    }

    #[must_use]
    pub fn summary(&self) -> Option<SeriesSummary> {
        let first = *self.series.first()?;
        let last = *self.series.last()?;
        let (min, max) = self
            .series
            .iter()
            .fold((first.value, first.value), |(min, max), point| {
                (min.min(point.value), max.max(point.value))
            });
        Some(SeriesSummary {
            points: self.series.len(),
            first,
            last,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub points: usize,
    pub first: ChartPoint,
    pub last: ChartPoint,
    pub min: f64,
    pub max: f64,
}

/// Metrics for one service, with an optional live refresh timer.
pub struct MetricsPanel {
    backend: Arc<dyn ControlPlane>,
    service: String,
    minutes: u32,
    state: Arc<watch::Sender<PanelSnapshot>>,
    live_refresh: Option<ScheduledTask>,
}

impl MetricsPanel {
    /// # Errors
    ///
    /// Returns an error when `minutes` is not an allowed window.
    pub fn new(
        backend: Arc<dyn ControlPlane>,
        service: impl Into<String>,
        minutes: u32,
    ) -> Result<Self, ValidationError> {
        let (state, _) = watch::channel(PanelSnapshot::default());
        Ok(Self {
            backend,
            service: service.into(),
            minutes: validate_window(minutes)?,
            state: Arc::new(state),
            live_refresh: None,
        })
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    #[must_use]
    pub const fn minutes(&self) -> u32 {
        self.minutes
    }

    #[must_use]
    pub fn snapshot(&self) -> PanelSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PanelSnapshot> {
        self.state.subscribe()
    }

    /// Change the historical window. Call [`MetricsPanel::load`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error when `minutes` is not an allowed window.
    pub fn set_window(&mut self, minutes: u32) -> Result<(), ValidationError> {
        self.minutes = validate_window(minutes)?;
        Ok(())
    }

    /// Fetch historical and live metrics together.
    ///
    /// # Errors
    ///
    /// Returns an error when the historical fetch fails. A failing live
    /// fetch only leaves the live snapshot empty.
    pub async fn load(&self) -> AppResult<()> {
        let (historical, live) = tokio::join!(
            self.backend.fetch_metrics(&self.service, self.minutes),
            self.backend.fetch_live_metrics(&self.service),
        );
        let live = live.unwrap_or_else(|err| {
            tracing::debug!("Live metrics for '{}' unavailable: {}", self.service, err);
            LiveSnapshot::default()
        });
        match historical {
            Ok(historical) => {
                self.state.send_replace(PanelSnapshot { historical, live });
                Ok(())
            }
            Err(err) => {
                self.state.send_modify(|snapshot| snapshot.live = live);
                Err(AppError::backend(err))
            }
        }
    }

    /// Re-fetch live values only. Failures keep the previous values.
    pub async fn refresh_live(&self) -> bool {
        poll_live(self.backend.as_ref(), &self.service, &self.state).await
    }

    /// Refresh live values every `period` until stopped or dropped.
    pub fn start_live_refresh(&mut self, period: Duration) {
        let backend = Arc::clone(&self.backend);
        let service = self.service.clone();
        let state = Arc::clone(&self.state);
        self.live_refresh = Some(ScheduledTask::periodic(
            "live-metrics",
            period,
            move || {
                let backend = Arc::clone(&backend);
                let service = service.clone();
                let state = Arc::clone(&state);
                async move {
                    poll_live(backend.as_ref(), &service, &state).await;
                }
            },
        ));
    }

    pub fn stop_live_refresh(&mut self) {
        self.live_refresh = None;
    }

    #[must_use]
    pub const fn is_refreshing(&self) -> bool {
        self.live_refresh.is_some()
    }
}

async fn poll_live(
    backend: &dyn ControlPlane,
    service: &str,
    state: &watch::Sender<PanelSnapshot>,
) -> bool {
    match backend.fetch_live_metrics(service).await {
        Ok(live) => {
            state.send_modify(|snapshot| snapshot.live = live);
            true
        }
        Err(err) => {
            tracing::debug!("Live metrics poll for '{}' failed: {}", service, err);
            false
        }
    }
}
