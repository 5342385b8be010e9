//! Control-plane REST API.
mod http;
mod wire;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ServiceConfig;
use crate::error::BackendError;
use crate::metrics::{LiveSnapshot, MetricsPayload};

pub use http::HttpControlPlane;
pub use wire::BehaviourChange;

#[cfg(feature = "fuzzing")]
pub(crate) use wire::ServicesPayload;

/// One method per control-plane endpoint. Acknowledgements are the
/// backend's plain-text bodies.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// `GET /services`; a `null` list is an empty list.
    async fn fetch_services(&self) -> Result<Vec<ServiceConfig>, BackendError>;

    /// `POST /services/discover?fullRefresh={full_refresh}`
    async fn trigger_discovery(&self, full_refresh: bool) -> Result<String, BackendError>;

    /// `POST /services/{service}/reset`
    async fn reset_service(&self, service: &str) -> Result<String, BackendError>;

    /// `PUT /services/{service}/changeBehaviour`
    async fn change_behaviour(
        &self,
        service: &str,
        change: &BehaviourChange,
    ) -> Result<String, BackendError>;

    /// `POST /services/start-ab-test?durationSeconds={duration_seconds}`
    async fn start_ab_test(&self, duration_seconds: u64) -> Result<String, BackendError>;

    /// `GET /downloadresult/available`
    async fn results_available(&self) -> Result<bool, BackendError>;

    /// `GET /downloadresult`; the payload is opaque.
    async fn download_results(&self) -> Result<Value, BackendError>;

    /// `GET /metrics/{service}?minutes={minutes}`
    async fn fetch_metrics(
        &self,
        service: &str,
        minutes: u32,
    ) -> Result<MetricsPayload, BackendError>;

    /// `GET /metrics/{service}/live`
    async fn fetch_live_metrics(&self, service: &str) -> Result<LiveSnapshot, BackendError>;
}
