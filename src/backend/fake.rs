use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{ConfigTree, ServiceConfig};
use crate::error::BackendError;
use crate::metrics::{LiveSnapshot, MetricsPayload};

use super::{BehaviourChange, ControlPlane};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unavailable(endpoint: &str) -> BackendError {
    BackendError::Unavailable {
        endpoint: endpoint.to_owned(),
        message: "simulated failure".to_owned(),
    }
}

/// In-memory control plane. Successful behaviour changes and resets are
/// applied to `services`, which acts as the server-side truth.
#[derive(Debug, Default)]
pub(crate) struct FakeControlPlane {
    pub(crate) services: Mutex<Vec<ServiceConfig>>,
    pub(crate) fail_fetch: AtomicBool,
    pub(crate) fail_change: AtomicBool,
    pub(crate) fail_reset: AtomicBool,
    pub(crate) fail_discovery: AtomicBool,
    pub(crate) start_rejection: Mutex<Option<String>>,
    pub(crate) available: AtomicBool,
    pub(crate) fail_available: AtomicBool,
    pub(crate) results: Mutex<Value>,
    pub(crate) metrics: Mutex<MetricsPayload>,
    pub(crate) live: Mutex<LiveSnapshot>,
    pub(crate) fail_metrics: AtomicBool,
    pub(crate) fail_live: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl FakeControlPlane {
    pub(crate) fn with_services(services: Vec<ServiceConfig>) -> Self {
        Self {
            services: Mutex::new(services),
            ..Self::default()
        }
    }

    pub(crate) fn set_flag(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }

    pub(crate) fn server_tree(&self) -> ConfigTree {
        ConfigTree::from_services(lock(&self.services).clone())
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|recorded| recorded.as_str() == call)
            .count()
    }

    fn record(&self, call: impl Into<String>) {
        lock(&self.calls).push(call.into());
    }

    fn failing(flag: &AtomicBool) -> bool {
        flag.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn fetch_services(&self) -> Result<Vec<ServiceConfig>, BackendError> {
        self.record("fetch_services");
        if Self::failing(&self.fail_fetch) {
            return Err(unavailable("GET /services"));
        }
        Ok(lock(&self.services).clone())
    }

    async fn trigger_discovery(&self, full_refresh: bool) -> Result<String, BackendError> {
        self.record(format!("trigger_discovery:{}", full_refresh));
        if Self::failing(&self.fail_discovery) {
            return Err(unavailable("POST /services/discover"));
        }
        Ok("Discovery started".to_owned())
    }

    async fn reset_service(&self, service: &str) -> Result<String, BackendError> {
        self.record(format!("reset_service:{}", service));
        if Self::failing(&self.fail_reset) {
            return Err(unavailable("POST /services/reset"));
        }
        let mut services = lock(&self.services);
        for method in services
            .iter_mut()
            .filter(|entry| entry.service_name == service)
            .flat_map(|entry| entry.class_configs.iter_mut())
            .flat_map(|class| class.method_configs.iter_mut())
        {
            method.current_behaviour_id = method.default_behaviour_id.clone();
        }
        Ok(format!("Reset {}", service))
    }

    async fn change_behaviour(
        &self,
        service: &str,
        change: &BehaviourChange,
    ) -> Result<String, BackendError> {
        self.record(format!(
            "change_behaviour:{}/{}.{}={}",
            service, change.class_name, change.method_name, change.behaviour_id
        ));
        if Self::failing(&self.fail_change) {
            return Err(BackendError::Status {
                endpoint: "PUT /services/changeBehaviour".to_owned(),
                status: 409,
                body: "behaviour rejected".to_owned(),
            });
        }
        let tree = self
            .server_tree()
            .set_behaviour(service, &change.class_name, &change.method_name, &change.behaviour_id);
        *lock(&self.services) = tree.services().cloned().collect();
        Ok("Behaviour changed".to_owned())
    }

    async fn start_ab_test(&self, duration_seconds: u64) -> Result<String, BackendError> {
        self.record(format!("start_ab_test:{}", duration_seconds));
        if let Some(body) = lock(&self.start_rejection).clone() {
            return Err(BackendError::Status {
                endpoint: "POST /services/start-ab-test".to_owned(),
                status: 400,
                body,
            });
        }
        Ok(format!("A/B test started for {} seconds", duration_seconds))
    }

    async fn results_available(&self) -> Result<bool, BackendError> {
        self.record("results_available");
        if Self::failing(&self.fail_available) {
            return Err(unavailable("GET /downloadresult/available"));
        }
        Ok(self.available.load(Ordering::SeqCst))
    }

    async fn download_results(&self) -> Result<Value, BackendError> {
        self.record("download_results");
        Ok(lock(&self.results).clone())
    }

    async fn fetch_metrics(
        &self,
        service: &str,
        minutes: u32,
    ) -> Result<MetricsPayload, BackendError> {
        self.record(format!("fetch_metrics:{}:{}", service, minutes));
        if Self::failing(&self.fail_metrics) {
            return Err(unavailable("GET /metrics"));
        }
        Ok(lock(&self.metrics).clone())
    }

    async fn fetch_live_metrics(&self, service: &str) -> Result<LiveSnapshot, BackendError> {
        self.record(format!("fetch_live_metrics:{}", service));
        if Self::failing(&self.fail_live) {
            return Err(unavailable("GET /metrics/live"));
        }
        Ok(lock(&self.live).clone())
    }
}
