use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::domain::ServiceConfig;
use crate::error::BackendError;
use crate::metrics::{LiveSnapshot, MetricsPayload};

use super::wire::{BehaviourChange, ServicesPayload};
use super::ControlPlane;

/// `reqwest` implementation of [`ControlPlane`].
#[derive(Debug, Clone)]
pub struct HttpControlPlane {
    client: Client,
    base_url: Url,
}

struct Endpoint {
    method: Method,
    url: Url,
}

impl Endpoint {
    fn label(&self) -> String {
        format!("{} {}", self.method, self.url.path())
    }
}

impl HttpControlPlane {
    /// Build a client rooted at `base_url` (for example
    /// `http://localhost:8080/api`).
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is invalid or cannot carry path
    /// segments, or when the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, BackendError> {
        let parsed = Url::parse(base_url).map_err(|source| BackendError::InvalidBaseUrl {
            url: base_url.to_owned(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(BackendError::BaseUrlCannotBeABase {
                url: base_url.to_owned(),
            });
        }
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|source| BackendError::BuildClientFailed { source })?;
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL. Each segment is percent-encoded
    /// on its own, so a service name never introduces extra path levels.
    fn endpoint(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Endpoint, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::BaseUrlCannotBeABase {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(Endpoint { method, url })
    }

    async fn send(&self, label: String, request: RequestBuilder) -> Result<String, BackendError> {
        tracing::debug!("-> {}", label);
        let response = request
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                endpoint: label.clone(),
                source,
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| BackendError::Transport {
                endpoint: label.clone(),
                source,
            })?;
        tracing::debug!("<- {} {}", label, status.as_u16());
        if !status.is_success() {
            return Err(BackendError::Status {
                endpoint: label,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn request(&self, endpoint: Endpoint) -> (String, RequestBuilder) {
        let label = endpoint.label();
        (label, self.client.request(endpoint.method, endpoint.url))
    }

    async fn post_text(&self, endpoint: Endpoint) -> Result<String, BackendError> {
        let (label, request) = self.request(endpoint);
        self.send(label, request.header(CONTENT_TYPE, "application/json"))
            .await
    }

    async fn json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, BackendError> {
        let (label, request) = self.request(endpoint);
        let body = self
            .send(label.clone(), request.header(ACCEPT, "application/json"))
            .await?;
        serde_json::from_str(&body).map_err(|source| BackendError::Decode {
            endpoint: label,
            source,
        })
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn fetch_services(&self) -> Result<Vec<ServiceConfig>, BackendError> {
        let endpoint = self.endpoint(Method::GET, &["services"], &[])?;
        let payload: ServicesPayload = self.json(endpoint).await?;
        Ok(payload.into_services())
    }

    async fn trigger_discovery(&self, full_refresh: bool) -> Result<String, BackendError> {
        let endpoint = self.endpoint(
            Method::POST,
            &["services", "discover"],
            &[("fullRefresh", full_refresh.to_string())],
        )?;
        self.post_text(endpoint).await
    }

    async fn reset_service(&self, service: &str) -> Result<String, BackendError> {
        let endpoint = self.endpoint(Method::POST, &["services", service, "reset"], &[])?;
        self.post_text(endpoint).await
    }

    async fn change_behaviour(
        &self,
        service: &str,
        change: &BehaviourChange,
    ) -> Result<String, BackendError> {
        let endpoint = self.endpoint(
            Method::PUT,
            &["services", service, "changeBehaviour"],
            &[],
        )?;
        let (label, request) = self.request(endpoint);
        self.send(label, request.json(change)).await
    }

    async fn start_ab_test(&self, duration_seconds: u64) -> Result<String, BackendError> {
        let endpoint = self.endpoint(
            Method::POST,
            &["services", "start-ab-test"],
            &[("durationSeconds", duration_seconds.to_string())],
        )?;
        self.post_text(endpoint).await
    }

    async fn results_available(&self) -> Result<bool, BackendError> {
        let endpoint = self.endpoint(Method::GET, &["downloadresult", "available"], &[])?;
        self.json(endpoint).await
    }

    async fn download_results(&self) -> Result<Value, BackendError> {
        let endpoint = self.endpoint(Method::GET, &["downloadresult"], &[])?;
        self.json(endpoint).await
    }

    async fn fetch_metrics(
        &self,
        service: &str,
        minutes: u32,
    ) -> Result<MetricsPayload, BackendError> {
        let endpoint = self.endpoint(
            Method::GET,
            &["metrics", service],
            &[("minutes", minutes.to_string())],
        )?;
        self.json(endpoint).await
    }

    async fn fetch_live_metrics(&self, service: &str) -> Result<LiveSnapshot, BackendError> {
        let endpoint = self.endpoint(Method::GET, &["metrics", service, "live"], &[])?;
        self.json(endpoint).await
    }
}
