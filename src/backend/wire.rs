use serde::{Deserialize, Serialize};

use crate::domain::ServiceConfig;

/// `GET /services`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServicesPayload {
    #[serde(default)]
    pub(crate) service_configs: Option<Vec<ServiceConfig>>,
}

impl ServicesPayload {
    pub(crate) fn into_services(self) -> Vec<ServiceConfig> {
        self.service_configs.unwrap_or_default()
    }
}

/// Body of `PUT /services/{service}/changeBehaviour`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviourChange {
    pub class_name: String,
    pub method_name: String,
    pub behaviour_id: String,
}

impl BehaviourChange {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        behaviour_id: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            behaviour_id: behaviour_id.into(),
        }
    }
}
