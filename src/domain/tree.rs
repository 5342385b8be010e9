use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodConfig {
    pub method_name: String,
    pub current_behaviour_id: String,
    pub default_behaviour_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_behaviour_ids: Vec<String>,
}

impl MethodConfig {
    #[must_use]
    pub fn offers(&self, behaviour_id: &str) -> bool {
        self.available_behaviour_ids
            .iter()
            .any(|candidate| candidate == behaviour_id)
    }

    /// Whether the operator moved this method away from its default behaviour.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.current_behaviour_id != self.default_behaviour_id
    }

    /// Current and default behaviours are both part of the available set.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.offers(&self.current_behaviour_id) && self.offers(&self.default_behaviour_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassConfig {
    pub class_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub method_configs: Vec<MethodConfig>,
}

impl ClassConfig {
    #[must_use]
    pub fn method(&self, method_name: &str) -> Option<&MethodConfig> {
        self.method_configs
            .iter()
            .find(|method| method.method_name == method_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub service_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub class_configs: Vec<ClassConfig>,
}

impl ServiceConfig {
    #[must_use]
    pub fn class(&self, class_name: &str) -> Option<&ClassConfig> {
        self.class_configs
            .iter()
            .find(|class| class.class_name == class_name)
    }

    fn methods(&self) -> impl Iterator<Item = &MethodConfig> {
        self.class_configs
            .iter()
            .flat_map(|class| class.method_configs.iter())
    }

    #[must_use]
    pub fn overview(&self) -> ServiceOverview {
        ServiceOverview {
            service_name: self.service_name.clone(),
            class_count: self.class_configs.len(),
            method_count: self.methods().count(),
            modified_count: self.methods().filter(|method| method.is_modified()).count(),
        }
    }
}

/// Counts shown next to a service in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOverview {
    pub service_name: String,
    pub class_count: usize,
    pub method_count: usize,
    pub modified_count: usize,
}

/// One version of the full service → class → method tree.
///
/// A tree value is never mutated once published. Edits produce a new tree
/// that shares every untouched service subtree with its predecessor, so a
/// reader holding an older version keeps a consistent view while an
/// optimistic edit or a resync is published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigTree {
    services: Vec<Arc<ServiceConfig>>,
}

impl ConfigTree {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            services: Vec::new(),
        }
    }

    /// Build a tree from backend payload order. A repeated service name keeps
    /// the later entry in the position of the first one.
    #[must_use]
    pub fn from_services(services: Vec<ServiceConfig>) -> Self {
        let mut tree = Self::empty();
        for service in services {
            let name = service.service_name.clone();
            tree = tree.replace(&name, service);
        }
        tree
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceConfig> {
        self.services.iter().map(AsRef::as_ref)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services
            .iter()
            .map(|service| service.service_name.as_str())
    }

    #[must_use]
    pub fn service(&self, service_name: &str) -> Option<&ServiceConfig> {
        self.services
            .iter()
            .find(|service| service.service_name == service_name)
            .map(AsRef::as_ref)
    }

    #[must_use]
    pub fn method(
        &self,
        service_name: &str,
        class_name: &str,
        method_name: &str,
    ) -> Option<&MethodConfig> {
        self.service(service_name)?
            .class(class_name)?
            .method(method_name)
    }

    #[must_use]
    pub fn overviews(&self) -> Vec<ServiceOverview> {
        self.services().map(ServiceConfig::overview).collect()
    }

    /// Swap one service subtree wholesale, appending it when the name is new.
    #[must_use]
    pub fn replace(&self, service_name: &str, service: ServiceConfig) -> Self {
        let mut services = self.services.clone();
        let replacement = Arc::new(service);
        match services
            .iter()
            .position(|existing| existing.service_name == service_name)
        {
            Some(index) => {
                if let Some(slot) = services.get_mut(index) {
                    *slot = replacement;
                }
            }
            None => services.push(replacement),
        }
        Self { services }
    }

    /// New tree with exactly one `current_behaviour_id` changed.
    ///
    /// Unknown paths leave the tree as it is; callers validate the path
    /// against the snapshot they read before asking for the edit.
    #[must_use]
    pub fn set_behaviour(
        &self,
        service_name: &str,
        class_name: &str,
        method_name: &str,
        behaviour_id: &str,
    ) -> Self {
        if self.method(service_name, class_name, method_name).is_none() {
            return self.clone();
        }

        let services = self
            .services
            .iter()
            .map(|service| {
                if service.service_name != service_name {
                    return Arc::clone(service);
                }
                let mut edited = ServiceConfig::clone(service);
                for class in edited
                    .class_configs
                    .iter_mut()
                    .filter(|class| class.class_name == class_name)
                {
                    for method in class
                        .method_configs
                        .iter_mut()
                        .filter(|method| method.method_name == method_name)
                    {
                        behaviour_id.clone_into(&mut method.current_behaviour_id);
                    }
                }
                Arc::new(edited)
            })
            .collect();

        Self { services }
    }

    /// Whether both trees hold the very same allocation for `service_name`.
    #[must_use]
    pub fn shares_service_with(&self, other: &Self, service_name: &str) -> bool {
        let find = |tree: &Self| {
            tree.services
                .iter()
                .find(|service| service.service_name == service_name)
                .cloned()
        };
        match (find(self), find(other)) {
            (Some(left), Some(right)) => Arc::ptr_eq(&left, &right),
            _ => false,
        }
    }
}
