use crate::backend::{BehaviourChange, ControlPlane};
use crate::domain::ConfigTree;
use crate::error::{BackendError, ValidationError};
use crate::store::ConfigStore;

use super::resync::refresh_tree;

/// One requested behaviour change, addressed by its full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviourEdit {
    pub service: String,
    pub class: String,
    pub method: String,
    pub behaviour: String,
}

impl BehaviourEdit {
    pub fn new(
        service: impl Into<String>,
        class: impl Into<String>,
        method: impl Into<String>,
        behaviour: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            class: class.into(),
            method: method.into(),
            behaviour: behaviour.into(),
        }
    }

    #[must_use]
    pub fn to_change(&self) -> BehaviourChange {
        BehaviourChange::new(&*self.class, &*self.method, &*self.behaviour)
    }

    /// Check the path and the behaviour against one tree version.
    ///
    /// # Errors
    ///
    /// Returns an error when the service or method is unknown, or when the
    /// behaviour is not in the method's available set.
    pub fn validate(&self, tree: &ConfigTree) -> Result<(), ValidationError> {
        if tree.service(&self.service).is_none() {
            return Err(ValidationError::UnknownService {
                service: self.service.clone(),
            });
        }
        let method = tree
            .method(&self.service, &self.class, &self.method)
            .ok_or_else(|| ValidationError::UnknownMethod {
                service: self.service.clone(),
                class: self.class.clone(),
                method: self.method.clone(),
            })?;
        if !method.offers(&self.behaviour) {
            return Err(ValidationError::BehaviourNotAvailable {
                class: self.class.clone(),
                method: self.method.clone(),
                behaviour: self.behaviour.clone(),
                available: method.available_behaviour_ids.join(", "),
            });
        }
        Ok(())
    }
}

/// Entry point of the two-phase optimistic protocol.
pub struct OptimisticUpdate;

impl OptimisticUpdate {
    /// Phase one: validate against the current snapshot and publish the
    /// edited tree right away.
    ///
    /// # Errors
    ///
    /// Returns an error, without touching the store, when the edit does not
    /// fit the current tree.
    pub fn apply(store: &ConfigStore, edit: BehaviourEdit) -> Result<AppliedUpdate, ValidationError> {
        let snapshot = store.snapshot();
        edit.validate(&snapshot)?;
        let optimistic =
            snapshot.set_behaviour(&edit.service, &edit.class, &edit.method, &edit.behaviour);
        store.publish(optimistic);
        Ok(AppliedUpdate { edit })
    }
}

/// How a rejected update was reconciled.
#[derive(Debug)]
pub enum ResyncOutcome {
    /// The tree now mirrors the server.
    Resynced { services: usize },
    /// The refetch failed too; an empty tree was published.
    FellBackToEmpty(BackendError),
}

/// An edit that is visible locally and awaits the backend's verdict.
#[derive(Debug)]
#[must_use = "an applied update must be confirmed or resynced"]
pub struct AppliedUpdate {
    edit: BehaviourEdit,
}

impl AppliedUpdate {
    #[must_use]
    pub const fn edit(&self) -> &BehaviourEdit {
        &self.edit
    }

    /// Phase two, accepted: the optimistic tree stays as published.
    pub fn confirm(self) -> BehaviourEdit {
        self.edit
    }

    /// Phase two, rejected: replace the whole tree with the server's view.
    pub async fn resync(self, backend: &dyn ControlPlane, store: &ConfigStore) -> ResyncOutcome {
        match refresh_tree(backend, store).await {
            Ok(services) => ResyncOutcome::Resynced { services },
            Err(err) => ResyncOutcome::FellBackToEmpty(err),
        }
    }
}
