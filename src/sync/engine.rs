use std::sync::Arc;

use crate::backend::ControlPlane;
use crate::error::{AppError, AppResult, SyncError};
use crate::notify::{Notice, Notifier};
use crate::store::ConfigStore;

use super::resync::refresh_tree;
use super::update::{BehaviourEdit, OptimisticUpdate, ResyncOutcome};

/// Applies operator edits locally first and reconciles with the backend.
#[derive(Clone)]
pub struct SyncEngine {
    backend: Arc<dyn ControlPlane>,
    store: ConfigStore,
    notifier: Arc<dyn Notifier>,
}

impl SyncEngine {
    pub fn new(
        backend: Arc<dyn ControlPlane>,
        store: ConfigStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            backend,
            store,
            notifier,
        }
    }

    /// Change one method's behaviour.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the edit does not fit the current
    /// tree (nothing is sent), or a sync error when the backend rejected the
    /// change and the tree was resynchronised.
    pub async fn change_behaviour(
        &self,
        service: &str,
        class: &str,
        method: &str,
        behaviour: &str,
    ) -> AppResult<()> {
        let edit = BehaviourEdit::new(service, class, method, behaviour);
        let applied = OptimisticUpdate::apply(&self.store, edit).map_err(|err| {
            self.notifier.notify(Notice::error(err.to_string()));
            AppError::validation(err)
        })?;

        let change = applied.edit().to_change();
        match self.backend.change_behaviour(service, &change).await {
            Ok(ack) => {
                let confirmed = applied.confirm();
                tracing::info!(
                    "{}/{}.{} -> {} ({})",
                    confirmed.service,
                    confirmed.class,
                    confirmed.method,
                    confirmed.behaviour,
                    ack.trim()
                );
                Ok(())
            }
            Err(err) => {
                self.notifier.notify(Notice::error(format!(
                    "Failed to update behaviour: {}",
                    err.operator_message()
                )));
                match applied.resync(self.backend.as_ref(), &self.store).await {
                    ResyncOutcome::Resynced { services } => {
                        tracing::debug!("Resynchronised {} services after rejection", services);
                    }
                    ResyncOutcome::FellBackToEmpty(fetch_err) => {
                        self.notifier.notify(Notice::error(format!(
                            "Failed to reload services: {}",
                            fetch_err.operator_message()
                        )));
                    }
                }
                Err(AppError::sync(SyncError::ReconciliationMismatch {
                    service: service.to_owned(),
                    class: class.to_owned(),
                    method: method.to_owned(),
                    behaviour: behaviour.to_owned(),
                    source: Box::new(err),
                }))
            }
        }
    }

    /// Restore every method of `service` to its default behaviour, then
    /// reload the whole tree.
    ///
    /// # Errors
    ///
    /// Returns an error when the reset or the reload fails.
    pub async fn reset_service(&self, service: &str) -> AppResult<()> {
        if let Err(err) = self.backend.reset_service(service).await {
            self.notifier.notify(Notice::error(format!(
                "Failed to reset service: {}",
                err.operator_message()
            )));
            return Err(AppError::sync(SyncError::ResetFailed {
                service: service.to_owned(),
                source: err,
            }));
        }

        match refresh_tree(self.backend.as_ref(), &self.store).await {
            Ok(_) => {
                self.notifier
                    .notify(Notice::info(format!("Service {} reset to defaults", service)));
                Ok(())
            }
            Err(err) => {
                self.notifier.notify(Notice::error(format!(
                    "Failed to reset service: {}",
                    err.operator_message()
                )));
                Err(AppError::backend(err))
            }
        }
    }
}
