//! Service list refresh and backend-side discovery.
use std::sync::Arc;
use std::time::Duration;

use crate::backend::ControlPlane;
use crate::error::{AppError, AppResult};
use crate::notify::{Notice, Notifier};
use crate::schedule::ScheduledTask;
use crate::store::{ConfigStore, DiscoveringGuard};
use crate::sync::refresh_tree;

pub struct DiscoveryController {
    backend: Arc<dyn ControlPlane>,
    store: ConfigStore,
    notifier: Arc<dyn Notifier>,
    settle_delay: Duration,
}

impl DiscoveryController {
    pub fn new(
        backend: Arc<dyn ControlPlane>,
        store: ConfigStore,
        notifier: Arc<dyn Notifier>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            backend,
            store,
            notifier,
            settle_delay,
        }
    }

    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Re-read the service list and replace the tree.
    ///
    /// # Errors
    ///
    /// Returns an error when the fetch fails; an empty tree is published in
    /// that case.
    pub async fn quick_refresh(&self) -> AppResult<usize> {
        refresh_tree(self.backend.as_ref(), &self.store)
            .await
            .map_err(|err| {
                self.notifier.notify(Notice::error(format!(
                    "Failed to load services: {}",
                    err.operator_message()
                )));
                AppError::backend(err)
            })
    }

    /// Ask the backend to rediscover every service, give it time to settle,
    /// then refresh. The discovering flag is raised for the whole operation.
    ///
    /// # Errors
    ///
    /// Returns an error when the trigger call or the refresh fails. A failed
    /// trigger keeps the current tree.
    pub async fn full_discovery(&self) -> AppResult<usize> {
        let _discovering = DiscoveringGuard::raise(&self.store);
        self.discover_and_settle().await
    }

    /// Run [`DiscoveryController::full_discovery`] in the background. The
    /// flag is raised before this returns; aborting the task clears it.
    pub fn spawn_full_discovery(self: &Arc<Self>) -> ScheduledTask {
        let discovering = DiscoveringGuard::raise(&self.store);
        let controller = Arc::clone(self);
        ScheduledTask::delayed("full-discovery", Duration::ZERO, async move {
            let _discovering = discovering;
            if let Err(err) = controller.discover_and_settle().await {
                tracing::debug!("Background discovery failed: {}", err);
            }
        })
    }

    async fn discover_and_settle(&self) -> AppResult<usize> {
        match self.backend.trigger_discovery(true).await {
            Ok(ack) => {
                tracing::info!("Discovery triggered: {}", ack.trim());
            }
            Err(err) => {
                self.notifier.notify(Notice::error(format!(
                    "Failed to trigger discovery: {}",
                    err.operator_message()
                )));
                return Err(AppError::backend(err));
            }
        }

        tokio::time::sleep(self.settle_delay).await;
        let services = self.quick_refresh().await?;
        self.notifier
            .notify(Notice::info(format!("Discovered {} services", services)));
        Ok(services)
    }
}
