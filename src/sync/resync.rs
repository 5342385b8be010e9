use crate::backend::ControlPlane;
use crate::domain::ConfigTree;
use crate::error::BackendError;
use crate::store::ConfigStore;

/// Fetch the authoritative service list and publish it as a whole new tree.
///
/// On failure an empty tree is published, so the visible state never mixes
/// stale and fresh data; the error is returned for reporting.
///
/// # Errors
///
/// Returns the backend error when the fetch fails.
pub async fn refresh_tree(
    backend: &dyn ControlPlane,
    store: &ConfigStore,
) -> Result<usize, BackendError> {
    match backend.fetch_services().await {
        Ok(services) => {
            let tree = ConfigTree::from_services(services);
            let count = tree.len();
            store.publish(tree);
            store.record_error(None);
            tracing::debug!("Loaded {} services", count);
            Ok(count)
        }
        Err(err) => {
            store.publish(ConfigTree::empty());
            store.record_error(Some(err.operator_message()));
            Err(err)
        }
    }
}
