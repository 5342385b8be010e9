//! Shared, observable client state.
use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::ConfigTree;

#[derive(Debug)]
struct StoreInner {
    tree: watch::Sender<ConfigTree>,
    discovering: watch::Sender<bool>,
    last_error: watch::Sender<Option<String>>,
}

/// Holds the current `ConfigTree` plus the discovery flag.
///
/// Every write replaces the whole value, so subscribers observe complete
/// tree versions only.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    inner: Arc<StoreInner>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_tree(ConfigTree::empty())
    }

    #[must_use]
    pub fn with_tree(tree: ConfigTree) -> Self {
        let (tree, _) = watch::channel(tree);
        let (discovering, _) = watch::channel(false);
        let (last_error, _) = watch::channel(None);
        Self {
            inner: Arc::new(StoreInner {
                tree,
                discovering,
                last_error,
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ConfigTree {
        self.inner.tree.borrow().clone()
    }

    /// Replace the tree wholesale and wake subscribers.
    pub fn publish(&self, tree: ConfigTree) {
        self.inner.tree.send_replace(tree);
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConfigTree> {
        self.inner.tree.subscribe()
    }

    #[must_use]
    pub fn is_discovering(&self) -> bool {
        *self.inner.discovering.borrow()
    }

    pub fn set_discovering(&self, discovering: bool) {
        self.inner.discovering.send_replace(discovering);
    }

    #[must_use]
    pub fn subscribe_discovering(&self) -> watch::Receiver<bool> {
        self.inner.discovering.subscribe()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.borrow().clone()
    }

    pub fn record_error(&self, message: Option<String>) {
        self.inner.last_error.send_replace(message);
    }
}

/// Clears the discovery flag when dropped, whichever way the owning
/// operation ends.
#[derive(Debug)]
pub struct DiscoveringGuard {
    store: ConfigStore,
}

impl DiscoveringGuard {
    #[must_use]
    pub fn raise(store: &ConfigStore) -> Self {
        store.set_discovering(true);
        Self {
            store: store.clone(),
        }
    }
}

impl Drop for DiscoveringGuard {
    fn drop(&mut self) {
        self.store.set_discovering(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::service;
    use crate::error::{AppError, AppResult};

    #[test]
    fn subscribers_see_whole_replacements() -> AppResult<()> {
        let store = ConfigStore::new();
        let mut rx = store.subscribe();
        store.publish(ConfigTree::from_services(vec![service("orders")]));

        if !rx.has_changed().map_err(|err| AppError::validation(err.to_string()))? {
            return Err(AppError::validation("subscriber was not woken"));
        }
        if rx.borrow_and_update().len() != 1 {
            return Err(AppError::validation("subscriber saw a partial tree"));
        }
        Ok(())
    }

    #[test]
    fn guard_clears_flag_on_drop() -> AppResult<()> {
        let store = ConfigStore::new();
        {
            let _guard = DiscoveringGuard::raise(&store);
            if !store.is_discovering() {
                return Err(AppError::validation("flag should be raised"));
            }
        }
        if store.is_discovering() {
            return Err(AppError::validation("flag should be cleared after drop"));
        }
        Ok(())
    }
}
