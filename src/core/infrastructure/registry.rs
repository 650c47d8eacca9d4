//! Lazily-populated cache of cluster node names.

use crate::core::domain::model::node::NodeListItem;
use crate::core::infrastructure::executor::RequestExecutor;
use tokio::sync::RwLock;
use tracing::warn;

/// Caches the node names discovered through `/nodes`.
///
/// "Not yet loaded" (`None`) is distinct from a loaded cache; the cache is
/// only refreshed on demand, never by time.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: RwLock<Option<Vec<String>>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches `/nodes` and replaces the cache with the listed node names.
    ///
    /// Returns `false` — leaving the cache untouched — when the call fails,
    /// the payload does not decode, or the cluster reports no nodes.
    pub async fn reload(&self, executor: &RequestExecutor) -> bool {
        let listing = match executor.get("/nodes").await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(error = %e, "node listing request failed");
                return false;
            }
        };

        match serde_json::from_value::<Vec<NodeListItem>>(listing) {
            Ok(items) if !items.is_empty() => {
                let names: Vec<String> = items.into_iter().map(|item| item.node).collect();
                *self.nodes.write().await = Some(names);
                true
            }
            Ok(_) => {
                warn!("empty list of nodes returned for this cluster");
                false
            }
            Err(e) => {
                warn!(error = %e, "malformed node listing");
                false
            }
        }
    }

    /// Returns the cached node names, loading them first if needed.
    /// `None` means the listing could not be obtained.
    pub async fn nodes(&self, executor: &RequestExecutor) -> Option<Vec<String>> {
        if self.nodes.read().await.is_none() && !self.reload(executor).await {
            return None;
        }
        self.nodes.read().await.clone()
    }
}
