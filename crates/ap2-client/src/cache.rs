//! Agent card cache, one entry per endpoint, kept for the process lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use ap2_core::AgentCard;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct CapabilityCache {
    inner: Arc<RwLock<HashMap<String, AgentCard>>>,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, endpoint: &str) -> Option<AgentCard> {
        self.inner.read().await.get(endpoint).cloned()
    }

    pub async fn insert(&self, endpoint: &str, card: AgentCard) {
        self.inner.write().await.insert(endpoint.to_string(), card);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
