//! Cart mandate and risk data storage, merchant side.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::types::CartMandate;

#[derive(Debug, Default)]
struct CartStoreInner {
    /// Cart id -> latest version of the cart.
    carts: HashMap<String, CartMandate>,
    /// Context id -> risk data collected for that exchange.
    risk_data: HashMap<String, String>,
}

/// Latest version of each cart offered, plus per-context risk data.
///
/// Writing a cart under an existing id supersedes the previous version.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    inner: Arc<RwLock<CartStoreInner>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, cart_id: &str) -> Option<CartMandate> {
        self.inner.read().await.carts.get(cart_id).cloned()
    }

    pub async fn put(&self, cart: CartMandate) {
        let id = cart.contents.id.clone();
        self.inner.write().await.carts.insert(id, cart);
    }

    pub async fn set_risk_data(&self, context_id: &str, risk_data: impl Into<String>) {
        self.inner
            .write()
            .await
            .risk_data
            .insert(context_id.to_string(), risk_data.into());
    }

    pub async fn risk_data(&self, context_id: &str) -> Option<String> {
        self.inner.read().await.risk_data.get(context_id).cloned()
    }
}
