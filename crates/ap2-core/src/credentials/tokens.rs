//! Credential token lifecycle: issue, bind to a payment mandate, redeem.
//!
//! Tokens are single-use intents, not idempotency keys: every `issue` mints a
//! fresh value. A token's mandate binding moves from unset to set exactly once
//! and is never overwritten.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::accounts::AccountStore;
use crate::error::{Ap2Error, Ap2Result};
use crate::types::PaymentMethod;

const TOKEN_PREFIX: &str = "ap2_tok_";

/// What a token stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub account_id: String,
    pub payment_method_alias: String,
    pub payment_mandate_id: Option<String>,
    pub issued_at: DateTime<Utc>,
}

/// Result of a `bind` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// First bind; the mandate id is now attached.
    Bound,
    /// Already bound (to this or another mandate); nothing changed.
    AlreadyBound,
}

/// In-memory token store.
///
/// Concurrent operations on different tokens do not interfere. The store is
/// process-local; a deployment that can restart between issue and redeem
/// needs a durable implementation behind the same contract.
#[derive(Debug, Clone)]
pub struct TokenStore {
    inner: Arc<RwLock<HashMap<String, TokenRecord>>>,
    accounts: AccountStore,
}

impl TokenStore {
    pub fn new(accounts: AccountStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            accounts,
        }
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Mint a new token for `(account_id, alias)`.
    pub async fn issue(&self, account_id: &str, alias: &str) -> String {
        let token = format!("{}{}", TOKEN_PREFIX, uuid::Uuid::new_v4().simple());
        let record = TokenRecord {
            account_id: account_id.to_string(),
            payment_method_alias: alias.to_string(),
            payment_mandate_id: None,
            issued_at: Utc::now(),
        };

        self.inner.write().await.insert(token.clone(), record);
        info!(account_id = %account_id, "issued payment credential token");
        token
    }

    /// Attach `payment_mandate_id` to `token`. First writer wins.
    pub async fn bind(&self, token: &str, payment_mandate_id: &str) -> Ap2Result<BindOutcome> {
        let mut inner = self.inner.write().await;
        let record = inner.get_mut(token).ok_or(Ap2Error::UnknownToken)?;

        if record.payment_mandate_id.is_some() {
            debug!(
                payment_mandate_id = %payment_mandate_id,
                "token already bound, ignoring bind"
            );
            return Ok(BindOutcome::AlreadyBound);
        }

        record.payment_mandate_id = Some(payment_mandate_id.to_string());
        info!(payment_mandate_id = %payment_mandate_id, "bound token to payment mandate");
        Ok(BindOutcome::Bound)
    }

    /// Release the payment method behind `token` if it is bound to
    /// `payment_mandate_id`.
    ///
    /// Unknown token, unbound token, mandate mismatch and a vanished payment
    /// method all yield the same `InvalidToken`.
    pub async fn redeem(&self, token: &str, payment_mandate_id: &str) -> Ap2Result<PaymentMethod> {
        let record = {
            let inner = self.inner.read().await;
            inner.get(token).cloned().ok_or(Ap2Error::InvalidToken)?
        };

        if record.payment_mandate_id.as_deref() != Some(payment_mandate_id) {
            return Err(Ap2Error::InvalidToken);
        }

        self.accounts
            .payment_method(&record.account_id, &record.payment_method_alias)
            .cloned()
            .ok_or(Ap2Error::InvalidToken)
    }

    pub async fn get(&self, token: &str) -> Option<TokenRecord> {
        self.inner.read().await.get(token).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
