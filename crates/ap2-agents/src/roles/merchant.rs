//! Merchant: offers carts, attaches shipping, forwards payments to its processor.

use std::sync::Arc;

use ap2_client::RemoteAgentClient;
use ap2_core::codec;
use ap2_core::keys::{self, AP2_EXTENSION_URI};
use ap2_core::merchant::{CartStore, Catalog, TrustedAgents};
use ap2_core::types::{ContactAddress, IntentMandate, PaymentMandate};
use ap2_core::{
    AgentCard, Ap2Error, Ap2Result, MandateVerifier, Message, MessageBuilder, Part, Task,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tracing::info;

use crate::executor::{operation, required, required_str, unknown_operation, AgentExecutor};
use crate::updater::TaskUpdater;

pub const MERCHANT_NAME: &str = "merchant_agent";

pub struct MerchantExecutor {
    url: String,
    catalog: Catalog,
    carts: CartStore,
    trusted: TrustedAgents,
    cart_ttl: Duration,
    verifier: Arc<dyn MandateVerifier>,
    processor: RemoteAgentClient,
}

impl MerchantExecutor {
    pub fn new(
        url: impl Into<String>,
        catalog: Catalog,
        trusted: TrustedAgents,
        verifier: Arc<dyn MandateVerifier>,
        processor: RemoteAgentClient,
    ) -> Self {
        Self {
            url: url.into(),
            catalog,
            carts: CartStore::new(),
            trusted,
            cart_ttl: Duration::minutes(30),
            verifier,
            processor,
        }
    }

    pub fn with_cart_ttl(mut self, ttl: Duration) -> Self {
        self.cart_ttl = ttl;
        self
    }

    pub fn with_cart_store(mut self, carts: CartStore) -> Self {
        self.carts = carts;
        self
    }

    async fn find_items(&self, request: &Message, updater: &mut TaskUpdater) -> Ap2Result<()> {
        let intent: IntentMandate = required(request)?;
        let now = Utc::now();
        let expiry = DateTime::parse_from_rfc3339(&intent.intent_expiry)
            .map_err(|e| Ap2Error::validation("IntentMandate", format!("intent_expiry: {}", e)))?;
        if expiry.with_timezone(&Utc) < now {
            return Err(Ap2Error::validation("IntentMandate", "intent has expired"));
        }

        let carts = self.catalog.offer(&intent, now, self.cart_ttl);
        for cart in &carts {
            self.carts.put(cart.clone()).await;
            updater.add_artifact(vec![codec::encode(cart)?]);
        }

        let risk_data = collect_risk_data(updater.context_id(), now);
        self.carts.set_risk_data(updater.context_id(), risk_data.clone()).await;
        updater.add_artifact(vec![Part::data(keys::RISK_DATA, Value::String(risk_data))]);

        info!(context_id = %updater.context_id(), carts = carts.len(), "offered carts");
        updater.complete(None);
        Ok(())
    }

    async fn update_cart(&self, request: &Message, updater: &mut TaskUpdater) -> Ap2Result<()> {
        let cart_id = required_str(request, keys::CART_ID)?;
        let address_value = codec::find(keys::SHIPPING_ADDRESS, &request.parts)
            .or_else(|| codec::find(keys::CONTACT_ADDRESS, &request.parts))
            .ok_or_else(|| Ap2Error::missing(keys::SHIPPING_ADDRESS))?;
        let address: ContactAddress = codec::from_value("ContactAddress", address_value)?;

        let mut cart = self
            .carts
            .get(cart_id)
            .await
            .ok_or_else(|| Ap2Error::not_found(format!("cart {}", cart_id)))?;
        cart.contents.payment_request.shipping_address = Some(address);
        self.carts.put(cart.clone()).await;

        info!(cart_id = %cart_id, "attached shipping address");
        updater.add_artifact(vec![codec::encode(&cart)?]);
        updater.complete(None);
        Ok(())
    }

    async fn initiate_payment(
        &self,
        request: &Message,
        current: Option<&Task>,
        updater: &mut TaskUpdater,
    ) -> Ap2Result<()> {
        let mandate: PaymentMandate = required(request)?;
        // Unsigned mandates never reach the processor.
        self.verifier.verify(&mandate)?;
        let risk_data = match codec::find_str(keys::RISK_DATA, &request.parts) {
            Some(risk) => risk.to_string(),
            None => self
                .carts
                .risk_data(updater.context_id())
                .await
                .ok_or_else(|| Ap2Error::missing(keys::RISK_DATA))?,
        };

        let processor_task_id = match current {
            Some(task) => Some(recorded_processor_task(task).ok_or_else(|| {
                Ap2Error::InvalidTransition {
                    message: format!("task {} has no payment in progress", task.id),
                }
            })?),
            None => None,
        };

        let mut outgoing = MessageBuilder::new()
            .context_id(updater.context_id())
            .maybe_task_id(processor_task_id)
            .text("Initiate a payment")
            .data(keys::OPERATION, "initiate_payment")
            .canonical(&mandate)?
            .data(keys::RISK_DATA, risk_data);
        if let Some(response) = codec::find_str(keys::CHALLENGE_RESPONSE, &request.parts) {
            outgoing = outgoing.data(keys::CHALLENGE_RESPONSE, response);
        }

        let processor_task = self.processor.send(outgoing.build()).await?;
        info!(
            task_id = %updater.task_id(),
            payment_processor_task_id = %processor_task.id,
            payment_mandate_id = %mandate.id(),
            state = processor_task.state().as_str(),
            "payment processor responded"
        );

        let mut parts = processor_task
            .status
            .message
            .map(|m| m.parts)
            .unwrap_or_default();
        parts.push(Part::data(keys::PAYMENT_PROCESSOR_TASK_ID, json!(processor_task.id)));
        let message = updater.agent_message(parts);
        updater.mirror(processor_task.status.state, Some(message));
        Ok(())
    }
}

/// Processor task id recorded in a merchant task's status message.
fn recorded_processor_task(task: &Task) -> Option<String> {
    let message = task.status.message.as_ref()?;
    codec::find_str(keys::PAYMENT_PROCESSOR_TASK_ID, &message.parts).map(String::from)
}

/// Opaque device and session signals handed to the payment processor.
fn collect_risk_data(context_id: &str, now: DateTime<Utc>) -> String {
    json!({
        "context_id": context_id,
        "collected_at": now.to_rfc3339(),
        "device": "simulated",
    })
    .to_string()
}

#[async_trait]
impl AgentExecutor for MerchantExecutor {
    fn agent_card(&self) -> AgentCard {
        AgentCard::new(MERCHANT_NAME, self.url.clone()).with_extension(AP2_EXTENSION_URI, true)
    }

    async fn execute(
        &self,
        request: &Message,
        current: Option<&Task>,
        updater: &mut TaskUpdater,
    ) -> Ap2Result<()> {
        self.trusted
            .check(codec::find_str(keys::SHOPPING_AGENT_ID, &request.parts))?;

        match operation(request)? {
            "find_items" => self.find_items(request, updater).await,
            "update_cart" => self.update_cart(request, updater).await,
            "initiate_payment" => self.initiate_payment(request, current, updater).await,
            other => Err(unknown_operation(other)),
        }
    }
}
