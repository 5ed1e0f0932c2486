//! Merchant payment processor: step-up challenge, then credential exchange.

use std::sync::Arc;

use ap2_client::{AgentDirectory, CapabilityCache, RemoteAgentClient};
use ap2_core::codec;
use ap2_core::keys::{self, AP2_EXTENSION_URI};
use ap2_core::payment::{ChallengeFlow, ChallengePhase};
use ap2_core::types::{PaymentMandate, PaymentMethod};
use ap2_core::{
    artifacts, AgentCard, Ap2Error, Ap2Result, ChallengeConfig, MandateVerifier, Message,
    MessageBuilder, Part, Task,
};
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::executor::{operation, required, required_str, unknown_operation, AgentExecutor};
use crate::updater::TaskUpdater;

pub const PAYMENT_PROCESSOR_NAME: &str = "merchant_payment_processor_agent";

pub struct PaymentProcessorExecutor {
    url: String,
    challenge: ChallengeConfig,
    verifier: Arc<dyn MandateVerifier>,
    directory: Arc<dyn AgentDirectory>,
    required_extensions: Vec<String>,
    cache: CapabilityCache,
}

impl PaymentProcessorExecutor {
    pub fn new(
        url: impl Into<String>,
        challenge: ChallengeConfig,
        verifier: Arc<dyn MandateVerifier>,
        directory: Arc<dyn AgentDirectory>,
    ) -> Self {
        Self {
            url: url.into(),
            challenge,
            verifier,
            directory,
            required_extensions: vec![AP2_EXTENSION_URI.to_string()],
            cache: CapabilityCache::new(),
        }
    }

    pub fn with_required_extensions(mut self, extensions: Vec<String>) -> Self {
        self.required_extensions = extensions;
        self
    }

    async fn initiate_payment(
        &self,
        request: &Message,
        current: Option<&Task>,
        updater: &mut TaskUpdater,
    ) -> Ap2Result<()> {
        let mandate: PaymentMandate = required(request)?;
        required_str(request, keys::RISK_DATA)?;
        self.verifier.verify(&mandate)?;

        let mut flow = ChallengeFlow::resume(current.map(Task::state), self.challenge.clone())?;

        if flow.phase() == ChallengePhase::None {
            let descriptor = flow.issue()?;
            let message = updater.agent_message(vec![
                Part::text("Please provide the challenge response to complete the payment."),
                Part::data(keys::CHALLENGE, serde_json::to_value(&descriptor)?),
            ]);
            info!(payment_mandate_id = %mandate.id(), "challenge issued");
            updater.requires_input(message);
            return Ok(());
        }

        let response = codec::find_str(keys::CHALLENGE_RESPONSE, &request.parts).unwrap_or("");
        if flow.respond(response)? == ChallengePhase::Retry {
            let message = updater.agent_message(vec![Part::text("Challenge response incorrect.")]);
            updater.requires_input(message);
            return Ok(());
        }

        match self.request_payment_credential(&mandate, updater.context_id()).await {
            Ok(method) => {
                flow.complete()?;
                info!(
                    payment_mandate_id = %mandate.id(),
                    method_type = method.kind.as_str(),
                    "payment completed"
                );
                let message = updater.agent_message(vec![
                    Part::text("Payment completed."),
                    Part::data("payment_status", json!("success")),
                ]);
                updater.complete(Some(message));
                Ok(())
            }
            Err(e) => {
                flow.fail()?;
                Err(e)
            }
        }
    }

    /// Redeem the mandate's credential token at the provider that issued it.
    async fn request_payment_credential(
        &self,
        mandate: &PaymentMandate,
        context_id: &str,
    ) -> Ap2Result<PaymentMethod> {
        let token = mandate
            .payment_mandate_contents
            .credential_token()
            .ok_or_else(|| Ap2Error::missing("payment_response.details.token"))?;

        let provider = RemoteAgentClient::from_directory(
            self.directory.as_ref(),
            "credentials_provider",
            &token.url,
            self.required_extensions.clone(),
        )?
        .with_cache(self.cache.clone());

        let message = MessageBuilder::new()
            .context_id(context_id)
            .text("Give me the payment method credentials for the given token.")
            .data(keys::OPERATION, "get_payment_method_raw_credentials")
            .canonical(mandate)?
            .build();

        let task = provider.send_completed(message).await?;
        let data = artifacts::first_data(&task.artifacts)?;
        codec::from_value("PaymentMethod", &serde_json::Value::Object(data.clone()))
    }
}

#[async_trait]
impl AgentExecutor for PaymentProcessorExecutor {
    fn agent_card(&self) -> AgentCard {
        AgentCard::new(PAYMENT_PROCESSOR_NAME, self.url.clone())
            .with_extension(AP2_EXTENSION_URI, true)
    }

    async fn execute(
        &self,
        request: &Message,
        current: Option<&Task>,
        updater: &mut TaskUpdater,
    ) -> Ap2Result<()> {
        match operation(request)? {
            "initiate_payment" => self.initiate_payment(request, current, updater).await,
            other => Err(unknown_operation(other)),
        }
    }
}
