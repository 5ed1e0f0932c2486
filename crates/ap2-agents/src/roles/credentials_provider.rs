//! Credentials provider: holds accounts and exchanges payment credential tokens.

use std::sync::Arc;

use ap2_core::codec;
use ap2_core::credentials::{eligible, BindOutcome, TokenStore};
use ap2_core::keys::{self, AP2_EXTENSION_URI};
use ap2_core::types::{PaymentMandate, PaymentMethodData};
use ap2_core::{AgentCard, Ap2Error, Ap2Result, MandateVerifier, Message, Part, Task};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::executor::{operation, required, required_str, unknown_operation, AgentExecutor};
use crate::updater::TaskUpdater;

pub const CREDENTIALS_PROVIDER_NAME: &str = "credentials_provider";

pub struct CredentialsProviderExecutor {
    url: String,
    tokens: TokenStore,
    verifier: Arc<dyn MandateVerifier>,
}

impl CredentialsProviderExecutor {
    pub fn new(
        url: impl Into<String>,
        tokens: TokenStore,
        verifier: Arc<dyn MandateVerifier>,
    ) -> Self {
        Self {
            url: url.into(),
            tokens,
            verifier,
        }
    }

    fn get_shipping_address(&self, request: &Message, updater: &mut TaskUpdater) -> Ap2Result<()> {
        let email = required_str(request, keys::USER_EMAIL)?;
        let address = self
            .tokens
            .accounts()
            .shipping_address(email)
            .ok_or_else(|| Ap2Error::not_found("shipping address"))?;

        updater.add_artifact(vec![codec::encode(address)?]);
        updater.complete(None);
        Ok(())
    }

    fn search_payment_methods(
        &self,
        request: &Message,
        updater: &mut TaskUpdater,
    ) -> Ap2Result<()> {
        let email = required_str(request, keys::USER_EMAIL)?;
        let criteria: Vec<PaymentMethodData> = codec::decode_all(&request.parts)?;
        if criteria.is_empty() {
            return Err(Ap2Error::missing(keys::PAYMENT_METHOD_DATA));
        }

        let aliases = eligible(self.tokens.accounts().payment_methods(email), &criteria);
        info!(
            criteria = criteria.len(),
            eligible = aliases.len(),
            "searched payment methods"
        );
        updater.add_artifact(vec![Part::data(keys::PAYMENT_METHOD_ALIASES, json!(aliases))]);
        updater.complete(None);
        Ok(())
    }

    async fn create_payment_credential_token(
        &self,
        request: &Message,
        updater: &mut TaskUpdater,
    ) -> Ap2Result<()> {
        let email = required_str(request, keys::USER_EMAIL)?;
        let alias = required_str(request, keys::PAYMENT_METHOD_ALIAS)?;
        if self.tokens.accounts().payment_method(email, alias).is_none() {
            return Err(Ap2Error::not_found("payment method"));
        }

        let token = self.tokens.issue(email, alias).await;
        updater.add_artifact(vec![Part::data(keys::TOKEN, Value::String(token))]);
        updater.complete(None);
        Ok(())
    }

    async fn signed_payment_mandate(
        &self,
        request: &Message,
        updater: &mut TaskUpdater,
    ) -> Ap2Result<()> {
        let mandate: PaymentMandate = required(request)?;
        self.verifier.verify(&mandate)?;
        let token = mandate
            .payment_mandate_contents
            .credential_token()
            .ok_or_else(|| Ap2Error::missing("payment_response.details.token"))?;

        if self.tokens.bind(&token.value, mandate.id()).await? == BindOutcome::AlreadyBound {
            warn!(
                payment_mandate_id = %mandate.id(),
                "token was already bound; keeping first binding"
            );
        }
        updater.complete(None);
        Ok(())
    }

    async fn get_payment_method_raw_credentials(
        &self,
        request: &Message,
        updater: &mut TaskUpdater,
    ) -> Ap2Result<()> {
        let mandate: PaymentMandate = required(request)?;
        let token = mandate
            .payment_mandate_contents
            .credential_token()
            .ok_or(Ap2Error::InvalidToken)?;

        let method = self.tokens.redeem(&token.value, mandate.id()).await?;
        let data = match serde_json::to_value(&method)? {
            Value::Object(map) => map,
            _ => return Err(Ap2Error::validation("PaymentMethod", "not an object")),
        };

        info!(payment_mandate_id = %mandate.id(), "released payment credentials");
        updater.add_artifact(vec![Part::Data { data }]);
        updater.complete(None);
        Ok(())
    }
}

#[async_trait]
impl AgentExecutor for CredentialsProviderExecutor {
    fn agent_card(&self) -> AgentCard {
        AgentCard::new(CREDENTIALS_PROVIDER_NAME, self.url.clone())
            .with_extension(AP2_EXTENSION_URI, true)
    }

    async fn execute(
        &self,
        request: &Message,
        _current: Option<&Task>,
        updater: &mut TaskUpdater,
    ) -> Ap2Result<()> {
        match operation(request)? {
            "get_shipping_address" => self.get_shipping_address(request, updater),
            "search_payment_methods" => self.search_payment_methods(request, updater),
            "create_payment_credential_token" => {
                self.create_payment_credential_token(request, updater).await
            }
            "signed_payment_mandate" => self.signed_payment_mandate(request, updater).await,
            "get_payment_method_raw_credentials" => {
                self.get_payment_method_raw_credentials(request, updater).await
            }
            other => Err(unknown_operation(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap2_core::credentials::AccountStore;
    use ap2_core::types::{PaymentCurrencyAmount, PaymentItem, PaymentMandateContents, PaymentResponse};
    use ap2_core::{MessageBuilder, PresenceVerifier, TaskState};

    const BUGS: &str = "bugsbunny@gmail.com";
    const AMEX_4444: &str = "American Express ending in 4444";

    fn executor() -> CredentialsProviderExecutor {
        CredentialsProviderExecutor::new(
            "http://cp.test",
            TokenStore::new(AccountStore::demo()),
            Arc::new(PresenceVerifier),
        )
    }

    fn updater() -> TaskUpdater {
        TaskUpdater::new(Task::new("t-1", "ctx-1"))
    }

    async fn run(executor: &CredentialsProviderExecutor, request: Message) -> Ap2Result<Task> {
        let mut updater = updater();
        executor.execute(&request, None, &mut updater).await?;
        Ok(updater.into_task())
    }

    fn mandate(token: &str, id: &str, authorized: bool) -> PaymentMandate {
        let response = PaymentResponse::new("order_1", "CARD").with_detail(
            keys::TOKEN,
            json!({"value": token, "url": "http://cp.test"}),
        );
        let mut mandate = PaymentMandate::new(PaymentMandateContents {
            payment_mandate_id: id.to_string(),
            payment_details_id: "order_1".to_string(),
            payment_details_total: PaymentItem::new("Total", PaymentCurrencyAmount::new("USD", 10.0)),
            payment_response: response,
            merchant_agent: "Generic Merchant".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        });
        if authorized {
            mandate.user_authorization = Some("signed".to_string());
        }
        mandate
    }

    fn op(name: &str) -> MessageBuilder {
        MessageBuilder::new().data(keys::OPERATION, name)
    }

    async fn issue(executor: &CredentialsProviderExecutor) -> String {
        let task = run(
            executor,
            op("create_payment_credential_token")
                .data(keys::USER_EMAIL, BUGS)
                .data(keys::PAYMENT_METHOD_ALIAS, AMEX_4444)
                .build(),
        )
        .await
        .unwrap();
        ap2_core::artifacts::find(&task.artifacts, keys::TOKEN)
            .and_then(Value::as_str)
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_search_payment_methods_amex_only() {
        let criterion = PaymentMethodData::new("CARD").with_networks(["amex", "visa"]);
        let task = run(
            &executor(),
            op("search_payment_methods")
                .data(keys::USER_EMAIL, BUGS)
                .canonical(&criterion)
                .unwrap()
                .build(),
        )
        .await
        .unwrap();

        assert_eq!(task.state(), TaskState::Completed);
        let aliases = ap2_core::artifacts::find(&task.artifacts, keys::PAYMENT_METHOD_ALIASES).unwrap();
        assert_eq!(
            aliases,
            &json!(["American Express ending in 4444", "American Express ending in 8888"])
        );
    }

    #[tokio::test]
    async fn test_search_requires_email_and_criteria() {
        let err = run(&executor(), op("search_payment_methods").data(keys::USER_EMAIL, BUGS).build())
            .await
            .unwrap_err();
        assert!(matches!(err, Ap2Error::MissingField { .. }));

        let criterion = PaymentMethodData::new("CARD").with_networks(["amex"]);
        let err = run(
            &executor(),
            op("search_payment_methods").canonical(&criterion).unwrap().build(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Ap2Error::MissingField { .. }));
    }

    #[tokio::test]
    async fn test_shipping_address_artifact() {
        let task = run(&executor(), op("get_shipping_address").data(keys::USER_EMAIL, BUGS).build())
            .await
            .unwrap();
        let address: ap2_core::types::ContactAddress =
            ap2_core::artifacts::exactly_one(&task.artifacts).unwrap();
        assert!(address.city.is_some());
    }

    #[tokio::test]
    async fn test_token_requires_known_alias() {
        let err = run(
            &executor(),
            op("create_payment_credential_token")
                .data(keys::USER_EMAIL, BUGS)
                .data(keys::PAYMENT_METHOD_ALIAS, "Diners Club")
                .build(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Ap2Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_bind_then_redeem_releases_method() {
        let executor = executor();
        let token = issue(&executor).await;

        run(
            &executor,
            op("signed_payment_mandate")
                .canonical(&mandate(&token, "pm_1", true))
                .unwrap()
                .build(),
        )
        .await
        .unwrap();

        let task = run(
            &executor,
            op("get_payment_method_raw_credentials")
                .canonical(&mandate(&token, "pm_1", true))
                .unwrap()
                .build(),
        )
        .await
        .unwrap();
        let data = ap2_core::artifacts::first_data(&task.artifacts).unwrap();
        assert_eq!(data["alias"], AMEX_4444);
    }

    #[tokio::test]
    async fn test_unsigned_mandate_cannot_bind() {
        let executor = executor();
        let token = issue(&executor).await;
        let err = run(
            &executor,
            op("signed_payment_mandate")
                .canonical(&mandate(&token, "pm_1", false))
                .unwrap()
                .build(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Ap2Error::Validation { .. }));
    }

    #[tokio::test]
    async fn test_redeem_failures_are_indistinguishable() {
        let executor = executor();
        let token = issue(&executor).await;
        run(
            &executor,
            op("signed_payment_mandate")
                .canonical(&mandate(&token, "pm_1", true))
                .unwrap()
                .build(),
        )
        .await
        .unwrap();

        let wrong_mandate = run(
            &executor,
            op("get_payment_method_raw_credentials")
                .canonical(&mandate(&token, "pm_other", true))
                .unwrap()
                .build(),
        )
        .await
        .unwrap_err();
        let unknown_token = run(
            &executor,
            op("get_payment_method_raw_credentials")
                .canonical(&mandate("ap2_tok_bogus", "pm_1", true))
                .unwrap()
                .build(),
        )
        .await
        .unwrap_err();

        assert_eq!(wrong_mandate.to_string(), unknown_token.to_string());
        assert!(matches!(wrong_mandate, Ap2Error::InvalidToken));
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let err = run(&executor(), op("launch_rocket").build()).await.unwrap_err();
        assert!(matches!(err, Ap2Error::Validation { .. }));
    }
}
