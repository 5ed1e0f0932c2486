//! Shopping-side session: drives one purchase across merchant and
//! credentials provider.

use std::sync::Arc;

use ap2_client::RemoteAgentClient;
use ap2_core::artifacts;
use ap2_core::keys;
use ap2_core::types::{
    CartMandate, ContactAddress, CredentialToken, IntentMandate, PaymentMandate,
    PaymentMandateContents, PaymentResponse,
};
use ap2_core::{Ap2Error, Ap2Result, MandateSigner, MessageBuilder, Task};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

/// State of one shopping journey.
///
/// Every step checks that the steps it depends on have run and fails with
/// `MissingField` naming the absent piece otherwise.
pub struct ShoppingSession {
    merchant: RemoteAgentClient,
    credentials_provider: RemoteAgentClient,
    signer: Arc<dyn MandateSigner>,
    shopping_agent_id: String,

    context_id: String,
    intent: Option<IntentMandate>,
    carts: Vec<CartMandate>,
    cart: Option<CartMandate>,
    shipping_address: Option<ContactAddress>,
    credential_token: Option<CredentialToken>,
    payment_mandate: Option<PaymentMandate>,
    risk_data: Option<String>,
    payment_task_id: Option<String>,
}

impl ShoppingSession {
    pub fn new(
        merchant: RemoteAgentClient,
        credentials_provider: RemoteAgentClient,
        signer: Arc<dyn MandateSigner>,
        shopping_agent_id: impl Into<String>,
    ) -> Self {
        Self {
            merchant,
            credentials_provider,
            signer,
            shopping_agent_id: shopping_agent_id.into(),
            context_id: uuid::Uuid::new_v4().to_string(),
            intent: None,
            carts: Vec::new(),
            cart: None,
            shipping_address: None,
            credential_token: None,
            payment_mandate: None,
            risk_data: None,
            payment_task_id: None,
        }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn intent(&self) -> Option<&IntentMandate> {
        self.intent.as_ref()
    }

    pub fn carts(&self) -> &[CartMandate] {
        &self.carts
    }

    pub fn chosen_cart(&self) -> Option<&CartMandate> {
        self.cart.as_ref()
    }

    pub fn shipping_address(&self) -> Option<&ContactAddress> {
        self.shipping_address.as_ref()
    }

    pub fn credential_token(&self) -> Option<&CredentialToken> {
        self.credential_token.as_ref()
    }

    pub fn payment_mandate(&self) -> Option<&PaymentMandate> {
        self.payment_mandate.as_ref()
    }

    pub fn risk_data(&self) -> Option<&str> {
        self.risk_data.as_deref()
    }

    pub fn payment_task_id(&self) -> Option<&str> {
        self.payment_task_id.as_deref()
    }

    fn message(&self) -> MessageBuilder {
        MessageBuilder::new().context_id(self.context_id.clone())
    }

    fn merchant_message(&self, operation: &str) -> MessageBuilder {
        self.message()
            .data(keys::OPERATION, operation)
            .data(keys::SHOPPING_AGENT_ID, self.shopping_agent_id.clone())
    }

    fn chosen(&self) -> Ap2Result<&CartMandate> {
        self.cart.as_ref().ok_or_else(|| Ap2Error::missing("cart_mandate"))
    }

    fn signed_mandate(&self) -> Ap2Result<&PaymentMandate> {
        self.payment_mandate
            .as_ref()
            .filter(|mandate| mandate.is_authorized())
            .ok_or_else(|| Ap2Error::missing("signed_payment_mandate"))
    }

    fn risk(&self) -> Ap2Result<&str> {
        self.risk_data
            .as_deref()
            .ok_or_else(|| Ap2Error::missing(keys::RISK_DATA))
    }

    /// Ask the merchant for carts matching `intent`.
    pub async fn find_products(&mut self, intent: IntentMandate) -> Ap2Result<&[CartMandate]> {
        let message = self
            .merchant_message("find_items")
            .text(intent.natural_language_description.clone())
            .canonical(&intent)?
            .build();
        let task = self.merchant.send_completed(message).await?;

        self.carts = artifacts::all(&task.artifacts)?;
        self.risk_data = artifacts::find(&task.artifacts, keys::RISK_DATA)
            .and_then(Value::as_str)
            .map(String::from);
        self.intent = Some(intent);

        info!(context_id = %self.context_id, carts = self.carts.len(), "received carts");
        Ok(&self.carts)
    }

    pub fn choose_cart(&mut self, cart_id: &str) -> Ap2Result<&CartMandate> {
        let cart = self
            .carts
            .iter()
            .find(|cart| cart.id() == cart_id)
            .cloned()
            .ok_or_else(|| Ap2Error::not_found(format!("cart {}", cart_id)))?;
        Ok(self.cart.insert(cart))
    }

    pub async fn fetch_shipping_address(&mut self, user_email: &str) -> Ap2Result<ContactAddress> {
        let message = self
            .message()
            .text("Get the user's shipping address.")
            .data(keys::OPERATION, "get_shipping_address")
            .data(keys::USER_EMAIL, user_email)
            .build();
        let task = self.credentials_provider.send_completed(message).await?;
        artifacts::exactly_one(&task.artifacts)
    }

    /// Send the chosen shipping address to the merchant and take its updated cart.
    pub async fn update_cart(
        &mut self,
        shipping_address: ContactAddress,
    ) -> Ap2Result<&CartMandate> {
        let cart_id = self.chosen()?.id().to_string();
        let message = self
            .merchant_message("update_cart")
            .text("Update the cart with the user's shipping address.")
            .data(keys::CART_ID, cart_id)
            .data_json(keys::SHIPPING_ADDRESS, &shipping_address)?
            .build();
        let task = self.merchant.send_completed(message).await?;

        let updated: CartMandate = artifacts::exactly_one(&task.artifacts)?;
        self.shipping_address = Some(shipping_address);
        Ok(self.cart.insert(updated))
    }

    /// Aliases of the user's payment methods the chosen cart accepts.
    pub async fn fetch_payment_methods(&mut self, user_email: &str) -> Ap2Result<Vec<String>> {
        let mut builder = self
            .message()
            .text("Get a filtered list of the user's payment methods.")
            .data(keys::OPERATION, "search_payment_methods")
            .data(keys::USER_EMAIL, user_email);
        for method_data in &self.chosen()?.contents.payment_request.method_data {
            builder = builder.canonical(method_data)?;
        }
        let task = self.credentials_provider.send_completed(builder.build()).await?;

        let data = artifacts::first_data(&task.artifacts)?;
        let aliases = data
            .get(keys::PAYMENT_METHOD_ALIASES)
            .ok_or_else(|| Ap2Error::not_found(keys::PAYMENT_METHOD_ALIASES))?;
        ap2_core::codec::from_value("payment_method_aliases", aliases)
    }

    pub async fn fetch_payment_credential_token(
        &mut self,
        user_email: &str,
        payment_method_alias: &str,
    ) -> Ap2Result<&CredentialToken> {
        let message = self
            .message()
            .text("Get a payment credential token for the user's payment method.")
            .data(keys::OPERATION, "create_payment_credential_token")
            .data(keys::USER_EMAIL, user_email)
            .data(keys::PAYMENT_METHOD_ALIAS, payment_method_alias)
            .build();
        let task = self.credentials_provider.send_completed(message).await?;

        let value = artifacts::find(&task.artifacts, keys::TOKEN)
            .and_then(Value::as_str)
            .ok_or_else(|| Ap2Error::not_found(keys::TOKEN))?
            .to_string();
        let url = self.credentials_provider.agent_card().await?.url;
        Ok(self.credential_token.insert(CredentialToken { value, url }))
    }

    /// Build an unsigned payment mandate for the chosen cart.
    pub fn create_payment_mandate(&mut self, user_email: &str) -> Ap2Result<&PaymentMandate> {
        let cart = self.chosen()?;
        let token = self
            .credential_token
            .as_ref()
            .ok_or_else(|| Ap2Error::missing("payment_credential_token"))?;
        let shipping_address = self
            .shipping_address
            .clone()
            .ok_or_else(|| Ap2Error::missing(keys::SHIPPING_ADDRESS))?;

        let request = &cart.contents.payment_request;
        let mut response = PaymentResponse::new(request.details.id.clone(), "CARD")
            .with_detail(keys::TOKEN, token.to_value());
        response.shipping_address = Some(shipping_address);
        response.payer_email = Some(user_email.to_string());

        let mandate = PaymentMandate::new(PaymentMandateContents {
            payment_mandate_id: uuid::Uuid::new_v4().simple().to_string(),
            payment_details_id: request.details.id.clone(),
            payment_details_total: request.details.total.clone(),
            payment_response: response,
            merchant_agent: cart.contents.merchant_name.clone(),
            timestamp: Utc::now().to_rfc3339(),
        });
        Ok(self.payment_mandate.insert(mandate))
    }

    /// Authorize the payment mandate against the chosen cart.
    pub fn sign_mandates_on_user_device(&mut self) -> Ap2Result<String> {
        let cart = self.chosen()?;
        let mandate = self
            .payment_mandate
            .as_ref()
            .ok_or_else(|| Ap2Error::missing("payment_mandate"))?;
        let authorization = self.signer.sign(cart, &mandate.payment_mandate_contents)?;

        if let Some(mandate) = self.payment_mandate.as_mut() {
            mandate.user_authorization = Some(authorization.clone());
        }
        Ok(authorization)
    }

    /// Bind the credential token to the signed mandate at the credentials provider.
    pub async fn send_signed_payment_mandate(&mut self) -> Ap2Result<Task> {
        let message = self
            .message()
            .text("This is the signed payment mandate")
            .data(keys::OPERATION, "signed_payment_mandate")
            .canonical(self.signed_mandate()?)?
            .data(keys::RISK_DATA, self.risk()?)
            .build();
        self.credentials_provider.send_completed(message).await
    }

    /// Start payment at the merchant. The returned task is usually
    /// `input-required` with a challenge.
    pub async fn initiate_payment(&mut self) -> Ap2Result<Task> {
        let message = self
            .merchant_message("initiate_payment")
            .text("Initiate a payment")
            .canonical(self.signed_mandate()?)?
            .data(keys::RISK_DATA, self.risk()?)
            .build();
        let task = self.merchant.send(message).await?;
        self.payment_task_id = Some(task.id.clone());
        Ok(task)
    }

    /// Answer the outstanding challenge on the payment task.
    pub async fn initiate_payment_with_otp(&mut self, challenge_response: &str) -> Ap2Result<Task> {
        let task_id = self
            .payment_task_id
            .clone()
            .ok_or_else(|| Ap2Error::missing("initiate_payment_task_id"))?;
        let message = self
            .merchant_message("initiate_payment")
            .task_id(task_id)
            .text("Initiate a payment. Include the challenge response.")
            .canonical(self.signed_mandate()?)?
            .data(keys::CHALLENGE_RESPONSE, challenge_response)
            .data(keys::RISK_DATA, self.risk()?)
            .build();
        self.merchant.send(message).await
    }
}
