//! End-to-end mandate exchange over the in-process network.
//!
//! Shopping session -> merchant -> payment processor -> credentials provider,
//! covering the challenge flow, allowlist and precondition failures.

use ap2_agents::{LocalNetwork, ShoppingSession};
use ap2_core::keys;
use ap2_core::types::IntentMandate;
use ap2_core::{Ap2Config, Ap2Error, MessageBuilder, Task, TaskState};
use chrono::{Duration, Utc};

const BUGS: &str = "bugsbunny@gmail.com";
const AMEX_4444: &str = "American Express ending in 4444";

fn intent() -> IntentMandate {
    IntentMandate::new("red shoes", Utc::now() + Duration::hours(1))
}

/// Run every step up to (not including) payment initiation.
async fn signed_session(network: &LocalNetwork) -> ShoppingSession {
    let mut session = network.shopping_session().expect("session");

    let carts = session.find_products(intent()).await.expect("find_products");
    assert!(!carts.is_empty());
    let cart_id = carts[0].id().to_string();
    session.choose_cart(&cart_id).expect("choose_cart");

    let address = session.fetch_shipping_address(BUGS).await.expect("address");
    let updated = session.update_cart(address.clone()).await.expect("update_cart");
    assert_eq!(updated.id(), cart_id);
    assert_eq!(
        updated.contents.payment_request.shipping_address.as_ref(),
        Some(&address)
    );

    let aliases = session.fetch_payment_methods(BUGS).await.expect("methods");
    assert!(aliases.contains(&AMEX_4444.to_string()));

    session
        .fetch_payment_credential_token(BUGS, AMEX_4444)
        .await
        .expect("token");
    session.create_payment_mandate(BUGS).expect("mandate");
    session.sign_mandates_on_user_device().expect("sign");
    session.send_signed_payment_mandate().await.expect("bind");
    session
}

fn challenge_type(task: &Task) -> Option<String> {
    let message = task.status.message.as_ref()?;
    message
        .data_maps()
        .find_map(|data| data.get(keys::CHALLENGE))
        .and_then(|challenge| challenge.get("type"))
        .and_then(|kind| kind.as_str())
        .map(String::from)
}

#[tokio::test]
async fn test_full_purchase_with_challenge() {
    let network = LocalNetwork::demo(Ap2Config::default());
    let mut session = signed_session(&network).await;

    let task = session.initiate_payment().await.expect("initiate");
    assert_eq!(task.state(), TaskState::InputRequired);
    assert_eq!(challenge_type(&task).as_deref(), Some("otp"));

    let retry = session.initiate_payment_with_otp("000").await.expect("retry");
    assert_eq!(retry.state(), TaskState::InputRequired);
    assert_eq!(retry.id, task.id);
    assert_eq!(retry.status_text().as_deref(), Some("Challenge response incorrect."));

    let done = session.initiate_payment_with_otp("123").await.expect("complete");
    assert_eq!(done.state(), TaskState::Completed);
    assert_eq!(done.id, task.id);
}

#[tokio::test]
async fn test_completed_payment_cannot_be_resumed() {
    let network = LocalNetwork::demo(Ap2Config::default());
    let mut session = signed_session(&network).await;

    session.initiate_payment().await.unwrap();
    let done = session.initiate_payment_with_otp("123").await.unwrap();
    assert_eq!(done.state(), TaskState::Completed);

    let err = session.initiate_payment_with_otp("123").await.unwrap_err();
    assert!(matches!(err, Ap2Error::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_configured_challenge_code() {
    let mut config = Ap2Config::default();
    config.challenge.expected_response = "4711".to_string();
    let network = LocalNetwork::demo(config);
    let mut session = signed_session(&network).await;

    session.initiate_payment().await.unwrap();
    let retry = session.initiate_payment_with_otp("123").await.unwrap();
    assert_eq!(retry.state(), TaskState::InputRequired);
    let done = session.initiate_payment_with_otp("4711").await.unwrap();
    assert_eq!(done.state(), TaskState::Completed);
}

#[tokio::test]
async fn test_untrusted_shopping_agent_rejected() {
    let config = Ap2Config::default().with_shopping_agent_id("mallory");
    let network = LocalNetwork::demo(config);
    let mut session = network.shopping_session().unwrap();

    let err = session.find_products(intent()).await.unwrap_err();
    match err {
        Ap2Error::RemoteTaskFailed { state, message, .. } => {
            assert_eq!(state, "failed");
            assert!(message.contains("mallory"), "message: {}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unsupported_counterparty_fails_fast() {
    let mut config = Ap2Config::default();
    config.required_extensions = vec!["urn:example:not-declared".to_string()];
    let network = LocalNetwork::demo(config);
    let mut session = network.shopping_session().unwrap();

    let err = session.find_products(intent()).await.unwrap_err();
    assert!(matches!(err, Ap2Error::UnsupportedCounterparty { .. }));

    let merchant = network.directory().service(&network.config().merchant_url).unwrap();
    assert!(merchant.tasks().is_empty().await);
}

#[tokio::test]
async fn test_steps_require_their_preconditions() {
    let network = LocalNetwork::demo(Ap2Config::default());
    let mut session = network.shopping_session().unwrap();

    assert!(matches!(
        session.initiate_payment().await,
        Err(Ap2Error::MissingField { .. })
    ));
    assert!(matches!(
        session.create_payment_mandate(BUGS),
        Err(Ap2Error::MissingField { .. })
    ));
    assert!(matches!(
        session.initiate_payment_with_otp("123").await,
        Err(Ap2Error::MissingField { .. })
    ));
    assert!(matches!(
        session.choose_cart("cart_unknown"),
        Err(Ap2Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_unbound_token_fails_payment_after_challenge() {
    let network = LocalNetwork::demo(Ap2Config::default());
    let mut session = network.shopping_session().unwrap();

    let carts = session.find_products(intent()).await.unwrap();
    let cart_id = carts[0].id().to_string();
    session.choose_cart(&cart_id).unwrap();
    let address = session.fetch_shipping_address(BUGS).await.unwrap();
    session.update_cart(address).await.unwrap();
    session
        .fetch_payment_credential_token(BUGS, AMEX_4444)
        .await
        .unwrap();
    session.create_payment_mandate(BUGS).unwrap();
    session.sign_mandates_on_user_device().unwrap();
    // Skips send_signed_payment_mandate: the token is never bound.

    session.initiate_payment().await.unwrap();
    let task = session.initiate_payment_with_otp("123").await.unwrap();
    assert_eq!(task.state(), TaskState::Failed);
    assert!(task.status_text().unwrap_or_default().contains("invalid token"));
}

#[tokio::test]
async fn test_processor_rejects_missing_risk_data() {
    let network = LocalNetwork::demo(Ap2Config::default());
    let config = network.config().clone();
    let processor = network
        .client("merchant_payment_processor_agent", &config.payment_processor_url)
        .unwrap();

    let session = signed_session(&network).await;
    let message = MessageBuilder::new()
        .data(keys::OPERATION, "initiate_payment")
        .canonical(session.payment_mandate().unwrap())
        .unwrap()
        .build();

    let task = processor.send(message).await.unwrap();
    assert_eq!(task.state(), TaskState::Failed);
    assert!(task.status_text().unwrap_or_default().contains(keys::RISK_DATA));
}

#[tokio::test]
async fn test_unknown_operation_fails_task() {
    let network = LocalNetwork::demo(Ap2Config::default());
    let config = network.config().clone();
    let provider = network
        .client("credentials_provider", &config.credentials_provider_url)
        .unwrap();

    let task = provider
        .send(MessageBuilder::new().data(keys::OPERATION, "launch_rocket").build())
        .await
        .unwrap();
    assert_eq!(task.state(), TaskState::Failed);

    let no_operation = provider
        .send(MessageBuilder::new().text("hello").build())
        .await
        .unwrap();
    assert_eq!(no_operation.state(), TaskState::Failed);
}

#[tokio::test]
async fn test_resuming_unknown_task_is_not_found() {
    let network = LocalNetwork::demo(Ap2Config::default());
    let config = network.config().clone();
    let merchant = network.client("merchant_agent", &config.merchant_url).unwrap();

    let err = merchant
        .send(
            MessageBuilder::new()
                .task_id("no-such-task")
                .data(keys::OPERATION, "initiate_payment")
                .data(keys::SHOPPING_AGENT_ID, "trusted_shopping_agent")
                .build(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Ap2Error::NotFound { .. }));
}

#[tokio::test]
async fn test_update_unknown_cart_fails() {
    let network = LocalNetwork::demo(Ap2Config::default());
    let config = network.config().clone();
    let merchant = network.client("merchant_agent", &config.merchant_url).unwrap();

    let task = merchant
        .send(
            MessageBuilder::new()
                .data(keys::OPERATION, "update_cart")
                .data(keys::SHOPPING_AGENT_ID, "trusted_shopping_agent")
                .data(keys::CART_ID, "cart_99")
                .data(keys::SHIPPING_ADDRESS, serde_json::json!({"city": "Nowhere"}))
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(task.state(), TaskState::Failed);
    assert!(task.status_text().unwrap_or_default().contains("cart_99"));
}

#[tokio::test]
async fn test_concurrent_sessions_keep_their_own_carts() {
    let network = LocalNetwork::demo(Ap2Config::default());
    let mut alice = network.shopping_session().unwrap();
    let mut bob = network.shopping_session().unwrap();

    let alice_cart = alice.find_products(intent()).await.unwrap()[0].clone();
    let mug = IntentMandate::new("coffee mug", Utc::now() + Duration::hours(1));
    let bob_cart = bob.find_products(mug).await.unwrap()[0].clone();
    assert_ne!(alice_cart.id(), bob_cart.id());

    alice.choose_cart(alice_cart.id()).unwrap();
    bob.choose_cart(bob_cart.id()).unwrap();

    let address = alice.fetch_shipping_address(BUGS).await.unwrap();
    let alice_updated = alice.update_cart(address.clone()).await.unwrap().clone();
    let bob_updated = bob.update_cart(address).await.unwrap().clone();

    let total = |cart: &ap2_core::types::CartMandate| {
        cart.contents.payment_request.details.total.amount.value
    };
    assert_eq!(alice_updated.id(), alice_cart.id());
    assert_eq!(total(&alice_updated), total(&alice_cart));
    assert_eq!(bob_updated.id(), bob_cart.id());
    assert_eq!(total(&bob_updated), total(&bob_cart));
}

#[tokio::test]
async fn test_merchant_rejects_unsigned_mandate_before_processor() {
    let network = LocalNetwork::demo(Ap2Config::default());
    let mut session = network.shopping_session().unwrap();

    let cart_id = session.find_products(intent()).await.unwrap()[0].id().to_string();
    session.choose_cart(&cart_id).unwrap();
    let address = session.fetch_shipping_address(BUGS).await.unwrap();
    session.update_cart(address).await.unwrap();
    session
        .fetch_payment_credential_token(BUGS, AMEX_4444)
        .await
        .unwrap();
    let unsigned = session.create_payment_mandate(BUGS).unwrap().clone();
    assert!(!unsigned.is_authorized());

    let request = MessageBuilder::new()
        .context_id(session.context_id())
        .data(keys::OPERATION, "initiate_payment")
        .data(keys::SHOPPING_AGENT_ID, network.config().shopping_agent_id.clone())
        .canonical(&unsigned)
        .unwrap()
        .data(keys::RISK_DATA, session.risk_data().unwrap())
        .build();

    let config = network.config();
    let merchant = network.directory().service(&config.merchant_url).unwrap();
    let task = merchant.handle(request).await.unwrap();
    assert_eq!(task.state(), TaskState::Failed);
    assert!(task
        .status_text()
        .unwrap_or_default()
        .contains("user_authorization is missing"));

    let processor = network
        .directory()
        .service(&config.payment_processor_url)
        .unwrap();
    assert!(processor.tasks().is_empty().await);
}
