//! Well-known data part keys.

pub const INTENT_MANDATE: &str = "ap2.mandates.IntentMandate";
pub const CART_MANDATE: &str = "ap2.mandates.CartMandate";
pub const PAYMENT_MANDATE: &str = "ap2.mandates.PaymentMandate";
pub const PAYMENT_METHOD_DATA: &str = "payment_request.PaymentMethodData";
pub const CONTACT_ADDRESS: &str = "contact_picker.ContactAddress";

pub const OPERATION: &str = "operation";
pub const USER_EMAIL: &str = "user_email";
pub const PAYMENT_METHOD_ALIAS: &str = "payment_method_alias";
pub const PAYMENT_METHOD_ALIASES: &str = "payment_method_aliases";
pub const SHOPPING_AGENT_ID: &str = "shopping_agent_id";
pub const RISK_DATA: &str = "risk_data";
pub const CHALLENGE: &str = "challenge";
pub const CHALLENGE_RESPONSE: &str = "challenge_response";
pub const CART_ID: &str = "cart_id";
pub const SHIPPING_ADDRESS: &str = "shipping_address";
pub const TOKEN: &str = "token";
pub const PAYMENT_PROCESSOR_TASK_ID: &str = "payment_processor_task_id";

/// Agent Payments Protocol extension URI.
pub const AP2_EXTENSION_URI: &str = "https://github.com/google-agentic-commerce/ap2/v1";
