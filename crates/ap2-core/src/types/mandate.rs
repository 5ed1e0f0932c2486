//! Mandate types.
//!
//! Three mandates move through a purchase:
//!
//! | Mandate | Issued by | Purpose |
//! |---------|-----------|---------|
//! | [`IntentMandate`] | shopping side | what to shop for |
//! | [`CartMandate`] | merchant | one concrete offer |
//! | [`PaymentMandate`] | shopping side, authorized by the user | payment for one cart |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payment_request::{PaymentItem, PaymentRequest, PaymentResponse};

/// The user's purchase intent. Immutable once sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentMandate {
    #[serde(default = "default_true")]
    pub user_cart_confirmation_required: bool,

    /// Free-text description of what the user wants.
    pub natural_language_description: String,

    /// Merchants allowed to fulfil the intent (any when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchants: Option<Vec<String>>,

    /// SKUs allowed to fulfil the intent (any when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skus: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_refundability: Option<bool>,

    /// RFC 3339 expiry.
    pub intent_expiry: String,
}

fn default_true() -> bool {
    true
}

impl IntentMandate {
    pub fn new(description: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            user_cart_confirmation_required: true,
            natural_language_description: description.into(),
            merchants: None,
            skus: None,
            requires_refundability: None,
            intent_expiry: expiry.to_rfc3339(),
        }
    }

    pub fn with_merchants(mut self, merchants: Vec<String>) -> Self {
        self.merchants = Some(merchants);
        self
    }

    pub fn with_skus(mut self, skus: Vec<String>) -> Self {
        self.skus = Some(skus);
        self
    }
}

/// Contents of a merchant offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartContents {
    /// Unique per offer; stable across updates.
    pub id: String,
    pub user_cart_confirmation_required: bool,
    pub payment_request: PaymentRequest,
    /// RFC 3339 expiry.
    pub cart_expiry: String,
    pub merchant_name: String,
}

/// A merchant offer. Superseded, never deleted, on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartMandate {
    pub contents: CartContents,
    /// Merchant signature over `contents` (placeholder until signing lands).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_authorization: Option<String>,
}

impl CartMandate {
    pub fn id(&self) -> &str {
        &self.contents.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMandateContents {
    /// Generated client-side; unique.
    pub payment_mandate_id: String,
    pub payment_details_id: String,
    pub payment_details_total: PaymentItem,
    pub payment_response: PaymentResponse,
    pub merchant_agent: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
}

impl PaymentMandateContents {
    /// The credential token carried in `payment_response.details.token`.
    pub fn credential_token(&self) -> Option<CredentialToken> {
        let token = self.payment_response.details.as_ref()?.get("token")?;
        serde_json::from_value(token.clone()).ok()
    }
}

/// Payment authorization for one cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMandate {
    pub payment_mandate_contents: PaymentMandateContents,
    /// Set exactly once by the authorizing actor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_authorization: Option<String>,
}

impl PaymentMandate {
    pub fn new(contents: PaymentMandateContents) -> Self {
        Self {
            payment_mandate_contents: contents,
            user_authorization: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.payment_mandate_contents.payment_mandate_id
    }

    pub fn is_authorized(&self) -> bool {
        self.user_authorization
            .as_deref()
            .is_some_and(|auth| !auth.is_empty())
    }
}

/// Opaque credential token plus the credentials provider that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialToken {
    pub value: String,
    pub url: String,
}

impl CredentialToken {
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "value": self.value, "url": self.url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::payment_request::PaymentCurrencyAmount;
    use serde_json::json;

    fn contents_with_details(details: Option<serde_json::Map<String, Value>>) -> PaymentMandateContents {
        PaymentMandateContents {
            payment_mandate_id: "pm_1".to_string(),
            payment_details_id: "order_1".to_string(),
            payment_details_total: PaymentItem::new(
                "Total",
                PaymentCurrencyAmount::new("USD", 10.0),
            ),
            payment_response: PaymentResponse {
                request_id: "order_1".to_string(),
                method_name: "CARD".to_string(),
                details,
                shipping_address: None,
                shipping_option: None,
                payer_name: None,
                payer_email: None,
                payer_phone: None,
            },
            merchant_agent: "Generic Merchant".to_string(),
            timestamp: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_credential_token_extracted() {
        let details = json!({"token": {"value": "tok_1", "url": "http://cp"}});
        let contents = contents_with_details(details.as_object().cloned());
        let token = contents.credential_token().unwrap();
        assert_eq!(token.value, "tok_1");
        assert_eq!(token.url, "http://cp");
    }

    #[test]
    fn test_credential_token_absent() {
        assert!(contents_with_details(None).credential_token().is_none());
        let details = json!({"token": "not-an-object"});
        assert!(contents_with_details(details.as_object().cloned())
            .credential_token()
            .is_none());
    }

    #[test]
    fn test_empty_authorization_is_not_authorized() {
        let mut mandate = PaymentMandate::new(contents_with_details(None));
        assert!(!mandate.is_authorized());
        mandate.user_authorization = Some(String::new());
        assert!(!mandate.is_authorized());
        mandate.user_authorization = Some("sig".to_string());
        assert!(mandate.is_authorized());
    }

    #[test]
    fn test_intent_defaults_confirmation_required() {
        let intent: IntentMandate = serde_json::from_value(json!({
            "natural_language_description": "red shoes",
            "intent_expiry": "2030-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(intent.user_cart_confirmation_required);
        assert!(intent.merchants.is_none());
    }
}
