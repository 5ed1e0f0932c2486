//! Payment request types (W3C Payment Request API shapes).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::contact::ContactAddress;

/// Monetary amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCurrencyAmount {
    /// ISO 4217 currency code
    pub currency: String,
    pub value: f64,
}

impl PaymentCurrencyAmount {
    pub fn new(currency: impl Into<String>, value: f64) -> Self {
        Self {
            currency: currency.into(),
            value,
        }
    }
}

/// A line item (or the total) of a payment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentItem {
    pub label: String,
    pub amount: PaymentCurrencyAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
    /// Refund window in days.
    #[serde(default = "default_refund_period")]
    pub refund_period: u32,
}

fn default_refund_period() -> u32 {
    30
}

impl PaymentItem {
    pub fn new(label: impl Into<String>, amount: PaymentCurrencyAmount) -> Self {
        Self {
            label: label.into(),
            amount,
            pending: None,
            refund_period: default_refund_period(),
        }
    }
}

/// One accepted payment method criterion.
///
/// `data.network` lists the accepted networks for card-like methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodData {
    pub supported_methods: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl PaymentMethodData {
    pub fn new(supported_methods: impl Into<String>) -> Self {
        Self {
            supported_methods: supported_methods.into(),
            data: Map::new(),
        }
    }

    /// Set the accepted networks.
    pub fn with_networks<I, S>(mut self, networks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = networks
            .into_iter()
            .map(|n| Value::String(n.into()))
            .collect();
        self.data.insert("network".to_string(), Value::Array(list));
        self
    }

    /// Accepted networks; non-string entries are ignored.
    pub fn networks(&self) -> Vec<&str> {
        self.data
            .get("network")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentShippingOption {
    pub id: String,
    pub label: String,
    pub amount: PaymentCurrencyAmount,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetailsInit {
    pub id: String,
    pub display_items: Vec<PaymentItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_options: Option<Vec<PaymentShippingOption>>,
    pub total: PaymentItem,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOptions {
    #[serde(default)]
    pub request_payer_name: bool,
    #[serde(default)]
    pub request_payer_email: bool,
    #[serde(default)]
    pub request_payer_phone: bool,
    #[serde(default)]
    pub request_shipping: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_type: Option<String>,
}

/// What the merchant will accept and what the user is paying for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub method_data: Vec<PaymentMethodData>,
    pub details: PaymentDetailsInit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PaymentOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ContactAddress>,
}

/// The user's answer to a payment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub request_id: String,
    pub method_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ContactAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_option: Option<PaymentShippingOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_phone: Option<String>,
}

impl PaymentResponse {
    pub fn new(request_id: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            method_name: method_name.into(),
            details: None,
            shipping_address: None,
            shipping_option: None,
            payer_name: None,
            payer_email: None,
            payer_phone: None,
        }
    }

    /// Set one entry of `details`.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}
