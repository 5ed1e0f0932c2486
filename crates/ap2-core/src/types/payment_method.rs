//! Account-side payment methods.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethodType {
    Card,
    BankAccount,
    DigitalWallet,
}

impl PaymentMethodType {
    /// Wire name, as used in `PaymentMethodData::supported_methods`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "CARD",
            Self::BankAccount => "BANK_ACCOUNT",
            Self::DigitalWallet => "DIGITAL_WALLET",
        }
    }
}

/// A network a card can be charged through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardNetwork {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<String>,
}

impl CardNetwork {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formats: Vec::new(),
        }
    }
}

/// A stored payment method. Read-only to everyone but its account.
///
/// Fields beyond type, alias and networks (card number token, cryptogram,
/// holder name, wallet brand, ...) are kept verbatim in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(rename = "type")]
    pub kind: PaymentMethodType,

    /// Unique per account, compared case-insensitively.
    pub alias: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub network: Vec<CardNetwork>,

    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl PaymentMethod {
    pub fn new(kind: PaymentMethodType, alias: impl Into<String>) -> Self {
        Self {
            kind,
            alias: alias.into(),
            network: Vec::new(),
            details: Map::new(),
        }
    }

    pub fn with_network(mut self, network: CardNetwork) -> Self {
        self.network.push(network);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn alias_matches(&self, alias: &str) -> bool {
        self.alias.to_lowercase() == alias.to_lowercase()
    }
}
