//! Account store: payment methods and shipping address per account.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Ap2Error, Ap2Result};
use crate::types::{CardNetwork, ContactAddress, PaymentMethod, PaymentMethodType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ContactAddress>,
    /// Storage order is significant: eligibility results follow it.
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
}

/// Read-only account lookup, keyed by account id (the user's email).
///
/// Constructed once per process or per test; cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    accounts: Arc<HashMap<String, Account>>,
}

impl AccountStore {
    pub fn new(accounts: HashMap<String, Account>) -> Self {
        Self {
            accounts: Arc::new(accounts),
        }
    }

    /// Load accounts from a YAML (or JSON) file mapping email to account.
    pub fn from_yaml_file(path: &Path) -> Ap2Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Ap2Error::Config {
            message: format!("failed to read accounts file {}: {}", path.display(), e),
        })?;
        let accounts: HashMap<String, Account> =
            serde_yaml::from_str(&text).map_err(|e| Ap2Error::Config {
                message: format!("failed to parse accounts file {}: {}", path.display(), e),
            })?;
        Ok(Self::new(accounts))
    }

    /// Payment methods for `account_id`, in storage order. Unknown accounts have none.
    pub fn payment_methods(&self, account_id: &str) -> &[PaymentMethod] {
        self.accounts
            .get(account_id)
            .map(|account| account.payment_methods.as_slice())
            .unwrap_or_default()
    }

    pub fn shipping_address(&self, account_id: &str) -> Option<&ContactAddress> {
        self.accounts
            .get(account_id)
            .and_then(|account| account.shipping_address.as_ref())
    }

    /// Case-insensitive alias lookup.
    pub fn payment_method(&self, account_id: &str, alias: &str) -> Option<&PaymentMethod> {
        self.payment_methods(account_id)
            .iter()
            .find(|method| method.alias_matches(alias))
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.accounts.contains_key(account_id)
    }

    /// The three sample accounts used by the demo flow.
    pub fn demo() -> Self {
        let mut accounts = HashMap::new();

        let amex = |alias: &str, cryptogram: &str, token: &str, holder: &str, expiry: &str| {
            PaymentMethod::new(PaymentMethodType::Card, alias)
                .with_network(CardNetwork {
                    name: "amex".to_string(),
                    formats: vec!["DPAN".to_string()],
                })
                .with_detail("cryptogram", cryptogram)
                .with_detail("token", token)
                .with_detail("card_holder_name", holder)
                .with_detail("card_expiration", expiry)
                .with_detail(
                    "card_billing_address",
                    json!({"country": "US", "postal_code": "00000"}),
                )
        };

        accounts.insert(
            "bugsbunny@gmail.com".to_string(),
            Account {
                shipping_address: Some(ContactAddress {
                    recipient: Some("Bugs Bunny".to_string()),
                    organization: Some("Sample Organization".to_string()),
                    address_line: vec!["123 Main St".to_string()],
                    city: Some("Sample City".to_string()),
                    region: Some("ST".to_string()),
                    postal_code: Some("00000".to_string()),
                    country: Some("US".to_string()),
                    phone_number: Some("+1-000-000-0000".to_string()),
                    ..ContactAddress::default()
                }),
                payment_methods: vec![
                    amex(
                        "American Express ending in 4444",
                        "fake_cryptogram_abc123",
                        "1111000000000000",
                        "John Doe",
                        "12/2025",
                    ),
                    amex(
                        "American Express ending in 8888",
                        "fake_cryptogram_ghi789",
                        "2222000000000000",
                        "Bugs Bunny",
                        "10/2027",
                    ),
                    PaymentMethod::new(PaymentMethodType::BankAccount, "Primary bank account")
                        .with_detail("account_number", "111"),
                    PaymentMethod::new(PaymentMethodType::DigitalWallet, "Bugs's PayPal account")
                        .with_detail("brand", "PayPal")
                        .with_detail("account_identifier", "foo@bar.com"),
                ],
            },
        );

        accounts.insert(
            "daffyduck@gmail.com".to_string(),
            Account {
                shipping_address: None,
                payment_methods: vec![PaymentMethod::new(
                    PaymentMethodType::BankAccount,
                    "Main checking account",
                )
                .with_detail("brand", "Bank of Money")
                .with_detail("account_number", "789")],
            },
        );

        accounts.insert(
            "elmerfudd@gmail.com".to_string(),
            Account {
                shipping_address: None,
                payment_methods: vec![PaymentMethod::new(
                    PaymentMethodType::DigitalWallet,
                    "Fudd's PayPal",
                )
                .with_detail("brand", "PayPal")
                .with_detail("account_identifier", "elmerfudd@gmail.com")],
            },
        );

        Self::new(accounts)
    }
}
