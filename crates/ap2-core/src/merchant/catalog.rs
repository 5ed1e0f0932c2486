//! Merchant catalog and cart construction.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    CartContents, CartMandate, IntentMandate, PaymentCurrencyAmount, PaymentDetailsInit,
    PaymentItem, PaymentMethodData, PaymentOptions, PaymentRequest,
};

/// Networks every generated cart accepts.
pub const ACCEPTED_CARD_NETWORKS: [&str; 3] = ["mastercard", "paypal", "amex"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub sku: String,
    pub label: String,
    pub amount: PaymentCurrencyAmount,
    /// Search terms beyond the label.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CatalogItem {
    pub fn new(
        sku: impl Into<String>,
        label: impl Into<String>,
        amount: PaymentCurrencyAmount,
    ) -> Self {
        Self {
            sku: sku.into(),
            label: label.into(),
            amount,
            keywords: Vec::new(),
        }
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Whether any word of `description` appears in the label or keywords.
    fn matches_description(&self, description: &str) -> bool {
        let label = self.label.to_lowercase();
        let keywords: Vec<String> = self.keywords.iter().map(|k| k.to_lowercase()).collect();
        description
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| word.len() > 2)
            .map(str::to_lowercase)
            .any(|word| label.contains(&word) || keywords.iter().any(|k| k.contains(&word)))
    }
}

/// What one merchant sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub merchant_name: String,
    #[serde(default)]
    pub items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(merchant_name: impl Into<String>) -> Self {
        Self {
            merchant_name: merchant_name.into(),
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: CatalogItem) -> Self {
        self.items.push(item);
        self
    }

    /// Items that may fulfil `intent`.
    ///
    /// A merchant filter that excludes this merchant yields nothing. A SKU
    /// filter is exact. Otherwise items are matched on the description; when
    /// no item matches the description the whole catalog is offered.
    pub fn matching(&self, intent: &IntentMandate) -> Vec<&CatalogItem> {
        if let Some(merchants) = &intent.merchants {
            let me = self.merchant_name.to_lowercase();
            if !merchants.iter().any(|m| m.to_lowercase() == me) {
                return Vec::new();
            }
        }

        if let Some(skus) = &intent.skus {
            return self.items.iter().filter(|item| skus.contains(&item.sku)).collect();
        }

        let described: Vec<&CatalogItem> = self
            .items
            .iter()
            .filter(|item| item.matches_description(&intent.natural_language_description))
            .collect();
        if described.is_empty() {
            self.items.iter().collect()
        } else {
            described
        }
    }

    /// One cart per matching item. Each offer mints fresh cart and order
    /// ids, so carts from different searches never share an id.
    pub fn offer(
        &self,
        intent: &IntentMandate,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Vec<CartMandate> {
        self.matching(intent)
            .into_iter()
            .map(|item| self.cart_for(item, now + ttl, intent))
            .collect()
    }

    fn cart_for(
        &self,
        item: &CatalogItem,
        expiry: DateTime<Utc>,
        intent: &IntentMandate,
    ) -> CartMandate {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let line = PaymentItem::new(item.label.clone(), item.amount.clone());
        let payment_request = PaymentRequest {
            method_data: vec![PaymentMethodData::new("CARD").with_networks(ACCEPTED_CARD_NETWORKS)],
            details: PaymentDetailsInit {
                id: format!("order_{}", suffix),
                display_items: vec![line],
                shipping_options: None,
                total: PaymentItem::new("Total", item.amount.clone()),
            },
            options: Some(PaymentOptions {
                request_shipping: true,
                ..PaymentOptions::default()
            }),
            shipping_address: None,
        };

        CartMandate {
            contents: CartContents {
                id: format!("cart_{}", suffix),
                user_cart_confirmation_required: intent.user_cart_confirmation_required,
                payment_request,
                cart_expiry: expiry.to_rfc3339(),
                merchant_name: self.merchant_name.clone(),
            },
            merchant_authorization: None,
        }
    }

    /// A small fixed catalog for demos and tests.
    pub fn demo() -> Self {
        Self::new("Generic Merchant")
            .with_item(
                CatalogItem::new(
                    "SHOE-RED-42",
                    "Red canvas sneakers",
                    PaymentCurrencyAmount::new("USD", 79.0),
                )
                .with_keywords(&["shoes", "sneakers", "red"]),
            )
            .with_item(
                CatalogItem::new(
                    "SHOE-RED-LTH",
                    "Red leather loafers",
                    PaymentCurrencyAmount::new("USD", 129.0),
                )
                .with_keywords(&["shoes", "loafers", "red"]),
            )
            .with_item(
                CatalogItem::new(
                    "MUG-CER-01",
                    "Ceramic coffee mug",
                    PaymentCurrencyAmount::new("USD", 14.5),
                )
                .with_keywords(&["coffee", "mug", "cup"]),
            )
    }
}
