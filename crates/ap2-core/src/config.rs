//! Runtime configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Ap2Error, Ap2Result};
use crate::keys::AP2_EXTENSION_URI;

fn default_shopping_agent_id() -> String {
    "trusted_shopping_agent".to_string()
}

fn default_trusted_shopping_agents() -> Vec<String> {
    vec![default_shopping_agent_id()]
}

fn default_merchant_url() -> String {
    "http://localhost:8001/a2a/merchant_agent".to_string()
}

fn default_credentials_provider_url() -> String {
    "http://localhost:8002/a2a/credentials_provider".to_string()
}

fn default_payment_processor_url() -> String {
    "http://localhost:8003/a2a/merchant_payment_processor_agent".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_required_extensions() -> Vec<String> {
    vec![AP2_EXTENSION_URI.to_string()]
}

fn default_merchant_name() -> String {
    "Generic Merchant".to_string()
}

fn default_cart_ttl_minutes() -> i64 {
    30
}

fn default_expected_response() -> String {
    "123".to_string()
}

fn default_display_text() -> String {
    "The payment method issuer sent a verification code to the phone number on file, \
     please enter it below. It will be shared with the issuer so they can authorize \
     the transaction."
        .to_string()
}

/// Step-up challenge settings for the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Value a challenge response must equal exactly.
    #[serde(default = "default_expected_response")]
    pub expected_response: String,

    /// Prompt shown to the user.
    #[serde(default = "default_display_text")]
    pub display_text: String,

    /// Include the expected value as a hint in the descriptor (demo only).
    #[serde(default)]
    pub reveal_hint: bool,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            expected_response: default_expected_response(),
            display_text: default_display_text(),
            reveal_hint: false,
        }
    }
}

/// Settings shared by every role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ap2Config {
    /// Identity the shopping side declares to merchants.
    #[serde(default = "default_shopping_agent_id")]
    pub shopping_agent_id: String,

    /// Shopping agents a merchant accepts.
    #[serde(default = "default_trusted_shopping_agents")]
    pub trusted_shopping_agents: Vec<String>,

    #[serde(default = "default_merchant_url")]
    pub merchant_url: String,

    #[serde(default = "default_credentials_provider_url")]
    pub credentials_provider_url: String,

    #[serde(default = "default_payment_processor_url")]
    pub payment_processor_url: String,

    /// Request timeout in seconds for remote agents.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Extensions every counterparty must declare.
    #[serde(default = "default_required_extensions")]
    pub required_extensions: Vec<String>,

    #[serde(default)]
    pub challenge: ChallengeConfig,

    #[serde(default = "default_merchant_name")]
    pub merchant_name: String,

    /// Lifetime of a generated cart.
    #[serde(default = "default_cart_ttl_minutes")]
    pub cart_ttl_minutes: i64,
}

impl Default for Ap2Config {
    fn default() -> Self {
        Self {
            shopping_agent_id: default_shopping_agent_id(),
            trusted_shopping_agents: default_trusted_shopping_agents(),
            merchant_url: default_merchant_url(),
            credentials_provider_url: default_credentials_provider_url(),
            payment_processor_url: default_payment_processor_url(),
            timeout_secs: default_timeout(),
            required_extensions: default_required_extensions(),
            challenge: ChallengeConfig::default(),
            merchant_name: default_merchant_name(),
            cart_ttl_minutes: default_cart_ttl_minutes(),
        }
    }
}

impl Ap2Config {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            shopping_agent_id: std::env::var("AP2_SHOPPING_AGENT_ID")
                .unwrap_or(defaults.shopping_agent_id),
            trusted_shopping_agents: std::env::var("AP2_TRUSTED_SHOPPING_AGENTS")
                .ok()
                .map(|v| split_list(&v))
                .unwrap_or(defaults.trusted_shopping_agents),
            merchant_url: std::env::var("AP2_MERCHANT_URL").unwrap_or(defaults.merchant_url),
            credentials_provider_url: std::env::var("AP2_CREDENTIALS_PROVIDER_URL")
                .unwrap_or(defaults.credentials_provider_url),
            payment_processor_url: std::env::var("AP2_PAYMENT_PROCESSOR_URL")
                .unwrap_or(defaults.payment_processor_url),
            timeout_secs: std::env::var("AP2_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            challenge: ChallengeConfig {
                expected_response: std::env::var("AP2_CHALLENGE_CODE")
                    .unwrap_or(defaults.challenge.expected_response),
                ..defaults.challenge
            },
            ..defaults
        }
    }

    /// Load a YAML config file. Missing fields take their defaults.
    pub fn from_yaml_file(path: &Path) -> Ap2Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Ap2Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        serde_yaml::from_str(&content).map_err(|e| Ap2Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
        })
    }

    pub fn to_yaml(&self) -> Ap2Result<String> {
        serde_yaml::to_string(self).map_err(|e| Ap2Error::Serialization {
            message: e.to_string(),
        })
    }

    pub fn with_shopping_agent_id(mut self, id: impl Into<String>) -> Self {
        self.shopping_agent_id = id.into();
        self
    }

    pub fn with_trusted_shopping_agents(mut self, agents: Vec<String>) -> Self {
        self.trusted_shopping_agents = agents;
        self
    }

    pub fn with_merchant_url(mut self, url: impl Into<String>) -> Self {
        self.merchant_url = url.into();
        self
    }

    pub fn with_credentials_provider_url(mut self, url: impl Into<String>) -> Self {
        self.credentials_provider_url = url.into();
        self
    }

    pub fn with_payment_processor_url(mut self, url: impl Into<String>) -> Self {
        self.payment_processor_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_challenge(mut self, challenge: ChallengeConfig) -> Self {
        self.challenge = challenge;
        self
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
