//! Per-endpoint client configuration.

use ap2_core::{Ap2Error, Ap2Result};
use serde::{Deserialize, Serialize};

fn default_timeout() -> u64 {
    30
}

/// Where a remote agent lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAgentConfig {
    pub url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RemoteAgentConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// The endpoint URL without a trailing slash, checked to be absolute http(s).
    pub fn base_url(&self) -> Ap2Result<String> {
        let parsed = url::Url::parse(&self.url).map_err(|e| Ap2Error::Config {
            message: format!("invalid agent url {:?}: {}", self.url, e),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(self.url.trim_end_matches('/').to_string()),
            other => Err(Ap2Error::Config {
                message: format!("unsupported scheme {:?} in agent url {}", other, self.url),
            }),
        }
    }
}
