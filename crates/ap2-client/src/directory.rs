//! Resolving endpoint URLs to transports.
//!
//! The payment processor learns the credentials provider URL at runtime from
//! the credential token, so transports are resolved per call.

use std::sync::Arc;

use ap2_core::Ap2Result;

use crate::config::RemoteAgentConfig;
use crate::transport::{AgentTransport, HttpTransport};

pub trait AgentDirectory: Send + Sync {
    fn transport_for(&self, url: &str) -> Ap2Result<Arc<dyn AgentTransport>>;
}

/// Every URL is an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    timeout_secs: u64,
}

impl HttpDirectory {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl AgentDirectory for HttpDirectory {
    fn transport_for(&self, url: &str) -> Ap2Result<Arc<dyn AgentTransport>> {
        let config = RemoteAgentConfig::new(url).with_timeout(self.timeout_secs);
        Ok(Arc::new(HttpTransport::new(&config)?))
    }
}
