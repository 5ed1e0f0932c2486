//! In-process transport: agents wired together without HTTP.

use std::collections::HashMap;
use std::sync::Arc;

use ap2_client::{AgentDirectory, AgentTransport};
use ap2_core::{AgentCard, Ap2Error, Ap2Result, Message, Task};
use async_trait::async_trait;
use tracing::debug;

use crate::service::AgentService;

#[derive(Clone)]
pub struct LocalTransport {
    url: String,
    service: AgentService,
}

impl LocalTransport {
    pub fn new(url: impl Into<String>, service: AgentService) -> Self {
        Self {
            url: url.into(),
            service,
        }
    }
}

#[async_trait]
impl AgentTransport for LocalTransport {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn fetch_agent_card(&self) -> Ap2Result<AgentCard> {
        Ok(self.service.agent_card())
    }

    async fn send_message(&self, message: &Message, extensions: &[String]) -> Ap2Result<Task> {
        debug!(endpoint = %self.url, extensions = ?extensions, "local delivery");
        self.service.handle(message.clone()).await
    }
}

/// URL -> in-process agent.
#[derive(Clone, Default)]
pub struct LocalDirectory {
    agents: HashMap<String, AgentService>,
}

impl LocalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, url: impl Into<String>, service: AgentService) {
        self.agents.insert(url.into(), service);
    }

    pub fn service(&self, url: &str) -> Option<&AgentService> {
        self.agents.get(url)
    }
}

impl AgentDirectory for LocalDirectory {
    fn transport_for(&self, url: &str) -> Ap2Result<Arc<dyn AgentTransport>> {
        let service = self.agents.get(url).ok_or_else(|| Ap2Error::RemoteAgent {
            status: None,
            body: format!("no agent registered at {}", url),
        })?;
        Ok(Arc::new(LocalTransport::new(url, service.clone())))
    }
}
