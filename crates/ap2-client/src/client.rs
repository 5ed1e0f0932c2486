//! Capability-checked remote agent client.

use std::fmt;
use std::sync::Arc;

use ap2_core::{AgentCard, Ap2Error, Ap2Result, Message, Task, TaskState};
use tracing::{debug, info, warn};

use crate::cache::CapabilityCache;
use crate::config::RemoteAgentConfig;
use crate::directory::AgentDirectory;
use crate::transport::{AgentTransport, HttpTransport};

#[derive(Clone)]
pub struct RemoteAgentClient {
    name: String,
    transport: Arc<dyn AgentTransport>,
    required_extensions: Vec<String>,
    cache: CapabilityCache,
}

impl fmt::Debug for RemoteAgentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteAgentClient")
            .field("name", &self.name)
            .field("endpoint", &self.transport.endpoint())
            .field("required_extensions", &self.required_extensions)
            .finish()
    }
}

impl RemoteAgentClient {
    pub fn new(
        name: impl Into<String>,
        transport: Arc<dyn AgentTransport>,
        required_extensions: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            transport,
            required_extensions,
            cache: CapabilityCache::new(),
        }
    }

    /// Client over HTTP for one configured endpoint.
    pub fn http(
        name: impl Into<String>,
        config: &RemoteAgentConfig,
        required_extensions: Vec<String>,
    ) -> Ap2Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(name, Arc::new(transport), required_extensions))
    }

    /// Client for whatever endpoint `url` resolves to in `directory`.
    pub fn from_directory(
        directory: &dyn AgentDirectory,
        name: impl Into<String>,
        url: &str,
        required_extensions: Vec<String>,
    ) -> Ap2Result<Self> {
        Ok(Self::new(name, directory.transport_for(url)?, required_extensions))
    }

    /// Share a capability cache with other clients.
    pub fn with_cache(mut self, cache: CapabilityCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// The counterparty's agent card, fetched at most once per endpoint.
    pub async fn agent_card(&self) -> Ap2Result<AgentCard> {
        let endpoint = self.transport.endpoint();
        if let Some(card) = self.cache.get(endpoint).await {
            return Ok(card);
        }

        let card = self.transport.fetch_agent_card().await?;
        debug!(agent = %self.name, endpoint = %endpoint, "cached agent card");
        self.cache.insert(endpoint, card.clone()).await;
        Ok(card)
    }

    /// Fail with `UnsupportedCounterparty` unless every required extension is declared.
    pub async fn ensure_supported(&self) -> Ap2Result<()> {
        let card = self.agent_card().await?;
        let missing: Vec<String> = self
            .required_extensions
            .iter()
            .filter(|uri| !card.supports(uri))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        warn!(agent = %self.name, missing = ?missing, "counterparty lacks required extensions");
        Err(Ap2Error::UnsupportedCounterparty {
            agent: self.name.clone(),
            missing,
        })
    }

    /// Send one message and return the resulting task.
    pub async fn send(&self, message: Message) -> Ap2Result<Task> {
        self.ensure_supported().await?;

        let task = self
            .transport
            .send_message(&message, &self.required_extensions)
            .await?;

        info!(
            agent = %self.name,
            task_id = %task.id,
            context_id = %task.context_id,
            state = task.state().as_str(),
            "remote task updated"
        );
        Ok(task)
    }

    /// Send and require the remote task to end `completed`.
    pub async fn send_completed(&self, message: Message) -> Ap2Result<Task> {
        let task = self.send(message).await?;
        if task.state() == TaskState::Completed {
            return Ok(task);
        }
        Err(Ap2Error::RemoteTaskFailed {
            agent: self.name.clone(),
            task_id: task.id.clone(),
            state: task.state().as_str().to_string(),
            message: task.status_text().unwrap_or_default(),
        })
    }
}
