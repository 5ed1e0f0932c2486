//! HTTP transport: JSON-RPC over reqwest.
//!
//! This is the only place that interprets HTTP status codes.

use std::time::Duration;

use ap2_core::{AgentCard, Ap2Error, Ap2Result, Message, Task};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use super::jsonrpc::{parse_send_response, SendRequest};
use super::AgentTransport;
use crate::config::RemoteAgentConfig;

/// Agent card location relative to the endpoint URL.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";

/// Header carrying the extensions the caller activates.
pub const EXTENSIONS_HEADER: &str = "X-A2A-Extensions";

const USER_AGENT_VALUE: &str = concat!("ap2-client/", env!("CARGO_PKG_VERSION"));

fn transport_error(context: &str, e: reqwest::Error) -> Ap2Error {
    Ap2Error::RemoteAgent {
        status: e.status().map(|s| s.as_u16()),
        body: format!("{}: {}", context, e),
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &RemoteAgentConfig) -> Ap2Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| Ap2Error::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url()?,
        })
    }

    fn card_url(&self) -> String {
        format!("{}{}", self.base_url, AGENT_CARD_PATH)
    }

    /// Read the body of a response, mapping non-2xx to `RemoteAgent`.
    async fn checked_body(response: reqwest::Response) -> Ap2Result<(u16, String)> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("failed to read response body", e))?;

        match status {
            200..=299 => Ok((status, body)),
            _ => Err(Ap2Error::RemoteAgent {
                status: Some(status),
                body,
            }),
        }
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn fetch_agent_card(&self) -> Ap2Result<AgentCard> {
        let url = self.card_url();
        debug!(url = %url, "fetching agent card");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error("agent card request failed", e))?;
        let (status, body) = Self::checked_body(response).await?;

        serde_json::from_str(&body).map_err(|e| Ap2Error::RemoteAgent {
            status: Some(status),
            body: format!("malformed agent card: {}", e),
        })
    }

    async fn send_message(&self, message: &Message, extensions: &[String]) -> Ap2Result<Task> {
        debug!(
            endpoint = %self.base_url,
            message_id = %message.message_id,
            context_id = message.context_id.as_deref().unwrap_or(""),
            "sending message"
        );

        let mut request = self.client.post(&self.base_url).json(&SendRequest::new(message));
        if !extensions.is_empty() {
            request = request.header(EXTENSIONS_HEADER, extensions.join(","));
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error("message/send request failed", e))?;
        let (status, body) = Self::checked_body(response).await?;
        let task = parse_send_response(status, &body)?;

        debug!(task_id = %task.id, state = task.state().as_str(), "received task");
        Ok(task)
    }
}
