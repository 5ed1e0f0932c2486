//! How messages reach a remote agent.

use ap2_core::{AgentCard, Ap2Result, Message, Task};
use async_trait::async_trait;

mod http;
mod jsonrpc;

pub use http::{HttpTransport, AGENT_CARD_PATH, EXTENSIONS_HEADER};

/// One remote endpoint.
///
/// Implementations perform exactly one round-trip per call and never retry.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Stable identifier of the endpoint, used as the capability cache key.
    fn endpoint(&self) -> &str;

    async fn fetch_agent_card(&self) -> Ap2Result<AgentCard>;

    /// Deliver `message`, declaring `extensions` as activated by the caller.
    async fn send_message(&self, message: &Message, extensions: &[String]) -> Ap2Result<Task>;
}
