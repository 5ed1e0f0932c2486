//! Remote agent client.
//!
//! `RemoteAgentClient::send` confirms the counterparty declares every required
//! protocol extension (one agent card fetch per endpoint, cached for the
//! process lifetime), then delivers the message in a single request/response
//! round-trip. No retries happen at this layer.

pub mod cache;
pub mod client;
pub mod config;
pub mod directory;
pub mod transport;

pub use cache::CapabilityCache;
pub use client::RemoteAgentClient;
pub use config::RemoteAgentConfig;
pub use directory::{AgentDirectory, HttpDirectory};
pub use transport::{AgentTransport, HttpTransport, AGENT_CARD_PATH, EXTENSIONS_HEADER};
