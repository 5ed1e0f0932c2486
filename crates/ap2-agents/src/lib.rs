//! AP2 agent roles.
//!
//! Each role is an [`AgentExecutor`] routed by the `operation` data part of
//! the incoming message. [`AgentService`] owns the task lifecycle around an
//! executor; [`LocalNetwork`] wires every role together in one process.

pub mod executor;
pub mod local;
pub mod network;
pub mod roles;
pub mod service;
pub mod shopping;
pub mod task_store;
pub mod updater;

pub use executor::AgentExecutor;
pub use local::{LocalDirectory, LocalTransport};
pub use network::LocalNetwork;
pub use service::AgentService;
pub use shopping::ShoppingSession;
pub use task_store::TaskStore;
pub use updater::TaskUpdater;
