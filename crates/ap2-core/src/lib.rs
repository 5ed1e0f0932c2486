//! Core of the Agent Payments Protocol mandate exchange.
//!
//! Data model, canonical object codec, message construction, artifact
//! extraction, credential matching, token lifecycle, merchant state and the
//! payment challenge state machine. Transport lives in `ap2-client`; the role
//! executors live in `ap2-agents`.

pub mod a2a;
pub mod artifacts;
pub mod codec;
pub mod config;
pub mod credentials;
pub mod error;
pub mod keys;
pub mod merchant;
pub mod payment;
pub mod signing;
pub mod types;

pub use a2a::{AgentCard, Artifact, Message, MessageBuilder, Part, Task, TaskState};
pub use codec::{Canonical, CanonicalObject};
pub use config::{Ap2Config, ChallengeConfig};
pub use credentials::{AccountStore, TokenStore};
pub use error::{Ap2Error, Ap2Result};
pub use signing::{DigestSigner, MandateSigner, MandateVerifier, PresenceVerifier};
