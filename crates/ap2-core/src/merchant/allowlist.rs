//! Caller identity allowlist.

use tracing::{info, warn};

use crate::error::{Ap2Error, Ap2Result};

/// The set of shopping agents a merchant will transact with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedAgents {
    agents: Vec<String>,
}

impl TrustedAgents {
    pub fn new<I, S>(agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            agents: agents.into_iter().map(Into::into).collect(),
        }
    }

    /// Check a declared caller identity. An empty allowlist trusts no one.
    pub fn check(&self, declared: Option<&str>) -> Ap2Result<()> {
        let Some(agent_id) = declared else {
            warn!("request is missing shopping_agent_id");
            return Err(Ap2Error::UnauthorizedCounterparty {
                agent_id: "<missing>".to_string(),
            });
        };

        if !self.agents.iter().any(|trusted| trusted == agent_id) {
            warn!(agent_id = %agent_id, "unknown shopping agent");
            return Err(Ap2Error::UnauthorizedCounterparty {
                agent_id: agent_id.to_string(),
            });
        }

        info!(agent_id = %agent_id, "authorized shopping agent");
        Ok(())
    }
}
