//! Step-up challenge state machine for payment initiation.
//!
//! ```text
//! None ──issue──▶ ChallengeIssued ──respond(ok)──▶ Verified ──▶ Completed
//!                      │   ▲                           │
//!              respond(bad)│                           └──▶ Failed
//!                      ▼   │
//!                      Retry
//! ```
//!
//! Suspension is expressed purely through the task state: a resumed task in
//! `input-required` is a pending challenge. Nothing here needs process memory
//! to survive between the two calls. Retries are unbounded.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::a2a::TaskState;
use crate::config::ChallengeConfig;
use crate::error::{Ap2Error, Ap2Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengePhase {
    None,
    ChallengeIssued,
    Verified,
    Retry,
    Completed,
    Failed,
}

impl ChallengePhase {
    /// Phase implied by the prior task of an incoming request.
    ///
    /// No task starts a fresh flow. A task awaiting input has a challenge
    /// outstanding. Any other prior state cannot be resumed.
    pub fn resume_from(prior: Option<TaskState>) -> Ap2Result<Self> {
        match prior {
            None => Ok(Self::None),
            Some(TaskState::InputRequired) => Ok(Self::ChallengeIssued),
            Some(other) => Err(Ap2Error::InvalidTransition {
                message: format!("cannot resume a payment task in state {}", other.as_str()),
            }),
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::ChallengeIssued => "CHALLENGE_ISSUED",
            Self::Verified => "VERIFIED",
            Self::Retry => "RETRY",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    /// Task state reported while in this phase.
    pub const fn task_state(&self) -> TaskState {
        match self {
            Self::None => TaskState::Submitted,
            Self::ChallengeIssued | Self::Retry => TaskState::InputRequired,
            Self::Verified => TaskState::Working,
            Self::Completed => TaskState::Completed,
            Self::Failed => TaskState::Failed,
        }
    }

    pub const fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::None => &[Self::ChallengeIssued, Self::Failed],
            Self::ChallengeIssued | Self::Retry => &[Self::Verified, Self::Retry, Self::Failed],
            Self::Verified => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed => &[],
        }
    }

    pub fn can_transition_to(&self, target: Self) -> bool {
        self.valid_transitions().contains(&target)
    }
}

impl fmt::Display for ChallengePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the user-facing side is asked to answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub display_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// One payment initiation's walk through the challenge phases.
#[derive(Debug, Clone)]
pub struct ChallengeFlow {
    phase: ChallengePhase,
    config: ChallengeConfig,
}

impl ChallengeFlow {
    pub fn resume(prior: Option<TaskState>, config: ChallengeConfig) -> Ap2Result<Self> {
        Ok(Self {
            phase: ChallengePhase::resume_from(prior)?,
            config,
        })
    }

    pub fn phase(&self) -> ChallengePhase {
        self.phase
    }

    fn transition_to(&mut self, target: ChallengePhase) -> Ap2Result<ChallengePhase> {
        let current = self.phase;
        if !current.can_transition_to(target) {
            return Err(Ap2Error::InvalidTransition {
                message: format!(
                    "{current} -> {target} (valid: {:?})",
                    current.valid_transitions()
                ),
            });
        }
        info!(from = %current, to = %target, "challenge transition");
        self.phase = target;
        Ok(current)
    }

    /// Issue a challenge and suspend.
    pub fn issue(&mut self) -> Ap2Result<ChallengeDescriptor> {
        self.transition_to(ChallengePhase::ChallengeIssued)?;
        let hint = self.config.reveal_hint.then(|| {
            format!("Demo only hint: the code is {}", self.config.expected_response)
        });
        Ok(ChallengeDescriptor {
            kind: "otp".to_string(),
            display_text: self.config.display_text.clone(),
            hint,
        })
    }

    /// Check a response by exact string match.
    ///
    /// Returns the new phase: `Verified` on match, `Retry` otherwise.
    pub fn respond(&mut self, response: &str) -> Ap2Result<ChallengePhase> {
        let target = if response == self.config.expected_response {
            ChallengePhase::Verified
        } else {
            ChallengePhase::Retry
        };
        self.transition_to(target)?;
        Ok(target)
    }

    pub fn complete(&mut self) -> Ap2Result<()> {
        self.transition_to(ChallengePhase::Completed).map(|_| ())
    }

    /// Fail from any non-terminal phase.
    pub fn fail(&mut self) -> Ap2Result<()> {
        self.transition_to(ChallengePhase::Failed).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> ChallengeFlow {
        ChallengeFlow::resume(None, ChallengeConfig::default()).unwrap()
    }

    #[test]
    fn test_issue_suspends_with_input_required() {
        let mut flow = fresh();
        let descriptor = flow.issue().unwrap();
        assert_eq!(descriptor.kind, "otp");
        assert!(descriptor.hint.is_none());
        assert_eq!(flow.phase(), ChallengePhase::ChallengeIssued);
        assert_eq!(flow.phase().task_state(), TaskState::InputRequired);
    }

    #[test]
    fn test_hint_only_when_revealed() {
        let config = ChallengeConfig {
            reveal_hint: true,
            ..ChallengeConfig::default()
        };
        let mut flow = ChallengeFlow::resume(None, config).unwrap();
        let descriptor = flow.issue().unwrap();
        assert_eq!(descriptor.hint.as_deref(), Some("Demo only hint: the code is 123"));
    }

    #[test]
    fn test_correct_response_completes() {
        let mut flow =
            ChallengeFlow::resume(Some(TaskState::InputRequired), ChallengeConfig::default())
                .unwrap();
        assert_eq!(flow.respond("123").unwrap(), ChallengePhase::Verified);
        flow.complete().unwrap();
        assert_eq!(flow.phase().task_state(), TaskState::Completed);
    }

    #[test]
    fn test_wrong_response_retries_without_limit() {
        let mut flow =
            ChallengeFlow::resume(Some(TaskState::InputRequired), ChallengeConfig::default())
                .unwrap();
        for _ in 0..50 {
            assert_eq!(flow.respond("000").unwrap(), ChallengePhase::Retry);
            assert_eq!(flow.phase().task_state(), TaskState::InputRequired);
        }
        assert_eq!(flow.respond("123").unwrap(), ChallengePhase::Verified);
    }

    #[test]
    fn test_match_is_exact() {
        let mut flow =
            ChallengeFlow::resume(Some(TaskState::InputRequired), ChallengeConfig::default())
                .unwrap();
        assert_eq!(flow.respond(" 123").unwrap(), ChallengePhase::Retry);
        assert_eq!(flow.respond("").unwrap(), ChallengePhase::Retry);
    }

    #[test]
    fn test_resume_from_non_input_state_rejected() {
        for state in [TaskState::Completed, TaskState::Failed, TaskState::Working] {
            assert!(matches!(
                ChallengePhase::resume_from(Some(state)),
                Err(Ap2Error::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn test_cannot_skip_challenge() {
        let mut flow = fresh();
        assert!(flow.respond("123").is_err());
        assert!(flow.complete().is_err());
        assert_eq!(flow.phase(), ChallengePhase::None);
    }

    #[test]
    fn test_terminal_phases_have_no_exits() {
        assert!(ChallengePhase::Completed.valid_transitions().is_empty());
        assert!(ChallengePhase::Failed.valid_transitions().is_empty());
        assert!(ChallengePhase::Completed.is_terminal());
        assert!(!ChallengePhase::Retry.is_terminal());
    }

    #[test]
    fn test_fail_after_verified() {
        let mut flow =
            ChallengeFlow::resume(Some(TaskState::InputRequired), ChallengeConfig::default())
                .unwrap();
        flow.respond("123").unwrap();
        flow.fail().unwrap();
        assert_eq!(flow.phase(), ChallengePhase::Failed);
        assert!(flow.fail().is_err());
    }
}
