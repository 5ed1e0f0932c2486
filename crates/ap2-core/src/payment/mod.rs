//! Payment initiation.

pub mod challenge;

pub use challenge::{ChallengeDescriptor, ChallengeFlow, ChallengePhase};
