//! Error taxonomy for mandate exchange.

/// Mandate exchange errors.
///
/// Every variant aborts the current task with a terminal `failed` state; none
/// are retried internally.
#[derive(Debug, thiserror::Error)]
pub enum Ap2Error {
    /// A mandate or field is malformed.
    #[error("validation failed for {what}: {message}")]
    Validation { what: String, message: String },

    /// A required attachment or field is absent from the request.
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// No canonical object or stored record under the given key.
    #[error("not found: {key}")]
    NotFound { key: String },

    /// More than one canonical object where exactly one was required.
    #[error("ambiguous result for {key}: expected exactly one, found {count}")]
    AmbiguousResult { key: String, count: usize },

    /// The counterparty does not declare every required extension.
    #[error("counterparty {agent} does not support required extensions: {}", .missing.join(", "))]
    UnsupportedCounterparty { agent: String, missing: Vec<String> },

    /// Transport failure or non-2xx / malformed response from a remote agent.
    #[error("remote agent error{}: {body}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    RemoteAgent { status: Option<u16>, body: String },

    /// A remote agent answered but ended its task without completing it.
    #[error("{agent} task {task_id} ended {state}: {message}")]
    RemoteTaskFailed {
        agent: String,
        task_id: String,
        state: String,
        message: String,
    },

    /// `bind` was called with a token that was never issued.
    #[error("unknown token")]
    UnknownToken,

    /// Token redemption failed. Deliberately carries no detail.
    #[error("invalid token")]
    InvalidToken,

    /// Caller identity is not in the trusted-agent set.
    #[error("unauthorized counterparty: {agent_id}")]
    UnauthorizedCounterparty { agent_id: String },

    /// A task was resumed from a state that does not accept input.
    #[error("invalid transition: {message}")]
    InvalidTransition { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Serialization of an outgoing object failed.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl Ap2Error {
    pub fn validation(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            what: what.into(),
            message: message.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Malformed input / lookup failures
            Self::Validation { .. } => 1,
            Self::MissingField { .. } => 1,
            Self::NotFound { .. } => 1,
            Self::AmbiguousResult { .. } => 1,
            Self::InvalidTransition { .. } => 1,

            // Trust / credential failures
            Self::UnauthorizedCounterparty { .. } => 3,
            Self::UnknownToken => 4,
            Self::InvalidToken => 4,

            // Counterparty / network
            Self::UnsupportedCounterparty { .. } => 5,
            Self::RemoteAgent { .. } => 5,
            Self::RemoteTaskFailed { .. } => 5,

            // Other
            Self::Config { .. } => 2,
            Self::Serialization { .. } => 6,
        }
    }

    /// Whether a caller could reasonably retry. This layer never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteAgent { status: None, .. })
    }
}

impl From<serde_json::Error> for Ap2Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for mandate exchange operations.
pub type Ap2Result<T> = Result<T, Ap2Error>;
