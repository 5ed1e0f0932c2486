//! Incremental construction of outgoing messages.

use serde::Serialize;
use serde_json::Value;

use super::wire::{Message, Part, Role};
use crate::codec::{self, CanonicalObject};
use crate::error::Ap2Result;

/// Builds an outgoing user-role message.
///
/// Pure: nothing leaves the process until the built message is handed to a
/// remote agent client. Duplicate data keys are kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    context_id: Option<String>,
    task_id: Option<String>,
    parts: Vec<Part>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group this message with others in a multi-turn exchange.
    pub fn context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    /// Continue an existing task instead of starting one.
    pub fn task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn maybe_task_id(mut self, task_id: Option<impl Into<String>>) -> Self {
        self.task_id = task_id.map(Into::into);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::text(text));
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parts.push(Part::data(key, value.into()));
        self
    }

    /// Append any serializable value under `key`.
    pub fn data_json<T: Serialize>(self, key: impl Into<String>, value: &T) -> Ap2Result<Self> {
        let value = serde_json::to_value(value)?;
        Ok(self.data(key, value))
    }

    /// Append a canonical object under its well-known key.
    pub fn canonical<T: CanonicalObject>(mut self, object: &T) -> Ap2Result<Self> {
        self.parts.push(codec::encode(object)?);
        Ok(self)
    }

    pub fn build(self) -> Message {
        Message {
            message_id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            parts: self.parts,
            context_id: self.context_id,
            task_id: self.task_id,
        }
    }
}
