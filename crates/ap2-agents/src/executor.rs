//! Role executors and request routing.

use ap2_core::codec;
use ap2_core::keys;
use ap2_core::{AgentCard, Ap2Error, Ap2Result, Message, Task};
use async_trait::async_trait;

use crate::updater::TaskUpdater;

/// Handles requests for one agent role.
///
/// Returning `Err` fails the task with the error text; executors only touch
/// the updater for outcomes other than that.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    fn agent_card(&self) -> AgentCard;

    /// `current` is the task being resumed, if the request named one.
    async fn execute(
        &self,
        request: &Message,
        current: Option<&Task>,
        updater: &mut TaskUpdater,
    ) -> Ap2Result<()>;
}

/// The `operation` a request names.
pub fn operation(request: &Message) -> Ap2Result<&str> {
    codec::find_str(keys::OPERATION, &request.parts)
        .ok_or_else(|| Ap2Error::validation("request", "missing operation"))
}

pub fn unknown_operation(operation: &str) -> Ap2Error {
    Ap2Error::validation("request", format!("unknown operation: {}", operation))
}

/// Required string field from a request.
pub fn required_str<'a>(request: &'a Message, key: &str) -> Ap2Result<&'a str> {
    codec::find_str(key, &request.parts).ok_or_else(|| Ap2Error::missing(key))
}

/// Required canonical object; absence is `MissingField`, a bad shape is `Validation`.
pub fn required<T: codec::CanonicalObject>(request: &Message) -> Ap2Result<T> {
    let value =
        codec::find(T::DATA_KEY, &request.parts).ok_or_else(|| Ap2Error::missing(T::DATA_KEY))?;
    codec::from_value(T::NAME, value)
}
