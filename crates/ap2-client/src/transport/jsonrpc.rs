//! JSON-RPC 2.0 envelope for `message/send`.

use ap2_core::{Ap2Error, Ap2Result, Message, Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const SEND_METHOD: &str = "message/send";

#[derive(Debug, Serialize)]
pub(crate) struct SendRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: &'static str,
    pub params: SendParams<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendParams<'a> {
    pub message: &'a Message,
}

impl<'a> SendRequest<'a> {
    pub(crate) fn new(message: &'a Message) -> Self {
        Self {
            jsonrpc: "2.0",
            id: uuid::Uuid::new_v4().to_string(),
            method: SEND_METHOD,
            params: SendParams { message },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Turn a 2xx response body into a task, or a `RemoteAgent` error.
pub(crate) fn parse_send_response(status: u16, body: &str) -> Ap2Result<Task> {
    let malformed = |detail: String| Ap2Error::RemoteAgent {
        status: Some(status),
        body: format!("malformed response: {}", detail),
    };

    let response: SendResponse =
        serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(Ap2Error::RemoteAgent {
            status: Some(status),
            body: format!("JSON-RPC error {}: {}", error.code, error.message),
        });
    }

    let result = response
        .result
        .ok_or_else(|| malformed("neither result nor error".to_string()))?;
    serde_json::from_value(result).map_err(|e| malformed(format!("result is not a task: {}", e)))
}
