//! JSON-RPC 2.0 over HTTP, used by the NEAR adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::errors::AdminError;

/// Abstract JSON-RPC transport so adapters can be tested with fakes
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Send a request and return its `result`; RPC-level errors become `ReadError`
    async fn request(&self, method: &str, params: Value) -> Result<Value, AdminError>;
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// reqwest-backed transport
pub struct HttpRpcTransport {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpRpcTransport {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, AdminError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdminError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpRpcTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, AdminError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!("RPC {} -> {}", method, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdminError::ReadError(format!("{method} timed out: {e}"))
                } else {
                    AdminError::ReadError(format!("{method} failed: {e}"))
                }
            })?;

        let rpc_response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| AdminError::ReadError(format!("{method}: invalid response: {e}")))?;

        if let Some(error) = rpc_response.error {
            let detail = error
                .data
                .map(|data| format!(" ({data})"))
                .unwrap_or_default();
            return Err(AdminError::ReadError(format!(
                "{method}: {}: {}{detail}",
                error.code, error.message
            )));
        }

        rpc_response
            .result
            .ok_or_else(|| AdminError::ReadError(format!("{method}: empty response")))
    }
}

/// Re-tag a transport failure that happened while sending a write
pub fn into_submission(err: AdminError) -> AdminError {
    match err {
        AdminError::ReadError(message) => AdminError::SubmissionError(message),
        other => other,
    }
}

/// Pull a typed field out of an RPC result
pub fn field<T: serde::de::DeserializeOwned>(value: &Value, pointer: &str) -> Result<T, AdminError> {
    let raw = value
        .pointer(pointer)
        .ok_or_else(|| AdminError::ReadError(format!("response is missing {pointer}")))?;
    serde_json::from_value(raw.clone())
        .map_err(|e| AdminError::ReadError(format!("unexpected {pointer} in response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_extraction() {
        let value = json!({"value": {"blockhash": "abc", "slot": 7}});
        let hash: String = field(&value, "/value/blockhash").unwrap();
        assert_eq!(hash, "abc");
        let slot: u64 = field(&value, "/value/slot").unwrap();
        assert_eq!(slot, 7);
        assert!(field::<String>(&value, "/value/missing").is_err());
        assert!(field::<u64>(&value, "/value/blockhash").is_err());
    }

    #[test]
    fn test_into_submission_retags_read_errors() {
        let err = into_submission(AdminError::ReadError("boom".to_string()));
        assert!(matches!(err, AdminError::SubmissionError(_)));

        let err = into_submission(AdminError::InvalidAddress("x".to_string()));
        assert!(matches!(err, AdminError::InvalidAddress(_)));
    }
}
