//! Read access to TON accounts through tonapi.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::errors::AdminError;

/// Read-only view of TON contracts
#[async_trait]
pub trait TonApi: Send + Sync {
    /// Run a get-method with no arguments and return its first stack entry
    async fn run_get_method(&self, address: &str, method: &str) -> Result<u128, AdminError>;

    /// Account balance in nanotons
    async fn account_balance(&self, address: &str) -> Result<u128, AdminError>;
}

#[derive(Debug, Deserialize)]
struct MethodExecution {
    success: bool,
    exit_code: i64,
    #[serde(default)]
    stack: Vec<StackEntry>,
}

#[derive(Debug, Deserialize)]
struct StackEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    num: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Account {
    balance: u64,
}

/// Parse a TVM integer as rendered by tonapi (`0x`-prefixed hex or decimal)
pub fn parse_stack_number(raw: &str) -> Result<u128, AdminError> {
    let parsed = match raw.strip_prefix("0x") {
        Some(hex_digits) => u128::from_str_radix(hex_digits, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| AdminError::ReadError(format!("invalid stack number {raw}: {e}")))
}

pub struct TonApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl TonApiClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, AdminError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdminError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, AdminError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("tonapi GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AdminError::ReadError(format!("GET {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdminError::ReadError(format!("GET {path}: {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| AdminError::ReadError(format!("GET {path}: invalid response: {e}")))
    }
}

#[async_trait]
impl TonApi for TonApiClient {
    async fn run_get_method(&self, address: &str, method: &str) -> Result<u128, AdminError> {
        let execution: MethodExecution = self
            .get(&format!("/v2/blockchain/accounts/{address}/methods/{method}"))
            .await?;

        if !execution.success || execution.exit_code != 0 {
            return Err(AdminError::ReadError(format!(
                "{method} exited with code {}",
                execution.exit_code
            )));
        }

        match execution.stack.first() {
            Some(StackEntry {
                kind,
                num: Some(num),
            }) if kind == "num" => parse_stack_number(num),
            _ => Err(AdminError::ReadError(format!(
                "{method} did not return a number"
            ))),
        }
    }

    async fn account_balance(&self, address: &str) -> Result<u128, AdminError> {
        let account: Account = self.get(&format!("/v2/accounts/{address}")).await?;
        Ok(account.balance.into())
    }
}
