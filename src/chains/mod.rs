//! Chain adapters: balance queries and transfers, one adapter per chain.
//!
//! The dispatcher only sees the [`ChainAdapter`] trait; the concrete
//! implementations speak JSON-RPC for balances and delegate transfers to
//! an external signer service (this crate never touches key material).

mod ethereum;
mod solana;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agent::intent::ChainKind;
use crate::error::ChainError;

pub use ethereum::EthereumAdapter;
pub use solana::SolanaAdapter;

/// One chain's balance/transfer surface.
///
/// `balance(None)` queries the configured wallet's own address. All
/// failures are reported as [`ChainError`]; the pipeline treats them
/// uniformly and never retries.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Native-token balance as a decimal string (e.g. `"1.5"`).
    async fn balance(&self, address: Option<&str>) -> Result<String, ChainError>;

    /// Submit a transfer; returns the transaction identifier.
    async fn transfer(&self, to: &str, amount: &str) -> Result<String, ChainError>;
}

/// Maps a [`ChainKind`] to its adapter.
#[derive(Clone)]
pub struct ChainRegistry {
    ethereum: Arc<dyn ChainAdapter>,
    solana: Arc<dyn ChainAdapter>,
}

impl ChainRegistry {
    pub fn new(ethereum: Arc<dyn ChainAdapter>, solana: Arc<dyn ChainAdapter>) -> Self {
        Self { ethereum, solana }
    }

    pub fn adapter(&self, chain: ChainKind) -> &Arc<dyn ChainAdapter> {
        match chain {
            ChainKind::Ethereum => &self.ethereum,
            ChainKind::Solana => &self.solana,
        }
    }
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct JsonRpcReply {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// One JSON-RPC call; returns the `result` value or the error message.
pub(crate) async fn rpc_call(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<serde_json::Value, ChainError> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0",
        id: 1,
        method,
        params,
    };

    let response = client
        .post(url)
        .json(&request)
        .send()
        .await
        .map_err(|e| ChainError::Rpc(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ChainError::Rpc(format!("HTTP {status}: {body}")));
    }

    let reply: JsonRpcReply = response
        .json()
        .await
        .map_err(|e| ChainError::Response(e.to_string()))?;

    if let Some(error) = reply.error {
        return Err(ChainError::Rpc(format!(
            "{} (code {})",
            error.message, error.code
        )));
    }
    reply
        .result
        .ok_or_else(|| ChainError::Response("reply carries neither result nor error".to_string()))
}

/// Request body sent to the external signer service.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct SignerTransferRequest<'a> {
    pub chain: ChainKind,
    pub to: &'a str,
    pub amount: &'a str,
}
