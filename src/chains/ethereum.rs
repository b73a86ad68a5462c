//! Ethereum adapter: `eth_getBalance` over JSON-RPC, transfers through
//! the external signer service.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::agent::intent::ChainKind;
use crate::chains::{ChainAdapter, SignerTransferRequest, rpc_call};
use crate::config::ChainConfig;
use crate::error::ChainError;

const WEI_SCALE: u32 = 18;

pub struct EthereumAdapter {
    client: reqwest::Client,
    rpc_url: String,
    signer_url: String,
    wallet_address: String,
}

impl EthereumAdapter {
    pub fn new(config: &ChainConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            rpc_url: config.rpc_url.clone(),
            signer_url: config.signer_url.clone(),
            wallet_address: config.wallet_address.clone(),
        }
    }
}

#[derive(Deserialize)]
struct SignerTransferReply {
    tx_hash: String,
}

#[async_trait]
impl ChainAdapter for EthereumAdapter {
    async fn balance(&self, address: Option<&str>) -> Result<String, ChainError> {
        let address = address.unwrap_or(&self.wallet_address);
        let result = rpc_call(
            &self.client,
            &self.rpc_url,
            "eth_getBalance",
            serde_json::json!([address, "latest"]),
        )
        .await?;

        let hex = result
            .as_str()
            .ok_or_else(|| ChainError::Response("eth_getBalance result is not a string".to_string()))?;
        wei_to_eth(hex)
    }

    async fn transfer(&self, to: &str, amount: &str) -> Result<String, ChainError> {
        let request = SignerTransferRequest {
            chain: ChainKind::Ethereum,
            to,
            amount,
        };
        let response = self
            .client
            .post(&self.signer_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChainError::Signer(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Signer(format!("HTTP {status}: {body}")));
        }

        let reply: SignerTransferReply = response
            .json()
            .await
            .map_err(|e| ChainError::Signer(format!("malformed signer reply: {e}")))?;
        Ok(reply.tx_hash)
    }
}

/// Convert a hex wei quantity (`0x...`) to a decimal ETH string.
fn wei_to_eth(hex: &str) -> Result<String, ChainError> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    let wei = u128::from_str_radix(digits, 16)
        .map_err(|e| ChainError::Response(format!("bad wei quantity {hex:?}: {e}")))?;
    let wei = i128::try_from(wei)
        .map_err(|_| ChainError::Response(format!("wei quantity out of range: {hex:?}")))?;
    let eth = Decimal::try_from_i128_with_scale(wei, WEI_SCALE)
        .map_err(|_| ChainError::Response(format!("wei quantity out of range: {hex:?}")))?;
    Ok(eth.normalize().to_string())
}
