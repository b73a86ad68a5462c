//! Solana adapter: `getBalance` over JSON-RPC, transfers through the
//! external signer service.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::agent::intent::ChainKind;
use crate::chains::{ChainAdapter, SignerTransferRequest, rpc_call};
use crate::config::ChainConfig;
use crate::error::ChainError;

const LAMPORT_SCALE: u32 = 9;

pub struct SolanaAdapter {
    client: reqwest::Client,
    rpc_url: String,
    signer_url: String,
    wallet_address: String,
}

impl SolanaAdapter {
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

/// `getBalance` wraps the lamport count in a context envelope.
#[derive(Deserialize)]
struct BalanceValue {
    value: u64,
}

#[derive(Deserialize)]
struct SignerTransferReply {
    signature: String,
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
    async fn balance(&self, address: Option<&str>) -> Result<String, ChainError> {
        let address = address.unwrap_or(&self.wallet_address);
        let result = rpc_call(
            &self.client,
            &self.rpc_url,
            "getBalance",
            serde_json::json!([address]),
        )
        .await?;

        let balance: BalanceValue = serde_json::from_value(result)
            .map_err(|e| ChainError::Response(format!("malformed getBalance result: {e}")))?;
        Ok(lamports_to_sol(balance.value))
    }

    async fn transfer(&self, to: &str, amount: &str) -> Result<String, ChainError> {
        let request = SignerTransferRequest {
            chain: ChainKind::Solana,
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
        Ok(reply.signature)
    }
}

/// Convert lamports to a decimal SOL string.
fn lamports_to_sol(lamports: u64) -> String {
    Decimal::from_i128_with_scale(lamports as i128, LAMPORT_SCALE)
        .normalize()
        .to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn converts_lamports_to_sol() {
        assert_eq!(lamports_to_sol(1_000_000_000), "1");
        assert_eq!(lamports_to_sol(1_500_000_000), "1.5");
        assert_eq!(lamports_to_sol(0), "0");
        assert_eq!(lamports_to_sol(1), "0.000000001");
    }

    #[test]
    fn balance_result_decodes_context_envelope() {
        let result = serde_json::json!({
            "context": { "slot": 1 },
            "value": 2_039_280u64
        });
        let balance: BalanceValue = serde_json::from_value(result).unwrap();
        assert_eq!(lamports_to_sol(balance.value), "0.00203928");
    }
}
