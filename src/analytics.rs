//! Read-only analytics over the transaction ledger.
//!
//! A fixed table maps each [`QueryType`] to one aggregate operation.
//! Results are JSON values; any address-bearing result is enriched with
//! the display name the directory knows for it.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::{Value, json};

use crate::agent::intent::{ChainKind, QueryType};
use crate::directory::AddressDirectory;
use crate::error::LedgerError;
use crate::ledger::{LedgerStore, TxKind, TxLogEntry};

/// Page size for the history query.
const HISTORY_LIMIT: usize = 50;

const NO_DATA_MESSAGE: &str = "no transactions yet";

/// Routes analytics sub-queries to their aggregate operation.
#[derive(Clone)]
pub struct AnalyticsRouter {
    store: Arc<dyn LedgerStore>,
}

impl AnalyticsRouter {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Run one analytics query. Pure read; never writes a log entry.
    pub async fn run(
        &self,
        query: QueryType,
        directory: &AddressDirectory,
    ) -> Result<Value, LedgerError> {
        match query {
            QueryType::TopRecipient => self.top_recipient(directory).await,
            QueryType::Biggest => self.biggest(directory).await,
            QueryType::Summary => self.summary().await,
            QueryType::History => self.history(directory).await,
        }
    }

    /// Most frequent recipient address among transfer entries.
    async fn top_recipient(&self, directory: &AddressDirectory) -> Result<Value, LedgerError> {
        let entries = self.store.recent(None).await?;

        // counted oldest-first so ties resolve to the first recipient seen
        let mut counts: Vec<(&str, u64)> = Vec::new();
        for entry in entries.iter().rev() {
            if entry.kind != TxKind::Send {
                continue;
            }
            let Some(to) = entry.to.as_deref() else {
                continue;
            };
            match counts.iter_mut().find(|(address, _)| *address == to) {
                Some((_, count)) => *count += 1,
                None => counts.push((to, 1)),
            }
        }

        let mut top: Option<(&str, u64)> = None;
        for (address, count) in counts {
            if top.is_none_or(|(_, best)| count > best) {
                top = Some((address, count));
            }
        }

        let Some((address, count)) = top else {
            return Ok(json!({ "message": NO_DATA_MESSAGE }));
        };
        Ok(json!({
            "address": address,
            "name": enrich(directory, address),
            "count": count,
        }))
    }

    /// Entry with the highest amount.
    async fn biggest(&self, directory: &AddressDirectory) -> Result<Value, LedgerError> {
        let entries = self.store.recent(None).await?;

        let mut biggest: Option<&TxLogEntry> = None;
        for entry in entries.iter().rev() {
            if biggest.is_none_or(|best| entry.amount > best.amount) {
                biggest = Some(entry);
            }
        }

        let Some(entry) = biggest else {
            return Ok(json!({ "message": NO_DATA_MESSAGE }));
        };
        Ok(json!({
            "tx_hash": entry.tx_hash,
            "chain": entry.chain,
            "address": entry.to,
            "name": entry.to.as_deref().map(|to| enrich(directory, to)),
            "amount": entry.amount,
        }))
    }

    /// Per-chain totals: amount sum and entry count.
    async fn summary(&self) -> Result<Value, LedgerError> {
        let entries = self.store.recent(None).await?;

        let rows: Vec<Value> = ChainKind::ALL
            .iter()
            .filter_map(|chain| {
                let mut total_amount = Decimal::ZERO;
                let mut total_tx = 0u64;
                for entry in entries.iter().filter(|e| e.chain == *chain) {
                    total_amount += entry.amount;
                    total_tx += 1;
                }
                (total_tx > 0).then(|| {
                    json!({
                        "chain": chain,
                        "total_amount": total_amount.normalize(),
                        "total_tx": total_tx,
                    })
                })
            })
            .collect();

        Ok(Value::Array(rows))
    }

    /// Most recent entries, newest first, display-name enriched.
    async fn history(&self, directory: &AddressDirectory) -> Result<Value, LedgerError> {
        let entries = self.store.recent(Some(HISTORY_LIMIT)).await?;

        let rows: Vec<Value> = entries
            .iter()
            .map(|entry| {
                json!({
                    "kind": entry.kind,
                    "chain": entry.chain,
                    "amount": entry.amount.normalize(),
                    "tx_hash": entry.tx_hash,
                    "address": entry.to,
                    "name": entry.to.as_deref().map(|to| enrich(directory, to)),
                    "status": entry.status,
                    "created_at": entry.created_at,
                })
            })
            .collect();

        Ok(Value::Array(rows))
    }
}

/// Display name for an address, falling back to the raw address.
fn enrich<'a>(directory: &'a AddressDirectory, address: &'a str) -> &'a str {
    directory.display_name(address).unwrap_or(address)
}
