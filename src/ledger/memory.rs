//! In-memory ledger store, used in tests and as the no-setup default.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::LedgerError;
use crate::ledger::{LedgerStore, TxLogEntry};

/// Append-only in-memory store; appends serialize through a write lock.
#[derive(Default)]
pub struct MemoryLedger {
    entries: RwLock<Vec<TxLogEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn append(&self, entry: &TxLogEntry) -> Result<(), LedgerError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn recent(&self, limit: Option<usize>) -> Result<Vec<TxLogEntry>, LedgerError> {
        let entries = self.entries.read().await;
        let iter = entries.iter().rev().cloned();
        Ok(match limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::agent::intent::ChainKind;
    use crate::ledger::TxStatus;

    #[tokio::test]
    async fn recent_returns_newest_first() {
        let store = MemoryLedger::new();
        let first = TxLogEntry::balance(ChainKind::Ethereum, TxStatus::Success);
        let second = TxLogEntry::balance(ChainKind::Solana, TxStatus::Error);
        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        let entries = store.recent(None).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second.id);
        assert_eq!(entries[1].id, first.id);
    }

    #[tokio::test]
    async fn recent_honors_the_limit() {
        let store = MemoryLedger::new();
        for _ in 0..5 {
            store
                .append(&TxLogEntry::balance(ChainKind::Ethereum, TxStatus::Success))
                .await
                .unwrap();
        }
        assert_eq!(store.recent(Some(3)).await.unwrap().len(), 3);
        assert_eq!(store.recent(None).await.unwrap().len(), 5);
    }
}
