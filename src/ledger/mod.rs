//! Durable transaction log: entry types, store trait, outcome recorder.
//!
//! Every dispatched balance/transfer attempt becomes exactly one
//! [`TxLogEntry`], success or error. Entries are append-only; the
//! [`OutcomeRecorder`] is the sole writer, analytics only reads.

mod memory;

#[cfg(feature = "libsql")]
mod libsql;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::intent::ChainKind;
use crate::error::LedgerError;

pub use memory::MemoryLedger;

#[cfg(feature = "libsql")]
pub use libsql::LibSqlLedger;

/// Which pipeline path produced an entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Send,
    Balance,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Balance => "balance",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "send" => Some(Self::Send),
            "balance" => Some(Self::Balance),
            _ => None,
        }
    }
}

/// Terminal status of one dispatched attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Error,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Immutable record of one dispatched balance/transfer attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TxLogEntry {
    pub id: Uuid,
    pub kind: TxKind,
    pub chain: ChainKind,
    /// Resolved recipient address; `None` for self-directed balance queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub status: TxStatus,
    pub created_at: DateTime<Utc>,
}

impl TxLogEntry {
    /// Entry for a balance query: zero-amount, self-directed.
    pub fn balance(chain: ChainKind, status: TxStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: TxKind::Balance,
            chain,
            to: None,
            amount: Decimal::ZERO,
            tx_hash: None,
            status,
            created_at: Utc::now(),
        }
    }

    /// Entry for a transfer attempt. `tx_hash` is present only on success.
    pub fn send(
        chain: ChainKind,
        to: impl Into<String>,
        amount: Decimal,
        tx_hash: Option<String>,
        status: TxStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: TxKind::Send,
            chain,
            to: Some(to.into()),
            amount,
            tx_hash,
            status,
            created_at: Utc::now(),
        }
    }
}

/// Append-only store for [`TxLogEntry`] values.
///
/// `recent` returns entries newest-first; implementations must serialize
/// concurrent appends, but the pipeline never requires read-your-writes
/// across requests.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn append(&self, entry: &TxLogEntry) -> Result<(), LedgerError>;

    async fn recent(&self, limit: Option<usize>) -> Result<Vec<TxLogEntry>, LedgerError>;
}

/// Sole writer of log entries.
///
/// A persistence failure must not turn a successful on-chain transfer
/// into a user-visible error (the funds already moved), so append errors
/// are reported to the operational log and swallowed.
#[derive(Clone)]
pub struct OutcomeRecorder {
    store: Arc<dyn LedgerStore>,
}

impl OutcomeRecorder {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, entry: TxLogEntry) {
        if let Err(error) = self.store.append(&entry).await {
            tracing::error!(
                %error,
                kind = entry.kind.as_str(),
                chain = %entry.chain,
                status = entry.status.as_str(),
                "failed to persist transaction log entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    struct FailingStore;

    #[async_trait]
    impl LedgerStore for FailingStore {
        async fn append(&self, _entry: &TxLogEntry) -> Result<(), LedgerError> {
            Err(LedgerError::Query("disk full".to_string()))
        }

        async fn recent(&self, _limit: Option<usize>) -> Result<Vec<TxLogEntry>, LedgerError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn balance_entries_are_zero_amount_and_self_directed() {
        let entry = TxLogEntry::balance(ChainKind::Ethereum, TxStatus::Success);
        assert_eq!(entry.kind, TxKind::Balance);
        assert_eq!(entry.amount, Decimal::ZERO);
        assert_eq!(entry.to, None);
        assert_eq!(entry.tx_hash, None);
    }

    #[test]
    fn send_entries_carry_recipient_and_amount() {
        let entry = TxLogEntry::send(
            ChainKind::Solana,
            "Addr1",
            dec!(0.5),
            Some("sig".to_string()),
            TxStatus::Success,
        );
        assert_eq!(entry.to.as_deref(), Some("Addr1"));
        assert_eq!(entry.amount, dec!(0.5));
        assert_eq!(entry.tx_hash.as_deref(), Some("sig"));
    }

    #[tokio::test]
    async fn recorder_swallows_persistence_failures() {
        let recorder = OutcomeRecorder::new(Arc::new(FailingStore));
        // Must not panic or propagate.
        recorder
            .record(TxLogEntry::balance(ChainKind::Ethereum, TxStatus::Success))
            .await;
    }

    #[test]
    fn status_labels_round_trip() {
        assert_eq!(TxStatus::parse("success"), Some(TxStatus::Success));
        assert_eq!(TxStatus::parse("error"), Some(TxStatus::Error));
        assert_eq!(TxStatus::parse("pending"), None);
        assert_eq!(TxKind::parse("balance"), Some(TxKind::Balance));
    }
}
