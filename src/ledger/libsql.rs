//! libSQL backend for the ledger store.
//!
//! Embedded SQLite-compatible file database (or `:memory:` for tests).
//! A connection is opened per operation; the database serializes
//! concurrent appends.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::{Connection, Database};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::agent::intent::ChainKind;
use crate::error::LedgerError;
use crate::ledger::{LedgerStore, TxKind, TxLogEntry, TxStatus};

/// libSQL-backed transaction ledger.
pub struct LibSqlLedger {
    db: Arc<Database>,
}

impl LibSqlLedger {
    /// Open (or create) a local file-backed ledger.
    pub async fn new_local(path: &Path) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LedgerError::Open(format!("failed to create ledger directory: {e}")))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| LedgerError::Open(format!("failed to open libSQL database: {e}")))?;

        let ledger = Self { db: Arc::new(db) };
        ledger.ensure_schema().await?;
        Ok(ledger)
    }

    /// Open an in-memory ledger (for testing).
    pub async fn new_memory() -> Result<Self, LedgerError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| LedgerError::Open(format!("failed to create in-memory database: {e}")))?;

        let ledger = Self { db: Arc::new(db) };
        ledger.ensure_schema().await?;
        Ok(ledger)
    }

    async fn connect(&self) -> Result<Connection, LedgerError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| LedgerError::Open(format!("failed to connect: {e}")))?;
        conn.query("PRAGMA busy_timeout = 5000", ())
            .await
            .map_err(|e| LedgerError::Open(format!("failed to set busy_timeout: {e}")))?;
        Ok(conn)
    }

    async fn ensure_schema(&self) -> Result<(), LedgerError> {
        let conn = self.connect().await?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS tx_log (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                chain TEXT NOT NULL,
                recipient TEXT,
                amount TEXT NOT NULL,
                tx_hash TEXT,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            (),
        )
        .await
        .map_err(|e| LedgerError::Open(format!("failed to create tx_log table: {e}")))?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tx_log_created ON tx_log(created_at)",
            (),
        )
        .await
        .map_err(|e| LedgerError::Open(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for LibSqlLedger {
    async fn append(&self, entry: &TxLogEntry) -> Result<(), LedgerError> {
        let conn = self.connect().await?;
        conn.execute(
            r#"
            INSERT INTO tx_log (id, kind, chain, recipient, amount, tx_hash, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            libsql::params![
                entry.id.to_string(),
                entry.kind.as_str(),
                entry.chain.as_str(),
                opt_text(entry.to.as_deref()),
                entry.amount.normalize().to_string(),
                opt_text(entry.tx_hash.as_deref()),
                entry.status.as_str(),
                fmt_ts(&entry.created_at),
            ],
        )
        .await
        .map_err(|e| LedgerError::Query(e.to_string()))?;
        Ok(())
    }

    async fn recent(&self, limit: Option<usize>) -> Result<Vec<TxLogEntry>, LedgerError> {
        let conn = self.connect().await?;
        // rowid breaks ties between entries written in the same millisecond
        let mut rows = match limit {
            Some(limit) => {
                conn.query(
                    r#"
                    SELECT id, kind, chain, recipient, amount, tx_hash, status, created_at
                    FROM tx_log
                    ORDER BY created_at DESC, rowid DESC
                    LIMIT ?1
                    "#,
                    libsql::params![limit as i64],
                )
                .await
            }
            None => {
                conn.query(
                    r#"
                    SELECT id, kind, chain, recipient, amount, tx_hash, status, created_at
                    FROM tx_log
                    ORDER BY created_at DESC, rowid DESC
                    "#,
                    (),
                )
                .await
            }
        }
        .map_err(|e| LedgerError::Query(e.to_string()))?;

        let mut entries = Vec::new();
        loop {
            match rows.next().await {
                Ok(Some(row)) => entries.push(row_to_entry(&row)?),
                Ok(None) => break,
                Err(e) => return Err(LedgerError::Query(e.to_string())),
            }
        }
        Ok(entries)
    }
}

fn row_to_entry(row: &libsql::Row) -> Result<TxLogEntry, LedgerError> {
    let id = Uuid::parse_str(&get_text(row, 0)).map_err(|e| LedgerError::Query(e.to_string()))?;
    let kind = TxKind::parse(&get_text(row, 1))
        .ok_or_else(|| LedgerError::Query(format!("unknown tx kind at {id}")))?;
    let chain = ChainKind::parse(&get_text(row, 2))
        .ok_or_else(|| LedgerError::Query(format!("unknown chain at {id}")))?;
    let to = get_opt_text(row, 3);
    let amount = Decimal::from_str(&get_text(row, 4))
        .map_err(|e| LedgerError::Query(format!("bad amount at {id}: {e}")))?;
    let tx_hash = get_opt_text(row, 5);
    let status = TxStatus::parse(&get_text(row, 6))
        .ok_or_else(|| LedgerError::Query(format!("unknown status at {id}")))?;
    let created_at = parse_timestamp(&get_text(row, 7))
        .map_err(|e| LedgerError::Query(format!("bad timestamp at {id}: {e}")))?;

    Ok(TxLogEntry {
        id,
        kind,
        chain,
        to,
        amount,
        tx_hash,
        status,
        created_at,
    })
}

/// Extract a text column, returning empty string for NULL.
fn get_text(row: &libsql::Row, idx: i32) -> String {
    row.get::<String>(idx).unwrap_or_default()
}

/// Extract an optional text column (None for SQL NULL).
fn get_opt_text(row: &libsql::Row, idx: i32) -> Option<String> {
    row.get::<String>(idx).ok()
}

/// Convert an `Option<&str>` to a `libsql::Value`, preserving NULL.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// RFC 3339 with millisecond precision; the canonical write format.
fn fmt_ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(ndt.and_utc());
    }
    Err(format!("unparseable timestamp: {s:?}"))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[tokio::test]
    async fn append_and_read_back_round_trips() {
        let ledger = LibSqlLedger::new_memory().await.unwrap();
        let entry = TxLogEntry::send(
            ChainKind::Solana,
            "Addr1",
            dec!(0.5),
            Some("sig-1".to_string()),
            TxStatus::Success,
        );
        ledger.append(&entry).await.unwrap();

        let entries = ledger.recent(None).await.unwrap();
        assert_eq!(entries.len(), 1);
        let read = &entries[0];
        assert_eq!(read.id, entry.id);
        assert_eq!(read.kind, entry.kind);
        assert_eq!(read.chain, entry.chain);
        assert_eq!(read.to, entry.to);
        assert_eq!(read.amount, entry.amount);
        assert_eq!(read.tx_hash, entry.tx_hash);
        assert_eq!(read.status, entry.status);
        // timestamps are stored at millisecond precision
        assert_eq!(read.created_at.timestamp_millis(), entry.created_at.timestamp_millis());
    }

    #[tokio::test]
    async fn null_columns_survive_the_round_trip() {
        let ledger = LibSqlLedger::new_memory().await.unwrap();
        let entry = TxLogEntry::balance(ChainKind::Ethereum, TxStatus::Error);
        ledger.append(&entry).await.unwrap();

        let entries = ledger.recent(None).await.unwrap();
        assert_eq!(entries[0].to, None);
        assert_eq!(entries[0].tx_hash, None);
    }

    #[tokio::test]
    async fn recent_orders_newest_first_and_limits() {
        let ledger = LibSqlLedger::new_memory().await.unwrap();
        let mut ids = Vec::new();
        for _ in 0..4 {
            let entry = TxLogEntry::balance(ChainKind::Ethereum, TxStatus::Success);
            ids.push(entry.id);
            ledger.append(&entry).await.unwrap();
        }

        let entries = ledger.recent(Some(2)).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, ids[3]);
        assert_eq!(entries[1].id, ids[2]);
    }

    #[test]
    fn timestamp_parser_accepts_both_formats() {
        assert!(parse_timestamp("2024-01-15T10:30:00.123Z").is_ok());
        assert!(parse_timestamp("2024-01-15 10:30:00.123").is_ok());
        assert!(parse_timestamp("not a time").is_err());
    }
}
