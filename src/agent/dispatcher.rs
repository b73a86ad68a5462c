//! Intent validation and dispatch.
//!
//! A small state machine over `Intent.action`. Every adapter invocation
//! (balance or transfer) produces exactly one log entry, success or
//! error, before the reply is returned; rejection paths never log and
//! never reach an adapter. Nothing in here retries.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::agent::intent::{Action, ChainKind, Intent};
use crate::agent::parser::IntentParser;
use crate::agent::resolver::resolve_recipient;
use crate::analytics::AnalyticsRouter;
use crate::chains::{ChainAdapter, ChainRegistry};
use crate::directory::AddressDirectory;
use crate::error::{ChainError, Error};
use crate::ledger::{LedgerStore, OutcomeRecorder, TxLogEntry, TxStatus};
use crate::llm::Classifier;

/// Adapter calls are bounded by this unless overridden.
const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a command was rejected before any adapter call or log write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("unsupported or unknown intent")]
    UnknownIntent,

    #[error("missing chain, amount or recipient")]
    IncompleteTransfer,

    #[error("unknown analytics query")]
    UnknownAnalyticsQuery,
}

impl Serialize for Rejection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Reply for one interpreted command.
///
/// Rejections are ordinary replies (the command was understood to be
/// invalid); adapter failures surface as `Err(Error::Chain(..))` after
/// their error log entry is written.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandReply {
    Balance {
        intent: Intent,
        chain: ChainKind,
        balance: String,
    },
    Transfer {
        intent: Intent,
        chain: ChainKind,
        tx_hash: String,
    },
    Analytics {
        intent: Intent,
        result: serde_json::Value,
    },
    Rejected {
        intent: Intent,
        reason: Rejection,
    },
}

/// The command interpretation and dispatch pipeline.
///
/// One `interpret` call is one sequential pass: classify, resolve,
/// validate, dispatch, record.
pub struct Interpreter {
    parser: IntentParser,
    chains: ChainRegistry,
    recorder: OutcomeRecorder,
    analytics: AnalyticsRouter,
    directory: Arc<AddressDirectory>,
    default_chain: Option<ChainKind>,
    adapter_timeout: Duration,
}

impl Interpreter {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        chains: ChainRegistry,
        store: Arc<dyn LedgerStore>,
        directory: Arc<AddressDirectory>,
    ) -> Self {
        Self {
            parser: IntentParser::new(classifier),
            chains,
            recorder: OutcomeRecorder::new(store.clone()),
            analytics: AnalyticsRouter::new(store),
            directory,
            default_chain: None,
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
        }
    }

    /// Chain assumed when a command names none.
    pub fn with_default_chain(mut self, chain: Option<ChainKind>) -> Self {
        self.default_chain = chain;
        self
    }

    /// Upper bound for a single adapter call; a timeout is an adapter
    /// failure like any other.
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    /// Interpret one command: text in, reply (or adapter error) out.
    pub async fn interpret(
        &self,
        text: &str,
        directory_override: Option<&AddressDirectory>,
    ) -> Result<CommandReply, Error> {
        let mut intent = self.parser.parse(text).await;
        if intent.chain.is_none() {
            intent.chain = self.default_chain;
            intent = intent.normalize();
        }

        let directory = directory_override.unwrap_or_else(|| self.directory.as_ref());
        let resolved_to = resolve_recipient(intent.to.as_deref(), directory);

        tracing::debug!(
            action = intent.action.as_str(),
            chain = ?intent.chain,
            resolved = ?resolved_to,
            "dispatching intent"
        );

        match intent.action {
            Action::Unknown => Ok(CommandReply::Rejected {
                intent,
                reason: Rejection::UnknownIntent,
            }),
            Action::Analytics => self.dispatch_analytics(intent, directory).await,
            Action::Balance => self.dispatch_balance(intent).await,
            Action::Send => self.dispatch_send(intent, resolved_to).await,
        }
    }

    async fn dispatch_analytics(
        &self,
        intent: Intent,
        directory: &AddressDirectory,
    ) -> Result<CommandReply, Error> {
        let Some(query) = intent.query_type else {
            return Ok(CommandReply::Rejected {
                intent,
                reason: Rejection::UnknownAnalyticsQuery,
            });
        };

        let result = self.analytics.run(query, directory).await?;
        Ok(CommandReply::Analytics { intent, result })
    }

    async fn dispatch_balance(&self, intent: Intent) -> Result<CommandReply, Error> {
        let chain = intent.chain.unwrap_or(ChainKind::Ethereum);
        let adapter = self.chains.adapter(chain);

        match self.bounded(adapter.balance(None)).await {
            Ok(balance) => {
                self.recorder
                    .record(TxLogEntry::balance(chain, TxStatus::Success))
                    .await;
                Ok(CommandReply::Balance {
                    intent,
                    chain,
                    balance,
                })
            }
            Err(error) => {
                tracing::warn!(%error, %chain, "balance query failed");
                self.recorder
                    .record(TxLogEntry::balance(chain, TxStatus::Error))
                    .await;
                Err(error.into())
            }
        }
    }

    async fn dispatch_send(
        &self,
        intent: Intent,
        resolved_to: Option<String>,
    ) -> Result<CommandReply, Error> {
        let (Some(chain), Some(raw_amount), Some(to)) =
            (intent.chain, intent.amount.clone(), resolved_to)
        else {
            return Ok(CommandReply::Rejected {
                intent,
                reason: Rejection::IncompleteTransfer,
            });
        };
        // an unparsable magnitude is as ambiguous as a missing one
        let Ok(amount) = Decimal::from_str(&raw_amount) else {
            return Ok(CommandReply::Rejected {
                intent,
                reason: Rejection::IncompleteTransfer,
            });
        };

        let adapter = self.chains.adapter(chain);
        match self.bounded(adapter.transfer(&to, &raw_amount)).await {
            Ok(tx_hash) => {
                self.recorder
                    .record(TxLogEntry::send(
                        chain,
                        to,
                        amount,
                        Some(tx_hash.clone()),
                        TxStatus::Success,
                    ))
                    .await;
                tracing::info!(%chain, %tx_hash, "transfer submitted");
                Ok(CommandReply::Transfer {
                    intent,
                    chain,
                    tx_hash,
                })
            }
            Err(error) => {
                tracing::warn!(%error, %chain, "transfer failed");
                self.recorder
                    .record(TxLogEntry::send(chain, to, amount, None, TxStatus::Error))
                    .await;
                Err(error.into())
            }
        }
    }

    async fn bounded<F>(&self, call: F) -> Result<String, ChainError>
    where
        F: Future<Output = Result<String, ChainError>>,
    {
        match tokio::time::timeout(self.adapter_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout(self.adapter_timeout)),
        }
    }
}
