//! chainspeak: natural-language wallet command runtime.
//!
//! Turns free-text commands ("send 0.5 SOL to Ananya", "who do I send
//! the most to?") into validated, chain-specific wallet actions or
//! analytics lookups. The pipeline classifies text into an [`Intent`],
//! resolves the recipient through an address directory, validates the
//! intent per action, dispatches to a chain adapter or the analytics
//! router, and records every dispatched attempt exactly once.
//!
//! External collaborators are behind narrow traits: [`llm::Classifier`]
//! for classification, [`chains::ChainAdapter`] per chain, and
//! [`ledger::LedgerStore`] for the durable transaction log.
//!
//! [`Intent`]: agent::Intent

pub mod agent;
pub mod analytics;
pub mod chains;
pub mod config;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod llm;

pub use agent::{CommandReply, Interpreter};
pub use error::Error;
