//! Error types for chainspeak.

use std::time::Duration;

/// Top-level error type for the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Classifier error: {0}")]
    Llm(#[from] LlmError),

    #[error("Chain adapter error: {0}")]
    Chain(#[from] ChainError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Configuration loading/validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {key}")]
    MissingEnv { key: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read address book {path}: {message}")]
    AddressBook { path: String, message: String },
}

/// Errors from the natural-language classification service.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Empty reply from classifier")]
    EmptyReply,
}

/// Errors from a chain adapter (balance query or transfer).
///
/// The dispatcher treats every variant uniformly: one error log entry,
/// then the message is surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("Malformed RPC response: {0}")]
    Response(String),

    #[error("Signer service error: {0}")]
    Signer(String),

    #[error("Chain call timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from the transaction ledger store.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Failed to open ledger store: {0}")]
    Open(String),

    #[error("Ledger query failed: {0}")]
    Query(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_error_messages_carry_adapter_detail() {
        let err = ChainError::Rpc("connection refused".to_string());
        assert_eq!(err.to_string(), "RPC request failed: connection refused");

        let err = ChainError::Timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn config_error_names_the_key() {
        let err = ConfigError::MissingEnv {
            key: "GEMINI_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
