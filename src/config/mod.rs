//! Configuration for chainspeak.
//!
//! Everything is env-var driven (the binary loads `.env` via dotenvy
//! before this runs). Values are validated into typed structs here so
//! the rest of the crate never touches the environment.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::agent::intent::ChainKind;
use crate::error::ConfigError;

const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Main configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub ethereum: ChainConfig,
    pub solana: ChainConfig,
    pub ledger: LedgerConfig,
    /// Optional TOML address book loaded as the process-wide default
    /// directory.
    pub address_book_path: Option<PathBuf>,
    /// Chain assumed when a command names none.
    pub default_chain: Option<ChainKind>,
    /// Upper bound for one chain adapter call.
    pub adapter_timeout: Duration,
}

/// Classifier endpoint configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: SecretString,
    pub timeout: Duration,
}

/// One chain's endpoints. Transfers go through the signer service; this
/// process never holds key material.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub signer_url: String,
    pub wallet_address: String,
}

/// Ledger store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    Memory,
    LibSql,
}

impl LedgerBackend {
    fn parse(value: &str, key: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "libsql" => Ok(Self::LibSql),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected 'memory' or 'libsql', got '{value}'"),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub backend: LedgerBackend,
    pub path: PathBuf,
}

/// Default ledger location: `~/.chainspeak/ledger.db`.
pub fn default_ledger_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chainspeak")
        .join("ledger.db")
}

impl Config {
    /// Load and validate configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let llm = LlmConfig {
            api_url: optional_env("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            api_key: SecretString::from(require_env("GEMINI_API_KEY")?),
            timeout: timeout_ms(optional_env("LLM_TIMEOUT_MS"), "LLM_TIMEOUT_MS")?,
        };

        let ethereum = ChainConfig {
            rpc_url: require_env("ETH_RPC_URL")?,
            signer_url: require_env("ETH_SIGNER_URL")?,
            wallet_address: require_env("ETH_WALLET_ADDRESS")?,
        };

        let solana = ChainConfig {
            rpc_url: require_env("SOLANA_RPC_URL")?,
            signer_url: require_env("SOLANA_SIGNER_URL")?,
            wallet_address: require_env("SOLANA_WALLET_ADDRESS")?,
        };

        let backend = match optional_env("LEDGER_BACKEND") {
            Some(value) => LedgerBackend::parse(&value, "LEDGER_BACKEND")?,
            None if cfg!(feature = "libsql") => LedgerBackend::LibSql,
            None => LedgerBackend::Memory,
        };
        let ledger = LedgerConfig {
            backend,
            path: optional_env("LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_ledger_path),
        };

        let default_chain = optional_env("DEFAULT_CHAIN")
            .map(|value| {
                ChainKind::parse(&value.trim().to_ascii_lowercase()).ok_or_else(|| {
                    ConfigError::InvalidValue {
                        key: "DEFAULT_CHAIN".to_string(),
                        message: format!("expected 'ethereum' or 'solana', got '{value}'"),
                    }
                })
            })
            .transpose()?;

        Ok(Self {
            llm,
            ethereum,
            solana,
            ledger,
            address_book_path: optional_env("ADDRESS_BOOK_PATH").map(PathBuf::from),
            default_chain,
            adapter_timeout: timeout_ms(optional_env("ADAPTER_TIMEOUT_MS"), "ADAPTER_TIMEOUT_MS")?,
        })
    }
}

/// Read an env var, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    optional_env(key).ok_or_else(|| ConfigError::MissingEnv {
        key: key.to_string(),
    })
}

/// Parse a millisecond timeout, defaulting to 30s; zero is invalid.
fn timeout_ms(value: Option<String>, key: &str) -> Result<Duration, ConfigError> {
    let ms = match value {
        Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("must be a positive integer: {e}"),
        })?,
        None => DEFAULT_TIMEOUT_MS,
    };
    if ms == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be > 0".to_string(),
        });
    }
    Ok(Duration::from_millis(ms))
}
