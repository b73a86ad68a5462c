//! Typed intent produced by classification and consumed by dispatch.

use serde::{Deserialize, Serialize};

/// Action requested by a user command.
///
/// Always set on a parsed intent; any classification failure degrades to
/// `Unknown`, which the dispatcher rejects before touching an adapter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Send,
    Balance,
    Analytics,
    #[default]
    Unknown,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Balance => "balance",
            Self::Analytics => "analytics",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "send" => Some(Self::Send),
            "balance" => Some(Self::Balance),
            "analytics" => Some(Self::Analytics),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Supported chains, in declared precedence order: Ethereum is the
/// default when a balance query names no chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    Ethereum,
    Solana,
}

impl ChainKind {
    pub const ALL: [ChainKind; 2] = [ChainKind::Ethereum, ChainKind::Solana];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Solana => "solana",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ethereum" => Some(Self::Ethereum),
            "solana" => Some(Self::Solana),
            _ => None,
        }
    }

    /// Native token of this chain.
    pub fn native_token(&self) -> Token {
        match self {
            Self::Ethereum => Token::Eth,
            Self::Solana => Token::Sol,
        }
    }
}

impl std::fmt::Display for ChainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token symbol mentioned in a command. Informational only; it never
/// gates execution, but it can pin the chain when none was stated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Token {
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "SOL")]
    Sol,
}

impl Token {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eth => "ETH",
            Self::Sol => "SOL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ETH" => Some(Self::Eth),
            "SOL" => Some(Self::Sol),
            _ => None,
        }
    }

    /// Chain implied by this token.
    pub fn chain(&self) -> ChainKind {
        match self {
            Self::Eth => ChainKind::Ethereum,
            Self::Sol => ChainKind::Solana,
        }
    }
}

/// Analytics sub-query name; only meaningful when `action = analytics`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum QueryType {
    TopRecipient,
    Biggest,
    Summary,
    History,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopRecipient => "top-recipient",
            Self::Biggest => "biggest",
            Self::Summary => "summary",
            Self::History => "history",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top-recipient" => Some(Self::TopRecipient),
            "biggest" => Some(Self::Biggest),
            "summary" => Some(Self::Summary),
            "history" => Some(Self::History),
            _ => None,
        }
    }
}

/// Structured representation of one user command.
///
/// Fields the classifier did not produce stay `None` so downstream
/// validation can distinguish "absent" from "empty".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Intent {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<ChainKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(
        default,
        rename = "queryType",
        skip_serializing_if = "Option::is_none"
    )]
    pub query_type: Option<QueryType>,
}

impl Intent {
    /// The rejection-only intent every failed parse collapses to.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Deterministic post-classification normalization: infer the chain
    /// from the token when absent, and backfill the token from the chain.
    pub fn normalize(mut self) -> Self {
        if self.chain.is_none()
            && let Some(token) = self.token
        {
            self.chain = Some(token.chain());
        }
        if self.token.is_none()
            && let Some(chain) = self.chain
        {
            self.token = Some(chain.native_token());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_is_the_default_action() {
        assert_eq!(Intent::unknown().action, Action::Unknown);
        assert_eq!(Action::default(), Action::Unknown);
    }

    #[test]
    fn normalize_infers_chain_from_token() {
        let intent = Intent {
            action: Action::Send,
            token: Some(Token::Sol),
            ..Intent::default()
        }
        .normalize();
        assert_eq!(intent.chain, Some(ChainKind::Solana));
    }

    #[test]
    fn normalize_backfills_token_from_chain() {
        let intent = Intent {
            action: Action::Balance,
            chain: Some(ChainKind::Ethereum),
            ..Intent::default()
        }
        .normalize();
        assert_eq!(intent.token, Some(Token::Eth));
    }

    #[test]
    fn normalize_never_overwrites_a_stated_chain() {
        let intent = Intent {
            action: Action::Send,
            chain: Some(ChainKind::Ethereum),
            token: Some(Token::Sol),
            ..Intent::default()
        }
        .normalize();
        assert_eq!(intent.chain, Some(ChainKind::Ethereum));
    }

    #[test]
    fn query_type_uses_hyphenated_wire_spelling() {
        let json = serde_json::to_string(&QueryType::TopRecipient).unwrap();
        assert_eq!(json, "\"top-recipient\"");
        assert_eq!(
            QueryType::parse("top-recipient"),
            Some(QueryType::TopRecipient)
        );
    }

    #[test]
    fn token_round_trips_uppercase() {
        assert_eq!(Token::parse("sol"), Some(Token::Sol));
        let json = serde_json::to_string(&Token::Eth).unwrap();
        assert_eq!(json, "\"ETH\"");
    }

    #[test]
    fn absent_fields_are_omitted_from_serialization() {
        let json = serde_json::to_value(Intent::unknown()).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "unknown" }));
    }

    #[test]
    fn intent_deserializes_wire_shape() {
        let intent: Intent = serde_json::from_str(
            r#"{"action":"send","chain":"solana","token":"SOL","to":"Ananya","amount":"0.5"}"#,
        )
        .unwrap();
        assert_eq!(intent.action, Action::Send);
        assert_eq!(intent.chain, Some(ChainKind::Solana));
        assert_eq!(intent.to.as_deref(), Some("Ananya"));
        assert_eq!(intent.amount.as_deref(), Some("0.5"));
        assert_eq!(intent.note, None);
    }
}
