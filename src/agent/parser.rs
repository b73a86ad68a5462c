//! Natural-language command -> structured [`Intent`].
//!
//! The classifier reply is an untrusted text blob. Extraction (first `{`
//! to last `}`) and structural validation are separate, deterministic
//! steps; any failure anywhere collapses to `Intent::unknown()` rather
//! than an error, so callers always get a dispatchable value.

use std::sync::Arc;

use serde::Deserialize;

use crate::agent::intent::{Action, ChainKind, Intent, QueryType, Token};
use crate::llm::Classifier;

/// Fixed classification instruction. The action/queryType vocabulary in
/// here is a behavioral contract, not prompt decoration: dispatch relies
/// on these exact labels.
const CLASSIFY_INSTRUCTION: &str = r#"You classify wallet commands. Convert the user's message into a single JSON object of this exact shape:

{
  "action": "send" | "balance" | "analytics" | "unknown",
  "chain": "ethereum" | "solana",
  "token": "ETH" | "SOL",
  "to": "<recipient name or address>",
  "amount": "<decimal string, e.g. 0.5>",
  "note": "<free-text memo>",
  "queryType": "top-recipient" | "biggest" | "summary" | "history"
}

Omit any field the message does not state. "queryType" appears only when action is "analytics".

Vocabulary:
- send, transfer, pay -> action "send"
- balance, holdings, funds -> action "balance"
- biggest, highest, largest -> action "analytics", queryType "biggest"
- top, most, frequent -> action "analytics", queryType "top-recipient"
- summary, total, spent -> action "analytics", queryType "summary"
- history, transactions -> action "analytics", queryType "history"
Anything else -> action "unknown".

Reply with the JSON object only, no explanation.

Examples:
"send 0.5 SOL to Ananya" -> {"action":"send","chain":"solana","token":"SOL","to":"Ananya","amount":"0.5"}
"what's my balance" -> {"action":"balance"}
"who do I send the most to?" -> {"action":"analytics","queryType":"top-recipient"}
"show my transaction history" -> {"action":"analytics","queryType":"history"}

USER COMMAND:
"#;

/// Build the full classification prompt for one command.
pub(crate) fn build_classify_prompt(text: &str) -> String {
    format!("{CLASSIFY_INSTRUCTION}{text}")
}

/// Converts raw command text into an [`Intent`] via the classifier.
pub struct IntentParser {
    classifier: Arc<dyn Classifier>,
}

impl IntentParser {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Parse one command. Never errors: classification failures,
    /// missing/malformed JSON, and structural mismatches all return
    /// `Intent::unknown()`.
    pub async fn parse(&self, text: &str) -> Intent {
        let prompt = build_classify_prompt(text);
        let reply = match self.classifier.generate(&prompt).await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(%error, "classifier call failed; degrading to unknown intent");
                return Intent::unknown();
            }
        };

        match decode_reply(&reply) {
            Some(intent) => intent.normalize(),
            None => {
                tracing::debug!(reply_len = reply.len(), "classifier reply had no usable JSON");
                Intent::unknown()
            }
        }
    }
}

/// Extract the candidate JSON span: first `{` through last `}`.
fn extract_json(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end >= start).then(|| &reply[start..=end])
}

/// Lenient mirror of the reply shape. Values are validated into typed
/// enums afterwards; nothing in here is trusted.
#[derive(Debug, Default, Deserialize)]
struct RawIntent {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    chain: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    amount: Option<serde_json::Value>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default, alias = "queryType")]
    query_type: Option<String>,
}

fn decode_reply(reply: &str) -> Option<Intent> {
    let span = extract_json(reply)?;
    let raw: RawIntent = serde_json::from_str(span).ok()?;
    Some(intent_from_raw(raw))
}

fn intent_from_raw(raw: RawIntent) -> Intent {
    let action = raw
        .action
        .as_deref()
        .map(|a| a.trim().to_ascii_lowercase())
        .and_then(|a| Action::parse(&a))
        .unwrap_or(Action::Unknown);

    let chain = raw
        .chain
        .as_deref()
        .map(|c| c.trim().to_ascii_lowercase())
        .and_then(|c| ChainKind::parse(&c));

    let token = raw.token.as_deref().and_then(Token::parse);

    let query_type = raw
        .query_type
        .as_deref()
        .map(|q| q.trim().to_ascii_lowercase().replace('_', "-"))
        .and_then(|q| QueryType::parse(&q));

    Intent {
        action,
        chain,
        token,
        to: non_empty(raw.to),
        amount: amount_string(raw.amount),
        note: non_empty(raw.note),
        query_type,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accept the amount as either a JSON string or a bare number; the
/// magnitude itself stays unvalidated until dispatch.
fn amount_string(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => non_empty(Some(s)),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
