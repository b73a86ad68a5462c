//! Command interpretation pipeline: intent types, parsing, recipient
//! resolution, and dispatch.

pub mod dispatcher;
pub mod intent;
pub mod parser;
pub mod resolver;

pub use dispatcher::{CommandReply, Interpreter, Rejection};
pub use intent::{Action, ChainKind, Intent, QueryType, Token};
pub use parser::IntentParser;
pub use resolver::{is_ethereum_address, is_solana_address, resolve_recipient};
