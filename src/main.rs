//! chainspeak CLI: a thin shell over the interpretation pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use chainspeak::agent::Interpreter;
use chainspeak::chains::{ChainRegistry, EthereumAdapter, SolanaAdapter};
use chainspeak::config::{Config, LedgerBackend};
use chainspeak::directory::AddressDirectory;
use chainspeak::ledger::{LedgerStore, MemoryLedger};
use chainspeak::llm::GeminiClassifier;

#[cfg(feature = "libsql")]
use chainspeak::ledger::LibSqlLedger;

#[derive(Parser)]
#[command(
    name = "chainspeak",
    version,
    about = "Natural-language wallet commands for Ethereum and Solana"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interpret one command and print the reply as JSON.
    Run {
        /// The command text, e.g. `chainspeak run send 0.5 SOL to Ananya`
        text: Vec<String>,
    },
    /// Interactive wallet shell.
    Repl,
    /// Print recent ledger entries.
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chainspeak=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let store = build_store(&config).await?;

    match cli.command.unwrap_or(Command::Repl) {
        Command::Run { text } => {
            let text = text.join(" ");
            anyhow::ensure!(!text.trim().is_empty(), "no command text given");
            let interpreter = build_interpreter(&config, store)?;
            interpret_and_print(&interpreter, &text).await;
        }
        Command::Repl => {
            let interpreter = build_interpreter(&config, store)?;
            repl(&interpreter).await?;
        }
        Command::History { limit } => {
            let entries = store.recent(Some(limit)).await?;
            for entry in entries {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }
    }

    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn LedgerStore>> {
    match config.ledger.backend {
        LedgerBackend::Memory => Ok(Arc::new(MemoryLedger::new())),
        #[cfg(feature = "libsql")]
        LedgerBackend::LibSql => Ok(Arc::new(
            LibSqlLedger::new_local(&config.ledger.path)
                .await
                .with_context(|| format!("opening ledger at {}", config.ledger.path.display()))?,
        )),
        #[cfg(not(feature = "libsql"))]
        LedgerBackend::LibSql => {
            anyhow::bail!("this build has no libsql support; set LEDGER_BACKEND=memory")
        }
    }
}

fn build_interpreter(config: &Config, store: Arc<dyn LedgerStore>) -> anyhow::Result<Interpreter> {
    let directory = match &config.address_book_path {
        Some(path) => AddressDirectory::load(path)?,
        None => AddressDirectory::default(),
    };

    let classifier = Arc::new(GeminiClassifier::new(&config.llm));
    let chains = ChainRegistry::new(
        Arc::new(EthereumAdapter::new(&config.ethereum, config.adapter_timeout)),
        Arc::new(SolanaAdapter::new(&config.solana, config.adapter_timeout)),
    );

    Ok(Interpreter::new(classifier, chains, store, Arc::new(directory))
        .with_default_chain(config.default_chain)
        .with_adapter_timeout(config.adapter_timeout))
}

async fn interpret_and_print(interpreter: &Interpreter, text: &str) {
    match interpreter.interpret(text, None).await {
        Ok(reply) => match serde_json::to_string_pretty(&reply) {
            Ok(json) => println!("{json}"),
            Err(error) => eprintln!("failed to render reply: {error}"),
        },
        Err(error) => {
            let body = serde_json::json!({ "kind": "error", "message": error.to_string() });
            println!("{body:#}");
        }
    }
}

fn history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chainspeak")
        .join("history.txt")
}

async fn repl(interpreter: &Interpreter) -> anyhow::Result<()> {
    let mut editor = rustyline::DefaultEditor::new()?;
    let history = history_path();
    if let Some(parent) = history.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = editor.load_history(&history);

    println!("chainspeak — ask about your wallet (exit to quit)");
    loop {
        match editor.readline("wallet> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                let _ = editor.add_history_entry(line);
                interpret_and_print(interpreter, line).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(error) => return Err(error.into()),
        }
    }

    let _ = editor.save_history(&history);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_collects_trailing_words_as_command_text() {
        let cli = Cli::try_parse_from(["chainspeak", "run", "send", "0.5", "SOL", "to", "Ananya"])
            .unwrap();
        match cli.command {
            Some(Command::Run { text }) => {
                assert_eq!(text.join(" "), "send 0.5 SOL to Ananya");
            }
            _ => panic!("expected the run subcommand"),
        }
    }

    #[test]
    fn history_limit_defaults_to_twenty() {
        let cli = Cli::try_parse_from(["chainspeak", "history"]).unwrap();
        match cli.command {
            Some(Command::History { limit }) => assert_eq!(limit, 20),
            _ => panic!("expected the history subcommand"),
        }

        let cli = Cli::try_parse_from(["chainspeak", "history", "--limit", "5"]).unwrap();
        assert!(matches!(cli.command, Some(Command::History { limit: 5 })));
    }

    #[test]
    fn bare_invocation_falls_back_to_the_repl() {
        let cli = Cli::try_parse_from(["chainspeak"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn history_file_lands_under_the_data_directory() {
        assert!(history_path().ends_with(".chainspeak/history.txt"));
    }
}
