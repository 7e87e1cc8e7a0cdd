//! buddy - conversational shopping assistant CLI

mod config;

use clap::Parser;
use std::sync::Arc;

use buddy_ai::{ChatModel, DatabricksChatModel, OllamaChatModel};
use buddy_graph::{AssistantConfig, ShoppingAssistant};
use buddy_retrieval::{JsonlCatalog, VectorSearchClient};

/// buddy - conversational shopping assistant
#[derive(Parser, Debug)]
#[command(name = "buddy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chat provider (ollama, databricks)
    #[arg(short, long)]
    provider: Option<String>,

    /// Model name (ollama) or serving endpoint name (databricks)
    #[arg(short, long)]
    model: Option<String>,

    /// Path to the product catalog JSONL file
    #[arg(long)]
    catalog: Option<String>,

    /// Vector search index to query
    #[arg(long)]
    index: Option<String>,

    /// Run in non-interactive mode with a single message
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("buddy=debug")
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Load config file
    let cfg = config::Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let provider = args
        .provider
        .or(cfg.provider.clone())
        .unwrap_or_else(|| "ollama".to_string());

    let model_name = args
        .model
        .or(cfg.model.clone())
        .unwrap_or_else(|| "llama3.1".to_string());

    let index = args
        .index
        .or(cfg.index.clone())
        .unwrap_or_else(|| VectorSearchClient::DEFAULT_INDEX.to_string());

    let catalog_path = args
        .catalog
        .or(cfg.catalog.clone())
        .unwrap_or_else(|| "products.jsonl".to_string());

    // Product search always runs against the workspace index, whichever
    // chat provider is selected
    let (host, token) = match (cfg.databricks_host(), cfg.databricks_token()) {
        (Some(host), Some(token)) => (host, token),
        _ => {
            eprintln!("Error: No Databricks credentials found");
            eprintln!();
            eprintln!("Set them with: export DATABRICKS_HOST=... DATABRICKS_TOKEN=...");
            eprintln!("Or add them to the config file: buddy --init-config");
            std::process::exit(1);
        }
    };

    let model: Arc<dyn ChatModel> = match provider.as_str() {
        "databricks" => Arc::new(
            DatabricksChatModel::new(&host, &token, &model_name).with_temperature(0.0),
        ),
        "ollama" => {
            let model = match cfg.base_url.clone() {
                Some(url) => OllamaChatModel::with_base_url(url, &model_name),
                None => OllamaChatModel::new(&model_name),
            };
            Arc::new(model.with_temperature(0.0))
        }
        other => {
            eprintln!("Error: Unknown provider: {}", other);
            eprintln!("Supported providers: ollama, databricks");
            std::process::exit(1);
        }
    };

    let search = Arc::new(VectorSearchClient::new(&host, &token, &index));

    let catalog = match JsonlCatalog::load(&catalog_path) {
        Ok(catalog) => {
            tracing::debug!(products = catalog.len(), "catalog loaded");
            Arc::new(catalog)
        }
        Err(e) => {
            eprintln!("Error loading catalog {}: {}", catalog_path, e);
            std::process::exit(1);
        }
    };

    let mut assistant_config = AssistantConfig::default();
    if let Some(top_k) = cfg.top_k {
        assistant_config.top_k = top_k;
    }

    let assistant = ShoppingAssistant::new(model, search, catalog, assistant_config)?;

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(&assistant, &command).await;
    }

    run_repl(&assistant).await
}

async fn run_command(assistant: &ShoppingAssistant, command: &str) -> anyhow::Result<()> {
    println!("buddy> {}", command);
    println!();

    // First turn opens the thread with the greeting
    let thread = "1";
    for text in assistant.converse(thread, "").await? {
        println!("Shopping Buddy: {}", text);
    }
    for text in assistant.converse(thread, command).await? {
        println!("Shopping Buddy: {}", text);
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
enum ReplCommand {
    Quit,
    Clear,
}

/// Recognize quit/clear commands regardless of case
fn repl_command(input: &str) -> Option<ReplCommand> {
    match input.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Some(ReplCommand::Quit),
        "clear" => Some(ReplCommand::Clear),
        _ => None,
    }
}

async fn run_repl(assistant: &ShoppingAssistant) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let mut thread: u64 = 1;

    println!("Shopping Buddy (thread {})", thread);
    println!("Type quit, exit or q to leave; clear starts a new thread.");
    println!();

    for text in assistant.converse(&thread.to_string(), "").await? {
        println!("Shopping Buddy: {}", text);
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match repl_command(input) {
            Some(ReplCommand::Quit) => {
                println!("Shopping Buddy: Goodbye!");
                break;
            }
            Some(ReplCommand::Clear) => {
                thread += 1;
                println!("Memory cleared. Starting a new thread.");
                for text in assistant.converse(&thread.to_string(), "").await? {
                    println!("Shopping Buddy: {}", text);
                }
                continue;
            }
            None => {}
        }

        match assistant.converse(&thread.to_string(), input).await {
            Ok(replies) => {
                for text in replies {
                    println!("Shopping Buddy: {}", text);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repl_commands_match_case_insensitively() {
        assert_eq!(repl_command("quit"), Some(ReplCommand::Quit));
        assert_eq!(repl_command("EXIT"), Some(ReplCommand::Quit));
        assert_eq!(repl_command("Q"), Some(ReplCommand::Quit));
        assert_eq!(repl_command("Clear"), Some(ReplCommand::Clear));
        assert_eq!(repl_command("CLEAR"), Some(ReplCommand::Clear));
        assert_eq!(repl_command("a quiet laptop"), None);
    }
}
