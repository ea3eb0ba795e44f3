//! llmchat - chat with a tool-calling model from the terminal

mod tools;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use llmchat_core::config::ConfigLevel;
use llmchat_core::{
    create_model_client, CancellationToken, ChainSecretStore, ChatSettings, ConfigProvider,
    ConversationOrchestrator, EnvSecretStore, FileConfigProvider, InProcessEndpoint, McpEndpoint,
    MemoryHistoryStore, MemorySecretStore, MessageRole, SecretStore, SharedLogger, ThreadChat, ToolEndpoint,
    TracingLogger,
};

#[derive(Parser)]
#[command(name = "llmchat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat with a language model that can call tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Provider (openai, anthropic, ollama, openrouter, mistral, mock, ...)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Model id
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// API key for the selected provider (overrides the environment)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Path to a YAML config file (defaults to ~/.config/llmchat/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum tool-requesting rounds per turn
    #[arg(long, global = true)]
    max_rounds: Option<u32>,

    /// Turn timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Use a remote MCP server instead of the built-in demo tools
    #[arg(long, global = true)]
    mcp_url: Option<String>,

    /// Verbose output (show tool traffic and debug logs)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single message and print the reply
    Chat {
        /// The message
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Interactive session backed by an in-memory thread
    Repl {
        /// Thread title
        #[arg(long)]
        title: Option<String>,
    },

    /// List the tools the endpoint exposes
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose { "info,llmchat_core=debug" } else { "warn" })
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(&cli).await?;
    let logger: SharedLogger = Arc::new(TracingLogger::new());
    let secrets = secret_source(&settings.provider, cli.api_key.as_deref());
    let orchestrator = build_orchestrator(&settings, &secrets, cli.mcp_url.as_deref(), Arc::clone(&logger));

    match cli.command {
        Commands::Chat { message } => {
            run_chat(&orchestrator, &settings, &message.join(" "), cli.verbose).await
        }
        Commands::Repl { title } => run_repl(orchestrator, &settings, title, logger).await,
        Commands::Tools => run_tools(&orchestrator, &settings).await,
    }
}

async fn load_settings(cli: &Cli) -> Result<ChatSettings> {
    let provider = match &cli.config {
        Some(path) => FileConfigProvider::new(path, ConfigLevel::Workspace),
        None => FileConfigProvider::user(),
    };
    let mut settings = provider
        .load()
        .await
        .with_context(|| format!("Failed to load config from {}", provider.path().display()))?;
    settings.apply_env();

    if let Some(p) = &cli.provider {
        settings.provider = p.clone();
    }
    if let Some(m) = &cli.model {
        settings.model = m.clone();
    }
    if let Some(rounds) = cli.max_rounds {
        settings.max_tool_rounds = rounds;
    }
    if let Some(secs) = cli.timeout {
        settings.turn_timeout_secs = secs;
    }
    Ok(settings)
}

/// Flag-supplied key first, then the environment
fn secret_source(provider: &str, api_key: Option<&str>) -> ChainSecretStore {
    let overrides = match api_key.filter(|k| !k.is_empty()) {
        Some(key) => MemorySecretStore::with_secret(provider, key),
        None => MemorySecretStore::new(),
    };
    let chain = ChainSecretStore::new(vec![Arc::new(overrides), Arc::new(EnvSecretStore::new())]);
    if let Some(source) = chain.source_of(provider) {
        tracing::debug!(provider, source, "resolved API key");
    }
    chain
}

fn build_orchestrator(
    settings: &ChatSettings,
    secrets: &dyn SecretStore,
    mcp_url: Option<&str>,
    logger: SharedLogger,
) -> Arc<ConversationOrchestrator> {
    let model_client = create_model_client(settings, secrets, Arc::clone(&logger));
    let endpoint: Arc<dyn ToolEndpoint> = match mcp_url {
        Some(url) => Arc::new(McpEndpoint::new(url, Arc::clone(&logger))),
        None => Arc::new(InProcessEndpoint::new(tools::demo_server(Arc::clone(&logger)))),
    };
    Arc::new(ConversationOrchestrator::from_settings(settings, model_client, endpoint, logger))
}

/// Run `fut`, cancelling `ctx` on Ctrl-C and then letting `fut` wind down
async fn interruptible<F: Future>(ctx: &CancellationToken, fut: F) -> F::Output {
    tokio::pin!(fut);
    tokio::select! {
        output = &mut fut => output,
        Ok(()) = tokio::signal::ctrl_c() => {
            ctx.cancel();
            fut.await
        }
    }
}

async fn run_chat(orchestrator: &ConversationOrchestrator, settings: &ChatSettings, message: &str, verbose: bool) -> Result<()> {
    let ctx = CancellationToken::with_timeout(settings.turn_timeout());
    let turn = interruptible(&ctx, orchestrator.run_with_transcript(&ctx, Vec::new(), message)).await?;

    if verbose {
        for msg in &turn.messages {
            match msg.role {
                MessageRole::Assistant if msg.has_tool_calls() => {
                    for call in msg.calls() {
                        eprintln!("-> {}({})", call.name, call.arguments);
                    }
                }
                MessageRole::Tool => eprintln!("<- {}", msg.content),
                _ => {}
            }
        }
        eprintln!("({} model calls, {} tool calls)", turn.model_calls, turn.tool_calls);
    }

    println!("{}", turn.reply);
    Ok(())
}

async fn run_repl(
    orchestrator: Arc<ConversationOrchestrator>,
    settings: &ChatSettings,
    title: Option<String>,
    logger: SharedLogger,
) -> Result<()> {
    let chat = ThreadChat::new(orchestrator, Arc::new(MemoryHistoryStore::new()), logger)
        .with_turn_timeout(settings.turn_timeout());
    let thread = chat.create_thread(title).await?;

    eprintln!("Thread {} ({} / {}). /history to review, /quit to leave.", thread.id, settings.provider, settings.model);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                let (_, messages) = chat.thread(thread.id).await?;
                for m in messages {
                    println!("[{}] {}: {}", m.created_at.format("%H:%M:%S"), m.role, m.content);
                }
            }
            text => {
                // No deadline here; the turn timeout is applied per send
                let ctx = CancellationToken::new();
                match interruptible(&ctx, chat.send(&ctx, thread.id, text)).await {
                    Ok(reply) => println!("{}", reply),
                    Err(e) => eprintln!("error: {}", e),
                }
            }
        }
    }
    Ok(())
}

async fn run_tools(orchestrator: &ConversationOrchestrator, settings: &ChatSettings) -> Result<()> {
    let ctx = CancellationToken::with_timeout(settings.handshake_timeout());
    let gateway = orchestrator.gateway();
    gateway.ensure_ready(&ctx).await?;

    if let Some(info) = gateway.server_info() {
        println!("Server: {}", info);
    }
    for tool in gateway.list_tools(&ctx).await? {
        if tool.description.is_empty() {
            println!("  {}", tool.name);
        } else {
            println!("  {} - {}", tool.name, tool.description);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_key_takes_precedence() {
        let secrets = secret_source("llmchat-test-provider", Some("sk-flag"));
        assert_eq!(secrets.get("llmchat-test-provider").as_deref(), Some("sk-flag"));
        assert_eq!(secrets.source_of("llmchat-test-provider"), Some("memory"));
    }

    #[tokio::test]
    async fn test_interruptible_completes_without_signal() {
        let ctx = CancellationToken::new();
        let turn = interruptible(&ctx, ctx.guard(async { "reply" })).await;
        assert_eq!(turn, Ok("reply"));
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn test_no_flag_falls_through() {
        let secrets = secret_source("llmchat-test-provider", Some(""));
        assert_eq!(secrets.get("llmchat-test-provider"), None);
        assert_eq!(secrets.source_of("llmchat-test-provider"), None);
    }
}
