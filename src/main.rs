use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use safechat::client::{CheckScheduler, Checker, GatewayClient};
use safechat::config::Config;
use safechat::moderation::DecisionEngine;
use safechat::output::terminal;

/// Safe Chat Filter: decide whether a chat message is safe to send.
///
/// Uses an external moderation service when OPENAI_API_KEY is set and
/// falls back to local heuristic rules when it is not (or when it fails).
#[derive(Parser)]
#[command(name = "safechat", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP moderation gateway
    Serve {
        /// Address to bind (default: SAFECHAT_BIND or 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (default: SAFECHAT_PORT or 8000)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check a single message
    Check {
        /// The message text
        text: String,

        /// Ask a running gateway instead of deciding in-process
        #[arg(long)]
        server: Option<String>,
    },

    /// Show which classifiers are available
    Probe {
        /// Ask a running gateway instead of the local configuration
        #[arg(long)]
        server: Option<String>,
    },

    /// Interactive composer: each stdin line is an edit, `!text` submits now
    Compose {
        /// Ask a running gateway instead of deciding in-process
        #[arg(long)]
        server: Option<String>,

        /// Debounce window in milliseconds (default: SAFECHAT_DEBOUNCE_MS or 500)
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("safechat=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { bind, port } => {
            let engine = DecisionEngine::from_config(&config)?;
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let port = port.unwrap_or(config.port);
            info!("Starting gateway...");
            safechat::web::run_server(engine, &bind, port).await?;
        }

        Commands::Check { text, server } => {
            let verdict = match server {
                Some(url) => GatewayClient::new(&url)?.check(&text).await?,
                None => DecisionEngine::from_config(&config)?.decide(&text).await,
            };
            terminal::display_verdict(&text, &verdict);
        }

        Commands::Probe { server } => {
            let probe = match server {
                Some(url) => GatewayClient::new(&url)?.probe().await?,
                None => DecisionEngine::from_config(&config)?.probe(),
            };
            terminal::display_probe(&probe);
        }

        Commands::Compose {
            server,
            debounce_ms,
        } => {
            let window = debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(config.debounce);
            println!(
                "{}",
                "Type a message per line. Prefix with ! to check immediately. Ctrl-D to quit."
                    .dimmed()
            );
            match server {
                Some(url) => run_composer(GatewayClient::new(&url)?, window).await?,
                None => run_composer(DecisionEngine::from_config(&config)?, window).await?,
            }
        }
    }

    Ok(())
}

/// Feed stdin lines through the debounced scheduler and print every
/// display change until stdin closes.
async fn run_composer<C: Checker>(checker: C, window: Duration) -> Result<()> {
    let scheduler = CheckScheduler::new(checker, window);
    let mut updates = scheduler.subscribe();

    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            terminal::display_state(&state);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.strip_prefix('!') {
            Some(text) => scheduler.submit(text),
            None => scheduler.edit(&line),
        }
    }

    // Let the last edit fire and its answer arrive before exiting.
    tokio::time::sleep(window).await;
    let mut settle = scheduler.subscribe();
    let _ = tokio::time::timeout(
        Duration::from_secs(10),
        settle.wait_for(|state| !state.checking),
    )
    .await;

    drop(scheduler);
    printer.abort();
    Ok(())
}
