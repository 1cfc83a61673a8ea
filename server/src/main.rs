use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use switchboard_server::config::ServerConfig;
use switchboard_server::web::app_state::AppState;
use switchboard_server::web::router::build_router;

#[derive(Parser)]
#[command(name = "switchboard", version, about = "Signed interaction webhook dispatcher")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "switchboard.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the interaction webhook (default).
    Serve,
    /// Overwrite the platform's global commands with the built-in set.
    Sync,
    /// Print local commands merged with their platform registration.
    List,
    /// Delete one registered command from the platform.
    Unregister {
        id: String,
        /// Delete from this guild instead of globally.
        #[arg(long)]
        guild: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(&cli.config)?;
    let state = Arc::new(AppState::from_config(config)?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state).await,
        Command::Sync => {
            let report = state.sync.register_all().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_ok() {
                bail!("command sync failed");
            }
            Ok(())
        }
        Command::List => {
            let listing = state
                .sync
                .list()
                .await
                .context("could not fetch registered commands")?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
            Ok(())
        }
        Command::Unregister { id, guild } => {
            if !state.sync.unregister(&id, guild.as_deref()).await {
                bail!("failed to unregister command {id}");
            }
            Ok(())
        }
    }
}

async fn serve(state: Arc<AppState>) -> Result<()> {
    let web_addr = state.config.server.web_address.clone();
    let app = build_router(state);

    info!("Switchboard starting on {}", web_addr);

    let listener = tokio::net::TcpListener::bind(&web_addr)
        .await
        .with_context(|| format!("failed to bind web listener on {web_addr}"))?;

    axum::serve(listener, app).await.context("server error")
}
