//! Binary for the broadcast bot.

use std::sync::Arc;

use anyhow::Result;
use bcast_core::init_tracing;
use bcast_engine::Engine;
use bcast_store::JsonStore;
use broadcast_bot::{run_repl, BotConfig, TelegramGateway};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "broadcast-bot", about = "Telegram broadcast bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot
    Run {
        /// Telegram bot token; falls back to the BOT_TOKEN env var
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => run(BotConfig::load(token)?).await,
    }
}

async fn run(config: BotConfig) -> Result<()> {
    if let Some(parent) = std::path::Path::new(&config.log_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    init_tracing(&config.log_file)?;

    info!(
        data_dir = %config.data_dir,
        pause_ms = config.broadcast_pause_ms,
        interval_secs = config.auto_interval_secs,
        "Initializing bot"
    );

    let bot = teloxide::Bot::new(config.bot_token.clone());
    let store = JsonStore::new(&config.data_dir)?;
    let gateway = Arc::new(TelegramGateway::new(bot.clone()));
    let engine = Engine::new(store, gateway, config.pacing(), config.auto_interval());

    info!("Bot started successfully");

    run_repl(bot, engine).await
}
