use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fruitbot::bot::FruitBot;
use fruitbot::catalog::{self, CatalogStore};
use fruitbot::cli::{Cli, Commands};
use fruitbot::config::Config;
use fruitbot::matcher::ExactMatch;
use fruitbot::pipeline::Resolver;
use fruitbot::recognizer::GeminiClient;
use fruitbot::telegram::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);

    info!("fruitbot {}", env!("CARGO_PKG_VERSION"));
    info!("catalog database: {}", config.db_path);

    let pool = catalog::init_pool(&config.db_path).await?;
    let catalog = CatalogStore::new(pool, config.update_policy);

    match cli.command {
        Some(Commands::Seed) => {
            let inserted = catalog.seed_defaults().await?;
            info!("seeded catalog with {inserted} new fruits");
        }

        Some(Commands::Run) | None => {
            if config.gemini_api_key.is_none() {
                tracing::warn!(
                    "GEMINI_API_KEY not set, photo recognition will always fail"
                );
            }

            let recognizer = GeminiClient::new(&config)?;
            let resolver = Resolver::new(Arc::new(recognizer), catalog.clone(), Box::new(ExactMatch));
            let telegram = TelegramClient::new(&config.bot_token)?;

            let bot = FruitBot::new(telegram, resolver, catalog, config.clone());
            bot.run().await?;
        }
    }

    Ok(())
}
