use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use teloxide::dispatching::dialogue::{self, InMemStorage};
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dukkon::bot::{callback_handler, message_handler, AppContext};
use dukkon::cache::InMemoryPreferenceCache;
use dukkon::config::Config;
use dukkon::db::{self, Database};
use dukkon::dialogue::Stage;
use dukkon::localization::LocalizationManager;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting Dukkon storefront bot");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    info!("Initializing database at: {}", config.database_url);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    db::init_schema(&pool).await?;

    let locales = LocalizationManager::new()?;

    let bot = Bot::new(config.bot_token.clone());

    let ctx = Arc::new(AppContext {
        db: Database::new(pool),
        locales,
        prefs: InMemoryPreferenceCache::new(),
        config,
    });

    info!("Bot initialized, starting dispatcher");

    let handler = dialogue::enter::<Update, InMemStorage<Stage>, Stage, _>()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<Stage>::new(), ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
