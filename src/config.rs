//! Runtime configuration loaded from the environment.

use anyhow::{Context, Result};
use std::env;

use crate::models::Language;

/// Bot configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub database_url: String,
    /// Chat id of the operator channel that receives order summaries.
    pub operator_chat_id: i64,
    /// Language used when the preference cache has no entry for a user.
    pub fallback_language: Language,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bot_token =
            env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?;
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let operator_chat_id = env::var("OPERATOR_CHAT_ID")
            .context("OPERATOR_CHAT_ID must be set")?
            .parse::<i64>()
            .context("OPERATOR_CHAT_ID must be an integer chat id")?;
        let fallback_language = match env::var("FALLBACK_LANGUAGE") {
            Ok(code) => Language::from_code(&code)
                .with_context(|| format!("Unknown FALLBACK_LANGUAGE: {code}"))?,
            Err(_) => Language::Latin,
        };

        Ok(Self {
            bot_token,
            database_url,
            operator_chat_id,
            fallback_language,
        })
    }
}
