//! Bot layer: teloxide wiring around the order workflow.
//!
//! - `message_handler`: text, contact and location messages
//! - `callback_handler`: inline keyboard callback queries
//! - `ui_builder`: turns menu selections into keyboards

pub mod callback_handler;
pub mod message_handler;
pub mod ui_builder;

pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::warn;

use crate::cache::InMemoryPreferenceCache;
use crate::config::Config;
use crate::db::Database;
use crate::dialogue::StoreDialogue;
use crate::localization::LocalizationManager;
use crate::workflow::{Step, Workflow};

/// Shared application state injected into every handler.
pub struct AppContext {
    pub db: Database,
    pub locales: LocalizationManager,
    pub prefs: InMemoryPreferenceCache,
    pub config: Config,
}

impl AppContext {
    /// A workflow view over this context.
    pub fn workflow(&self) -> Workflow<'_> {
        Workflow::new(
            &self.db,
            &self.locales,
            &self.prefs,
            self.config.fallback_language,
        )
    }
}

/// Deliver a workflow step: send the replies, notify the operator channel
/// best-effort, then persist the next stage.
pub(crate) async fn deliver_step(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &AppContext,
    step: Step,
    dialogue: &StoreDialogue,
) -> Result<()> {
    for reply in &step.replies {
        let mut request = bot.send_message(chat_id, reply.text.as_str());
        if let Some(menu) = &reply.menu {
            request = request.reply_markup(ui_builder::reply_markup(menu, step.lang, &ctx.locales));
        }
        request.await?;
    }

    if let Some(note) = &step.operator_note {
        // The customer acknowledgement never waits on operator delivery.
        if let Err(e) = bot
            .send_message(ChatId(ctx.config.operator_chat_id), note.as_str())
            .await
        {
            warn!(error = %e, "Failed to deliver order summary to operator channel");
        }
    }

    dialogue.update(step.next).await?;
    Ok(())
}
