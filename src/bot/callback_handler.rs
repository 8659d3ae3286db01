//! Callback handler: routes inline keyboard selections into the order
//! workflow.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use super::{deliver_step, AppContext};
use crate::dialogue::StoreDialogue;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: StoreDialogue,
    ctx: Arc<AppContext>,
) -> Result<()> {
    let user_id = q.from.id.0 as i64;
    let chat_id = q
        .message
        .as_ref()
        .map(|msg| msg.chat().id)
        .unwrap_or(ChatId(user_id));

    let data = q.data.clone().unwrap_or_default();
    let stage = dialogue.get().await?.unwrap_or_default();
    debug!(user_id, data = %data, stage = ?stage, "Incoming callback query");

    let step = ctx
        .workflow()
        .handle_selection(user_id, stage, &data)
        .await?;

    bot.answer_callback_query(q.id).await?;

    deliver_step(&bot, chat_id, &ctx, step, &dialogue).await
}
