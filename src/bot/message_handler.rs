//! Message handler: routes incoming text, contact and location messages
//! into the order workflow.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use super::{deliver_step, AppContext};
use crate::dialogue::StoreDialogue;

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: StoreDialogue,
    ctx: Arc<AppContext>,
) -> Result<()> {
    // The storefront is a private-chat bot, so the chat id is the user id.
    let user_id = msg.chat.id.0;
    let stage = dialogue.get().await?.unwrap_or_default();
    debug!(user_id, stage = ?stage, "Incoming message");

    let workflow = ctx.workflow();

    let step = if let Some(location) = msg.location() {
        workflow
            .handle_location(user_id, stage, location.latitude, location.longitude)
            .await?
    } else if let Some(contact) = msg.contact() {
        workflow
            .handle_contact(user_id, stage, &contact.phone_number)
            .await?
    } else if let Some(text) = msg.text() {
        workflow.handle_text(user_id, stage, text).await?
    } else {
        return Ok(());
    };

    deliver_step(&bot, msg.chat.id, &ctx, step, &dialogue).await
}
