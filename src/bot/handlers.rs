//! dptree endpoints.
//!
//! Each endpoint extracts the event shape the router needs, delegates,
//! logs internal failures and acknowledges the update unconditionally,
//! so the transport never sees a non-success outcome that would make
//! the platform redeliver the update.

use std::sync::Arc;
use teloxide::prelude::*;
use tracing::error;

use crate::bot::commands::Command;
use crate::router::{Router, Sender};

fn sender_of(msg: &Message) -> Sender {
    let user_id = msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed());
    let name = msg
        .from
        .as_ref()
        .map_or_else(|| "Unknown".to_string(), |u| u.first_name.clone());
    Sender {
        user_id,
        chat: msg.chat.id.0,
        name,
    }
}

/// Endpoint for parsed commands
///
/// # Errors
///
/// Never fails; internal errors are logged and swallowed.
pub async fn handle_command(
    msg: Message,
    cmd: Command,
    router: Arc<Router>,
) -> Result<(), teloxide::RequestError> {
    let sender = sender_of(&msg);
    // A /broadcast sent as a reply to a photo attaches that photo to
    // the payload
    let media = msg
        .reply_to_message()
        .and_then(|m| m.photo())
        .and_then(|sizes| sizes.last())
        .map(|p| p.file.id.0.clone());

    if let Err(e) = router.handle_command(&sender, cmd, media).await {
        error!("command handler error for user {}: {}", sender.user_id, e);
    }
    respond(())
}

/// Endpoint for inline keyboard callbacks
///
/// # Errors
///
/// Never fails; internal errors are logged and swallowed.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    router: Arc<Router>,
) -> Result<(), teloxide::RequestError> {
    let Some(data) = q.data.as_deref() else {
        return respond(());
    };

    // Stop the client's loading spinner before doing any work
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let user_id = q.from.id.0.cast_signed();
    let sender = Sender {
        user_id,
        chat: q.message.as_ref().map_or(user_id, |m| m.chat().id.0),
        name: q.from.first_name.clone(),
    };
    let message_id = q.message.as_ref().map(|m| m.id().0);

    if let Err(e) = router.handle_callback(&sender, message_id, data).await {
        error!("callback handler error for user {}: {}", user_id, e);
    }
    respond(())
}

/// Endpoint for free-text messages
///
/// # Errors
///
/// Never fails; internal errors are logged and swallowed.
pub async fn handle_message(msg: Message, router: Arc<Router>) -> Result<(), teloxide::RequestError> {
    let Some(text) = msg.text() else {
        return respond(());
    };
    let sender = sender_of(&msg);
    let reply_to = msg.reply_to_message().map(|m| m.id.0);

    if let Err(e) = router.handle_text(&sender, text, reply_to).await {
        error!("text handler error for user {}: {}", sender.user_id, e);
    }
    respond(())
}
