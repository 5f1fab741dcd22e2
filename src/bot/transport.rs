//! Outbound port implementation backed by the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ChatAction, ChatId, FileId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId,
    ParseMode,
};
use tracing::debug;

use crate::menu::MenuButton;
use crate::outbound::{Outbound, OutboundError};
use crate::session::UserId;
use crate::utils::{split_long_message, TELEGRAM_MESSAGE_LIMIT};

/// [`Outbound`] adapter over a teloxide [`Bot`]
#[derive(Clone)]
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    /// Wrap a bot handle
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn keyboard_markup(rows: &[Vec<MenuButton>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.token.clone()))
            .collect::<Vec<_>>()
    }))
}

fn map_err(e: teloxide::RequestError) -> OutboundError {
    match e {
        // API-level rejections (blocked bot, deactivated account) mean
        // this recipient cannot be reached, not that sending is broken
        teloxide::RequestError::Api(api) => OutboundError::Unavailable(api.to_string()),
        other => OutboundError::Send(other.to_string()),
    }
}

#[async_trait]
impl Outbound for TelegramOutbound {
    async fn send_text(&self, chat: UserId, text: &str) -> Result<i32, OutboundError> {
        let mut last = None;
        for part in split_long_message(text, TELEGRAM_MESSAGE_LIMIT) {
            let sent = self
                .bot
                .send_message(ChatId(chat), part)
                .await
                .map_err(map_err)?;
            last = Some(sent.id.0);
        }
        last.ok_or_else(|| OutboundError::Send("refusing to send an empty message".to_string()))
    }

    async fn send_html(&self, chat: UserId, text: &str) -> Result<i32, OutboundError> {
        let sent = self
            .bot
            .send_message(ChatId(chat), text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(map_err)?;
        Ok(sent.id.0)
    }

    async fn send_photo(
        &self,
        chat: UserId,
        file_ref: &str,
        caption: &str,
    ) -> Result<i32, OutboundError> {
        let photo = InputFile::file_id(FileId(file_ref.to_string()));
        let mut request = self.bot.send_photo(ChatId(chat), photo);
        if !caption.is_empty() {
            request = request.caption(caption.to_string());
        }
        let sent = request.await.map_err(map_err)?;
        Ok(sent.id.0)
    }

    async fn send_keyboard(
        &self,
        chat: UserId,
        text: &str,
        keyboard: &[Vec<MenuButton>],
    ) -> Result<i32, OutboundError> {
        let sent = self
            .bot
            .send_message(ChatId(chat), text)
            .reply_markup(keyboard_markup(keyboard))
            .await
            .map_err(map_err)?;
        Ok(sent.id.0)
    }

    async fn edit_keyboard(
        &self,
        chat: UserId,
        message_id: i32,
        text: &str,
        keyboard: &[Vec<MenuButton>],
    ) -> Result<(), OutboundError> {
        let request = self
            .bot
            .edit_message_text(ChatId(chat), MessageId(message_id), text);
        if keyboard.is_empty() {
            // Editing without a markup drops the buttons
            request.await.map_err(map_err)?;
        } else {
            request
                .reply_markup(keyboard_markup(keyboard))
                .await
                .map_err(map_err)?;
        }
        Ok(())
    }

    async fn send_typing(&self, chat: UserId) {
        if let Err(e) = self
            .bot
            .send_chat_action(ChatId(chat), ChatAction::Typing)
            .await
        {
            debug!("chat action for {} failed: {}", chat, e);
        }
    }
}
