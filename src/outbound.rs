//! Outbound send port.
//!
//! The router and the broadcast fan-out never touch the Telegram API
//! directly; they go through this trait. The production implementation
//! is [`crate::bot::transport::TelegramOutbound`]; tests substitute a
//! recording fake.

use async_trait::async_trait;
use thiserror::Error;

use crate::menu::MenuButton;
use crate::session::UserId;

/// Delivery failure for a single outbound send
#[derive(Debug, Error)]
pub enum OutboundError {
    /// The platform rejected the recipient (blocked the bot, deleted
    /// account, and so on)
    #[error("recipient unavailable: {0}")]
    Unavailable(String),
    /// Any other send failure
    #[error("send failed: {0}")]
    Send(String),
}

/// Capability of delivering messages to a chat.
///
/// Chat IDs equal user IDs for the private chats this bot lives in.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Send plain text; returns the ID of the (last) sent message
    async fn send_text(&self, chat: UserId, text: &str) -> Result<i32, OutboundError>;

    /// Send HTML-formatted text
    async fn send_html(&self, chat: UserId, text: &str) -> Result<i32, OutboundError>;

    /// Send a photo by platform file reference with a caption
    async fn send_photo(
        &self,
        chat: UserId,
        file_ref: &str,
        caption: &str,
    ) -> Result<i32, OutboundError>;

    /// Send text with an inline button grid
    async fn send_keyboard(
        &self,
        chat: UserId,
        text: &str,
        keyboard: &[Vec<MenuButton>],
    ) -> Result<i32, OutboundError>;

    /// Edit an existing message's text and button grid in place.
    ///
    /// An empty `keyboard` removes the buttons.
    async fn edit_keyboard(
        &self,
        chat: UserId,
        message_id: i32,
        text: &str,
        keyboard: &[Vec<MenuButton>],
    ) -> Result<(), OutboundError>;

    /// Show the "typing" chat action; failures are not interesting
    async fn send_typing(&self, chat: UserId);
}
