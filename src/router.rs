//! Update classification and dispatch.
//!
//! One inbound event comes in as a command, a callback token or free
//! text; the router mutates the session accordingly and replies through
//! the outbound port. Every failure is converted to a user-facing reply
//! or a silent no-op here; nothing propagates to the transport, which
//! always acknowledges the update.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::bot::commands::Command;
use crate::broadcast::{self, BroadcastPayload};
use crate::catalog::{self, AUTO_DETECT};
use crate::menu::{self, SelectAction, Token};
use crate::outbound::Outbound;
use crate::relay::RelayLog;
use crate::session::{Mode, PendingAction, SessionStore, UserId};
use crate::translate::Translator;

const DENIED: &str = "⛔️ This command is available to the administrator only.";
const SUPPORT_UNAVAILABLE: &str =
    "Support is not available right now: no administrator is configured.";

/// Identity of the inbound event's author, as far as replies need it
#[derive(Debug, Clone)]
pub struct Sender {
    /// Stable user identity
    pub user_id: UserId,
    /// Chat to reply into (equals `user_id` in private chats)
    pub chat: UserId,
    /// Display name for greetings and relay tags
    pub name: String,
}

/// Dispatches classified updates against the session store.
///
/// Holds only shared immutable references; cloning is cheap and every
/// handler may run concurrently with the others.
pub struct Router {
    store: Arc<SessionStore>,
    relay: Arc<RelayLog>,
    translator: Arc<dyn Translator>,
    outbound: Arc<dyn Outbound>,
    admin_id: Option<UserId>,
    broadcast_interval: Duration,
}

impl Router {
    /// Wire a router against its collaborators
    #[must_use]
    pub fn new(
        store: Arc<SessionStore>,
        relay: Arc<RelayLog>,
        translator: Arc<dyn Translator>,
        outbound: Arc<dyn Outbound>,
        admin_id: Option<UserId>,
        broadcast_interval: Duration,
    ) -> Self {
        Self {
            store,
            relay,
            translator,
            outbound,
            admin_id,
            broadcast_interval,
        }
    }

    /// Fail-closed admin check: with no administrator configured,
    /// nobody is the administrator.
    fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_id == Some(user_id)
    }

    /// Dispatch a parsed command.
    ///
    /// `broadcast_media` carries the photo reference when `/broadcast`
    /// was sent as a reply to a photo.
    ///
    /// # Errors
    ///
    /// Returns an error only when the reply itself cannot be sent.
    pub async fn handle_command(
        &self,
        sender: &Sender,
        cmd: Command,
        broadcast_media: Option<String>,
    ) -> Result<()> {
        match cmd {
            Command::Start => self.cmd_start(sender).await,
            Command::Set => self.cmd_set(sender).await,
            Command::Support => self.cmd_support(sender).await,
            Command::Status => self.cmd_status(sender).await,
            Command::Broadcast(text) => self.cmd_broadcast(sender, text, broadcast_media).await,
        }
    }

    async fn cmd_start(&self, sender: &Sender) -> Result<()> {
        let session = self.store.get(sender.user_id).await;
        let name = html_escape::encode_text(&sender.name);
        let text = format!(
            "Hello <b>{name}</b>! 👋\n\n\
             I am a language translator bot powered by Gemini AI.\n\n\
             Send me any text and I will translate it into <b>{target}</b>. \
             Use /set to pick languages and /support to reach a human.",
            target = catalog::display_name(&session.target),
        );
        self.outbound.send_html(sender.chat, &text).await?;
        Ok(())
    }

    async fn cmd_set(&self, sender: &Sender) -> Result<()> {
        self.outbound
            .send_keyboard(
                sender.chat,
                "What would you like to change?",
                &menu::build_chooser(),
            )
            .await?;
        Ok(())
    }

    async fn cmd_support(&self, sender: &Sender) -> Result<()> {
        if self.admin_id.is_none() {
            self.outbound
                .send_text(sender.chat, SUPPORT_UNAVAILABLE)
                .await?;
            return Ok(());
        }
        self.store
            .update(sender.user_id, |s| {
                s.mode = Mode::SupportRelay;
                s.pending = Some(PendingAction::AwaitingSupportMessage);
            })
            .await;
        self.outbound
            .send_text(
                sender.chat,
                "✍️ Send the message you want to pass to the support team. \
                 It will be forwarded as-is.",
            )
            .await?;
        Ok(())
    }

    async fn cmd_status(&self, sender: &Sender) -> Result<()> {
        if !self.is_admin(sender.user_id) {
            self.outbound.send_text(sender.chat, DENIED).await?;
            return Ok(());
        }
        let text = format!(
            "Users known: {}\nCatalog size: {}\nBroadcast interval: {} ms",
            self.store.user_count().await,
            catalog::LANGUAGES.len(),
            self.broadcast_interval.as_millis(),
        );
        self.outbound.send_text(sender.chat, &text).await?;
        Ok(())
    }

    async fn cmd_broadcast(
        &self,
        sender: &Sender,
        text: String,
        media: Option<String>,
    ) -> Result<()> {
        if !self.is_admin(sender.user_id) {
            self.outbound.send_text(sender.chat, DENIED).await?;
            return Ok(());
        }
        let text = text.trim().to_string();
        if text.is_empty() && media.is_none() {
            self.outbound
                .send_text(
                    sender.chat,
                    "Usage: /broadcast <text>, optionally as a reply to a photo.",
                )
                .await?;
            return Ok(());
        }

        let recipients = self.store.all_user_ids().await;
        info!(
            "starting broadcast from admin {} to {} recipients",
            sender.user_id,
            recipients.len()
        );
        let payload = BroadcastPayload { text, media };
        let report = broadcast::run(
            self.outbound.as_ref(),
            &recipients,
            &payload,
            self.broadcast_interval,
        )
        .await;

        self.outbound
            .send_text(
                sender.chat,
                &format!(
                    "📣 Broadcast finished: {} delivered, {} failed.",
                    report.sent, report.failed
                ),
            )
            .await?;
        Ok(())
    }

    /// Dispatch a callback token from an inline keyboard.
    ///
    /// Malformed or stale tokens are silently dropped; navigation
    /// re-renders the same message in place.
    ///
    /// # Errors
    ///
    /// Returns an error only when the edit or reply cannot be sent.
    pub async fn handle_callback(
        &self,
        sender: &Sender,
        message_id: Option<i32>,
        data: &str,
    ) -> Result<()> {
        let Some(token) = Token::parse(data) else {
            debug!("dropping malformed callback token {:?}", data);
            return Ok(());
        };

        match token {
            Token::Select { action, code } => {
                self.apply_selection(sender, message_id, action, &code).await
            }
            Token::Page { action, index } => {
                let page = menu::build_page(action, index);
                self.store
                    .update(sender.user_id, |s| {
                        s.pending = Some(match action {
                            SelectAction::Source => PendingAction::ChoosingSource,
                            SelectAction::Target => PendingAction::ChoosingTarget,
                        });
                    })
                    .await;
                self.edit_or_send(sender, message_id, &page.title(), &page.rows)
                    .await
            }
            Token::Cancel => {
                self.store
                    .update(sender.user_id, |s| s.pending = None)
                    .await;
                self.edit_or_send(sender, message_id, "Cancelled.", &[]).await
            }
        }
    }

    async fn apply_selection(
        &self,
        sender: &Sender,
        message_id: Option<i32>,
        action: SelectAction,
        code: &str,
    ) -> Result<()> {
        let valid = code == AUTO_DETECT && action == SelectAction::Source
            || catalog::find(code).is_some();
        if !valid {
            // Stale or forged token; the catalog is process-local, so
            // this is not a user mistake worth reporting
            debug!("dropping selection of unknown code {:?}", code);
            return Ok(());
        }

        self.store
            .update(sender.user_id, |s| {
                match action {
                    SelectAction::Source => s.source = code.to_string(),
                    SelectAction::Target => s.target = code.to_string(),
                }
                s.pending = None;
            })
            .await;

        let name = catalog::display_name(code);
        let confirmation = match action {
            SelectAction::Source => format!("Source language set to {name}."),
            SelectAction::Target => {
                format!("Target language set to {name}. Send me text to translate!")
            }
        };
        self.edit_or_send(sender, message_id, &confirmation, &[])
            .await
    }

    async fn edit_or_send(
        &self,
        sender: &Sender,
        message_id: Option<i32>,
        text: &str,
        keyboard: &[Vec<menu::MenuButton>],
    ) -> Result<()> {
        match message_id {
            Some(id) => {
                self.outbound
                    .edit_keyboard(sender.chat, id, text, keyboard)
                    .await?;
            }
            None => {
                self.outbound
                    .send_keyboard(sender.chat, text, keyboard)
                    .await?;
            }
        }
        Ok(())
    }

    /// Dispatch a free-text message according to the session mode.
    ///
    /// `reply_to` carries the ID of the quoted message when the text is
    /// a reply; for the administrator this is how support answers are
    /// correlated back to their sender.
    ///
    /// # Errors
    ///
    /// Returns an error only when a reply cannot be sent.
    pub async fn handle_text(
        &self,
        sender: &Sender,
        text: &str,
        reply_to: Option<i32>,
    ) -> Result<()> {
        // Unknown slash commands fall through the command filter; they
        // are not free text
        if text.starts_with('/') {
            debug!("ignoring unrecognized command {:?}", text);
            return Ok(());
        }

        if self.is_admin(sender.user_id) {
            if let Some(message_id) = reply_to {
                return self.deliver_admin_reply(sender, message_id, text).await;
            }
        }

        let session = self.store.get(sender.user_id).await;
        if session.mode == Mode::SupportRelay {
            return self.relay_to_admin(sender, text).await;
        }
        self.translate_and_reply(sender, &session.source, &session.target, text)
            .await
    }

    async fn deliver_admin_reply(
        &self,
        sender: &Sender,
        message_id: i32,
        text: &str,
    ) -> Result<()> {
        let Some(user_id) = self.relay.resolve(message_id).await else {
            debug!("admin reply to message {} has no correlation", message_id);
            return Ok(());
        };
        self.outbound
            .send_text(user_id, &format!("💬 Reply from the support team:\n\n{text}"))
            .await?;
        info!("relayed admin {} reply to user {}", sender.user_id, user_id);
        Ok(())
    }

    async fn relay_to_admin(&self, sender: &Sender, text: &str) -> Result<()> {
        // Leave support mode whether or not the relay succeeds; the
        // pending action is consumed by this message
        self.store
            .update(sender.user_id, |s| {
                s.mode = Mode::Translate;
                s.pending = None;
            })
            .await;

        let Some(admin_id) = self.admin_id else {
            self.outbound
                .send_text(sender.chat, SUPPORT_UNAVAILABLE)
                .await?;
            return Ok(());
        };

        let tagged = format!(
            "📨 Support message from {} (id {}):\n\n{}",
            sender.name, sender.user_id, text
        );
        let admin_message_id = self.outbound.send_text(admin_id, &tagged).await?;
        self.relay.record(admin_message_id, sender.chat).await;

        self.outbound
            .send_text(
                sender.chat,
                "✅ Your message was forwarded to the support team. \
                 They will reply to you here.",
            )
            .await?;
        Ok(())
    }

    async fn translate_and_reply(
        &self,
        sender: &Sender,
        source: &str,
        target: &str,
        text: &str,
    ) -> Result<()> {
        self.outbound.send_typing(sender.chat).await;

        let source_hint = (source != AUTO_DETECT).then(|| catalog::display_name(source));
        let target_name = catalog::display_name(target);

        let reply = match self
            .translator
            .translate(text, source_hint, target_name)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                error!("translation for user {} failed: {}", sender.user_id, e);
                e.user_message().to_string()
            }
        };
        self.outbound.send_text(sender.chat, &reply).await?;
        Ok(())
    }
}
