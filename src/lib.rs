//! Webhook-driven Telegram translation bot.
//!
//! The crate is split along the seams that matter for testing: the
//! [`router`] contains all dispatch and session logic and talks to the
//! outside world only through the [`outbound::Outbound`] and
//! [`translate::Translator`] traits, so integration tests can drive the
//! whole conversation flow without a network.

/// Telegram transport layer: commands, dptree endpoints, outbound adapter
pub mod bot;
/// Rate-limited fan-out of one payload to every known user
pub mod broadcast;
/// Fixed language catalog with stable ordering
pub mod catalog;
/// Configuration and settings management
pub mod config;
/// Paginated selection menus and callback tokens
pub mod menu;
/// Outbound send port, implemented by the Telegram adapter
pub mod outbound;
/// Correlation between relayed support messages and their senders
pub mod relay;
/// Update classification and dispatch
pub mod router;
/// Per-user conversational state
pub mod session;
/// Translation port and the Gemini implementation
pub mod translate;
/// Text helpers shared across handlers
pub mod utils;
