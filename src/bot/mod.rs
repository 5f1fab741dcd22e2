/// Bot command definitions
pub mod commands;
/// dptree endpoints mapping Telegram updates onto the router
pub mod handlers;
/// Outbound port implementation backed by the Telegram API
pub mod transport;
