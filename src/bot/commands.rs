//! Bot command definitions.

use teloxide::utils::command::BotCommands;

/// Commands understood by the bot.
///
/// Anything else starting with a slash falls through the command filter
/// and is ignored by the free-text handler.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Greeting; also materializes the session
    #[command(description = "start the bot.")]
    Start,
    /// Open the language selection menu
    #[command(description = "choose source and target languages.")]
    Set,
    /// Arm the support relay for the next message
    #[command(description = "write to the support team.")]
    Support,
    /// Admin only: show bot statistics
    #[command(description = "show bot status (admin only).")]
    Status,
    /// Admin only: send a message to every known user
    #[command(description = "message all users (admin only).")]
    Broadcast(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse() {
        let bot_name = "test_bot";
        assert_eq!(
            Command::parse("/start", bot_name).ok(),
            Some(Command::Start)
        );
        assert_eq!(Command::parse("/set", bot_name).ok(), Some(Command::Set));
        assert_eq!(
            Command::parse("/broadcast hello everyone", bot_name).ok(),
            Some(Command::Broadcast("hello everyone".to_string()))
        );
        assert!(Command::parse("/unknown", bot_name).is_err());
    }
}
