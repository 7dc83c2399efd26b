//! Command structs

use teloxide::utils::command::BotCommands;

/// Commands available to every user
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum UserCommands {
    #[command(description = "Start the bot.")]
    Start,
    #[command(description = "Show this message.")]
    Help,
    #[command(description = "Register with your email.")]
    Register,
    #[command(description = "Cancel the current action.")]
    Cancel,
}

/// Commands reserved to administrators
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum AdminCommands {
    Admin,
}
