//! Telegram bot.
//!
//! Users register with their email; admins list, delete and deactivate
//! users and grant or revoke admin rights from a reply keyboard.

use engine::Engine;
use teloxide::{prelude::*, utils::command::BotCommands};

mod access;
mod commands;
mod handlers;
mod state;
mod ui;

#[cfg(test)]
mod testing;

/// Dependencies handed to every handler by the dispatcher.
#[derive(Clone)]
pub struct ConfigParameters {
    engine: Engine,
    sessions: state::SessionStore,
}

pub struct Bot {
    token: String,
    engine: Engine,
}

impl Bot {
    pub fn new(token: &str, engine: Engine) -> Result<Self, String> {
        if token.trim().is_empty() {
            return Err("telegram token must not be empty".to_string());
        }

        Ok(Self {
            token: token.to_string(),
            engine,
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);
        prepare(&bot).await;

        let parameters = ConfigParameters {
            engine: self.engine.clone(),
            sessions: state::SessionStore::default(),
        };

        Dispatcher::builder(bot, handlers::schema())
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

/// Drop updates queued while the bot was offline and publish the user
/// commands. Failures are logged and do not stop the bot.
async fn prepare(bot: &teloxide::Bot) {
    if let Err(err) = bot.delete_webhook().drop_pending_updates(true).await {
        tracing::warn!("failed to drop pending updates: {err}");
    }
    if let Err(err) = bot
        .set_my_commands(commands::UserCommands::bot_commands())
        .await
    {
        tracing::warn!("failed to publish bot commands: {err}");
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    engine: Option<Engine>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn engine(mut self, engine: Engine) -> BotBuilder {
        self.engine = Some(engine);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        let engine = self
            .engine
            .ok_or_else(|| "telegram bot needs a user store".to_string())?;
        Bot::new(&self.token, engine)
    }
}
