//! Handler for the commands every user can send

use engine::{Engine, EngineError};
use teloxide::{
    RequestError,
    dispatching::{HandlerExt, UpdateHandler},
    prelude::*,
    utils::command::BotCommands,
};

use crate::{
    ConfigParameters,
    access::sender_id,
    commands::UserCommands,
    state::SessionStore,
    ui::{self, Keyboard, Reply},
};

use super::{registration, send_reply, settle};

/// Build the schema for `UserCommands` commands
pub(super) fn schema() -> UpdateHandler<RequestError> {
    dptree::entry()
        .filter_command::<UserCommands>()
        .endpoint(handle_user_command)
}

async fn handle_user_command(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
    cmd: UserCommands,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    tracing::debug!(chat_id = chat_id.0, ?cmd, "user command");

    let sender = sender_id(msg.from.as_ref());
    let result = respond(&cfg.engine, &cfg.sessions, chat_id, sender, cmd)
        .await
        .map(Some);
    if let Some(reply) = settle(&cfg.sessions, chat_id, result).await {
        send_reply(&bot, chat_id, reply).await?;
    }
    Ok(())
}

pub(super) fn help_text() -> String {
    UserCommands::descriptions().to_string()
}

pub(super) async fn respond(
    engine: &Engine,
    sessions: &SessionStore,
    chat_id: ChatId,
    sender: Option<i64>,
    cmd: UserCommands,
) -> Result<Reply, EngineError> {
    match cmd {
        UserCommands::Start => {
            sessions.clear(chat_id).await;
            let registered = match sender {
                Some(telegram_id) => engine.user(telegram_id).await?,
                None => None,
            };
            let text = match registered {
                Some(user) => format!("Welcome back, {}", user.email),
                None => ui::WELCOME_GUEST.to_string(),
            };
            Ok(Reply::text(text).with_keyboard(Keyboard::Main))
        }
        UserCommands::Help => Ok(Reply::text(help_text())),
        UserCommands::Register => {
            if !sessions.get(chat_id).await.is_idle() {
                return Ok(Reply::text(ui::BUSY));
            }
            registration::start_registration(engine, sessions, chat_id, sender).await
        }
        UserCommands::Cancel => {
            sessions.clear(chat_id).await;
            Ok(Reply::text(ui::CANCELLED).with_keyboard(Keyboard::Main))
        }
    }
}
