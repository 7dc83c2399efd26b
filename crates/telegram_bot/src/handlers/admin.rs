//! Handler for the administration of users
//!
//! Every message reaching this module already passed the access filter, so
//! the sender is a registered admin.

use engine::{AdminUpdate, Engine, EngineError};
use teloxide::{
    RequestError,
    dispatching::{HandlerExt, UpdateHandler},
    prelude::*,
};

use crate::{
    ConfigParameters, access,
    commands::AdminCommands,
    state::{Flow, SessionStore},
    ui::{self, Keyboard, Reply},
};

use super::{send_reply, settle};

/// Build the schema for the admin branch: `/admin` plus the admin keyboard.
pub(super) fn schema() -> UpdateHandler<RequestError> {
    dptree::filter_async(admin_gate)
    .branch(
        dptree::entry()
            .filter_command::<AdminCommands>()
            .endpoint(handle_admin_command),
    )
    .branch(dptree::endpoint(handle_admin_message))
}

/// Access filter for the admin branch. A sender who lost the admin flag
/// while an admin flow was pending gets that flow dropped.
async fn admin_gate(msg: Message, cfg: ConfigParameters) -> bool {
    if access::is_admin(&cfg.engine, access::sender_id(msg.from.as_ref())).await {
        return true;
    }
    let chat_id = msg.chat.id;
    if cfg
        .sessions
        .get(chat_id)
        .await
        .flow()
        .is_some_and(Flow::is_admin)
    {
        tracing::info!(chat_id = chat_id.0, "dropping admin flow of a non-admin");
        cfg.sessions.clear(chat_id).await;
    }
    false
}

async fn handle_admin_command(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
    cmd: AdminCommands,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    tracing::debug!(chat_id = chat_id.0, ?cmd, "admin command");

    let reply = match cmd {
        AdminCommands::Admin => open_panel(&cfg.sessions, chat_id).await,
    };
    send_reply(&bot, chat_id, reply).await
}

async fn handle_admin_message(bot: Bot, msg: Message, cfg: ConfigParameters) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    tracing::debug!(chat_id = chat_id.0, "admin message");

    let result = respond(&cfg.engine, &cfg.sessions, chat_id, text).await;
    if let Some(reply) = settle(&cfg.sessions, chat_id, result).await {
        send_reply(&bot, chat_id, reply).await?;
    }
    Ok(())
}

/// `/admin` is only accepted while the chat is idle.
async fn open_panel(sessions: &SessionStore, chat_id: ChatId) -> Reply {
    if sessions.get(chat_id).await.is_idle() {
        Reply::text(ui::ADMIN_ONLY).with_keyboard(Keyboard::Admin)
    } else {
        Reply::text(ui::BUSY)
    }
}

/// React to a text from an admin. `Ok(None)` means the text is not meant for
/// this branch.
async fn respond(
    engine: &Engine,
    sessions: &SessionStore,
    chat_id: ChatId,
    text: &str,
) -> Result<Option<Reply>, EngineError> {
    if text == ui::MAIN_MENU {
        sessions.clear(chat_id).await;
        return Ok(Some(
            Reply::text(ui::RETURN_TO_MENU).with_keyboard(Keyboard::Main),
        ));
    }

    let reply = match sessions.get(chat_id).await.flow() {
        Some(Flow::DeleteUser) => delete_user(engine, sessions, chat_id, text).await?,
        Some(Flow::DeactivateUser) => toggle_user(engine, sessions, chat_id, text).await?,
        Some(Flow::AddAdmin) => change_admin(engine, sessions, chat_id, text, true).await?,
        Some(Flow::RemoveAdmin) => change_admin(engine, sessions, chat_id, text, false).await?,
        Some(Flow::Registration) => return Ok(None),
        None => match text {
            ui::ALL_USERS => list_users(engine).await?,
            ui::DELETE_USER => prompt_id(sessions, chat_id, Flow::DeleteUser).await,
            ui::DEACTIVATE_USER => prompt_id(sessions, chat_id, Flow::DeactivateUser).await,
            ui::ADD_ADMIN => prompt_email(sessions, chat_id, Flow::AddAdmin).await,
            ui::REMOVE_ADMIN => prompt_email(sessions, chat_id, Flow::RemoveAdmin).await,
            _ => return Ok(None),
        },
    };
    Ok(Some(reply))
}

async fn prompt_id(sessions: &SessionStore, chat_id: ChatId, flow: Flow) -> Reply {
    sessions.start(chat_id, flow).await;
    Reply::text(ui::ENTER_ID).with_keyboard(Keyboard::Remove)
}

async fn prompt_email(sessions: &SessionStore, chat_id: ChatId, flow: Flow) -> Reply {
    sessions.start(chat_id, flow).await;
    Reply::text(ui::ENTER_EMAIL)
}

async fn list_users(engine: &Engine) -> Result<Reply, EngineError> {
    let users = engine.users().await?;
    Ok(ui::render_users(&users).map_or_else(|| Reply::text(ui::NOT_FOUND), Reply::text))
}

fn parse_id(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Both outcomes end the flow.
async fn delete_user(
    engine: &Engine,
    sessions: &SessionStore,
    chat_id: ChatId,
    text: &str,
) -> Result<Reply, EngineError> {
    let removed = match parse_id(text) {
        Some(telegram_id) => engine.remove_user(telegram_id).await?,
        None => false,
    };
    sessions.clear(chat_id).await;

    if removed {
        tracing::info!(chat_id = chat_id.0, "admin deleted user {}", text.trim());
    }
    let text = if removed {
        ui::DELETE_COMPLETE
    } else {
        ui::NOT_FOUND
    };
    Ok(Reply::text(text).with_keyboard(Keyboard::Admin))
}

/// Both outcomes end the flow.
async fn toggle_user(
    engine: &Engine,
    sessions: &SessionStore,
    chat_id: ChatId,
    text: &str,
) -> Result<Reply, EngineError> {
    let toggled = match parse_id(text) {
        Some(telegram_id) => engine.toggle_active(telegram_id).await?,
        None => None,
    };
    sessions.clear(chat_id).await;

    let text = match toggled {
        Some(user) if user.is_active => ui::ACTIVATE_COMPLETE,
        Some(_) => ui::DEACTIVATE_COMPLETE,
        None => ui::NOT_FOUND,
    };
    Ok(Reply::text(text).with_keyboard(Keyboard::Admin))
}

/// Lookup misses keep the flow pending so the admin can retype the email.
async fn change_admin(
    engine: &Engine,
    sessions: &SessionStore,
    chat_id: ChatId,
    text: &str,
    is_admin: bool,
) -> Result<Reply, EngineError> {
    let miss = match engine.set_admin(text, is_admin).await? {
        AdminUpdate::Updated(user) => {
            sessions.clear(chat_id).await;
            tracing::info!(
                chat_id = chat_id.0,
                telegram_id = user.telegram_id,
                is_admin,
                "admin changed admin flag"
            );
            let text = if is_admin {
                ui::PROMOTE_COMPLETE
            } else {
                ui::DEMOTE_COMPLETE
            };
            return Ok(Reply::text(text).with_keyboard(Keyboard::Admin));
        }
        AdminUpdate::Unchanged(_) if is_admin => ui::ADMIN_ALREADY,
        AdminUpdate::Unchanged(_) => ui::NOT_ADMIN,
        AdminUpdate::NotFound => ui::NON_USER,
    };

    sessions.record_input(chat_id, text).await;
    Ok(Reply::text(format!("{miss}\n{}", ui::RETRY_EMAIL)))
}
