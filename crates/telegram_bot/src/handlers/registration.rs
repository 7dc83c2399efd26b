//! Handler for the registration flow

use engine::{Engine, EngineError};
use teloxide::{RequestError, dispatching::UpdateHandler, prelude::*};

use crate::{
    ConfigParameters,
    access::sender_id,
    state::{ConversationState, Flow, SessionStore},
    ui::{self, Keyboard, Reply},
};

use super::{send_reply, settle, start::help_text};

/// Build the schema for the registration flow and the buttons of the main
/// menu.
pub(super) fn schema() -> UpdateHandler<RequestError> {
    dptree::filter_async(|msg: Message, cfg: ConfigParameters| async move {
        match msg.text() {
            Some(text) => claims(&cfg.sessions.get(msg.chat.id).await, text),
            None => false,
        }
    })
    .endpoint(handle_registration_message)
}

/// Whether this branch owns a text sent in the given state.
fn claims(state: &ConversationState, text: &str) -> bool {
    match state.flow() {
        Some(Flow::Registration) => true,
        Some(_) => false,
        None => text == ui::REGISTER || text == ui::HELP,
    }
}

async fn handle_registration_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    tracing::debug!(chat_id = chat_id.0, "registration message");

    let sender = sender_id(msg.from.as_ref());
    let result = respond(&cfg.engine, &cfg.sessions, chat_id, sender, text).await;
    if let Some(reply) = settle(&cfg.sessions, chat_id, result).await {
        send_reply(&bot, chat_id, reply).await?;
    }
    Ok(())
}

pub(super) async fn respond(
    engine: &Engine,
    sessions: &SessionStore,
    chat_id: ChatId,
    sender: Option<i64>,
    text: &str,
) -> Result<Option<Reply>, EngineError> {
    match sessions.get(chat_id).await.flow() {
        Some(Flow::Registration) if text == ui::MAIN_MENU => {
            sessions.clear(chat_id).await;
            Ok(Some(
                Reply::text(ui::RETURN_TO_MENU).with_keyboard(Keyboard::Main),
            ))
        }
        Some(Flow::Registration) => register_email(engine, sessions, chat_id, sender, text)
            .await
            .map(Some),
        Some(_) => Ok(None),
        None if text == ui::REGISTER => start_registration(engine, sessions, chat_id, sender)
            .await
            .map(Some),
        None if text == ui::HELP => Ok(Some(Reply::text(help_text()))),
        None => Ok(None),
    }
}

/// Ask for the email unless the sender already has an account.
pub(super) async fn start_registration(
    engine: &Engine,
    sessions: &SessionStore,
    chat_id: ChatId,
    sender: Option<i64>,
) -> Result<Reply, EngineError> {
    let Some(telegram_id) = sender else {
        return Ok(Reply::text(ui::UNKNOWN_SENDER));
    };

    if let Some(user) = engine.user(telegram_id).await? {
        let text = if user.is_active {
            ui::ALREADY_REGISTERED
        } else {
            ui::ACCOUNT_DEACTIVATED
        };
        return Ok(Reply::text(text).with_keyboard(Keyboard::Main));
    }

    sessions.start(chat_id, Flow::Registration).await;
    Ok(Reply::text(ui::ENTER_OWN_EMAIL).with_keyboard(Keyboard::Remove))
}

async fn register_email(
    engine: &Engine,
    sessions: &SessionStore,
    chat_id: ChatId,
    sender: Option<i64>,
    text: &str,
) -> Result<Reply, EngineError> {
    let Some(telegram_id) = sender else {
        sessions.clear(chat_id).await;
        return Ok(Reply::text(ui::UNKNOWN_SENDER));
    };

    match engine.register_user(telegram_id, text).await {
        Ok(_) => {
            sessions.clear(chat_id).await;
            Ok(Reply::text(ui::REGISTRATION_COMPLETE).with_keyboard(Keyboard::Main))
        }
        Err(EngineError::InvalidEmail(_)) => {
            sessions.record_input(chat_id, text).await;
            Ok(Reply::text(ui::BAD_EMAIL))
        }
        Err(EngineError::EmailTaken(_)) => {
            sessions.record_input(chat_id, text).await;
            Ok(Reply::text(ui::EMAIL_TAKEN))
        }
        Err(EngineError::ExistingKey(_)) => {
            sessions.clear(chat_id).await;
            Ok(Reply::text(ui::ALREADY_REGISTERED).with_keyboard(Keyboard::Main))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::engine_with_users;

    const CHAT: ChatId = ChatId(200);
    const NEWCOMER: Option<i64> = Some(3);

    async fn send(engine: &Engine, sessions: &SessionStore, text: &str) -> Option<Reply> {
        respond(engine, sessions, CHAT, NEWCOMER, text).await.unwrap()
    }

    #[test]
    fn claims_main_menu_buttons_only_when_idle() {
        let idle = ConversationState::Idle;
        assert!(claims(&idle, ui::REGISTER));
        assert!(claims(&idle, ui::HELP));
        assert!(!claims(&idle, ui::ALL_USERS));

        let registering = ConversationState::awaiting(Flow::Registration);
        assert!(claims(&registering, "anything@example.com"));

        let deleting = ConversationState::awaiting(Flow::DeleteUser);
        assert!(!claims(&deleting, ui::REGISTER));
    }

    #[tokio::test]
    async fn registration_happy_path() {
        let engine = engine_with_users().await;
        let sessions = SessionStore::default();

        let reply = send(&engine, &sessions, ui::REGISTER).await.unwrap();
        assert_eq!(reply.text, ui::ENTER_OWN_EMAIL);
        assert_eq!(sessions.get(CHAT).await.flow(), Some(Flow::Registration));

        let reply = send(&engine, &sessions, "New@Example.com").await.unwrap();
        assert_eq!(reply.text, ui::REGISTRATION_COMPLETE);
        assert!(sessions.get(CHAT).await.is_idle());

        let user = engine.user(3).await.unwrap().unwrap();
        assert_eq!(user.email, "new@example.com");
        assert!(user.is_active);
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn invalid_or_taken_email_keeps_the_flow() {
        let engine = engine_with_users().await;
        let sessions = SessionStore::default();
        send(&engine, &sessions, ui::REGISTER).await;

        let reply = send(&engine, &sessions, "not an email").await.unwrap();
        assert_eq!(reply.text, ui::BAD_EMAIL);
        assert_eq!(
            sessions.get(CHAT).await,
            ConversationState::Awaiting {
                flow: Flow::Registration,
                last_input: Some("not an email".to_string()),
            }
        );

        let reply = send(&engine, &sessions, "user@example.com").await.unwrap();
        assert_eq!(reply.text, ui::EMAIL_TAKEN);
        assert_eq!(sessions.get(CHAT).await.flow(), Some(Flow::Registration));
        assert!(engine.user(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn main_menu_leaves_the_registration() {
        let engine = engine_with_users().await;
        let sessions = SessionStore::default();
        send(&engine, &sessions, ui::REGISTER).await;

        let reply = send(&engine, &sessions, ui::MAIN_MENU).await.unwrap();
        assert_eq!(reply.text, ui::RETURN_TO_MENU);
        assert!(sessions.get(CHAT).await.is_idle());
    }

    #[tokio::test]
    async fn registered_and_deactivated_users_cannot_register_again() {
        let engine = engine_with_users().await;
        let sessions = SessionStore::default();

        let reply = start_registration(&engine, &sessions, CHAT, Some(2))
            .await
            .unwrap();
        assert_eq!(reply.text, ui::ALREADY_REGISTERED);
        assert!(sessions.get(CHAT).await.is_idle());

        engine.set_active(2, false).await.unwrap();
        let reply = start_registration(&engine, &sessions, CHAT, Some(2))
            .await
            .unwrap();
        assert_eq!(reply.text, ui::ACCOUNT_DEACTIVATED);
    }

    #[tokio::test]
    async fn unidentified_sender_cannot_register() {
        let engine = engine_with_users().await;
        let sessions = SessionStore::default();

        let reply = start_registration(&engine, &sessions, CHAT, None)
            .await
            .unwrap();
        assert_eq!(reply.text, ui::UNKNOWN_SENDER);
        assert!(sessions.get(CHAT).await.is_idle());
    }

    #[tokio::test]
    async fn other_flows_are_left_to_the_admin_branch() {
        let engine = engine_with_users().await;
        let sessions = SessionStore::default();
        sessions.start(CHAT, Flow::AddAdmin).await;

        assert_eq!(send(&engine, &sessions, "user@example.com").await, None);
    }
}
