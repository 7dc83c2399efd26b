use engine::EngineError;
use teloxide::{RequestError, dispatching::UpdateHandler, prelude::*};

use crate::{
    state::SessionStore,
    ui::{self, Reply},
};

mod admin;
mod registration;
mod start;

/// Message routing: user commands first, then the registration flow, then
/// the admin branch behind the access filter.
pub(crate) fn schema() -> UpdateHandler<RequestError> {
    Update::filter_message()
        .branch(start::schema())
        .branch(registration::schema())
        .branch(admin::schema())
}

/// Send a reply, split over several messages when it is too long. The
/// keyboard goes with the last one.
pub(crate) async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    let mut chunks = ui::split_message(&reply.text).into_iter().peekable();
    while let Some(chunk) = chunks.next() {
        let request = bot.send_message(chat_id, chunk);
        match reply.keyboard.filter(|_| chunks.peek().is_none()) {
            Some(keyboard) => request.reply_markup(keyboard.markup()).await?,
            None => request.await?,
        };
    }
    Ok(())
}

/// Turn a handler outcome into the reply to send. Store failures are logged,
/// drop the pending flow of the chat and become the fallback message.
pub(crate) async fn settle(
    sessions: &SessionStore,
    chat_id: ChatId,
    result: Result<Option<Reply>, EngineError>,
) -> Option<Reply> {
    match result {
        Ok(reply) => reply,
        Err(err) => {
            tracing::error!(chat_id = chat_id.0, "handler failed: {err}");
            sessions.clear(chat_id).await;
            Some(Reply::fallback())
        }
    }
}
