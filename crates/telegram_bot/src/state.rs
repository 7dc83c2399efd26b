//! Per-chat conversation state.
//!
//! Chats are idle until a multi-step flow starts; the flow then owns the
//! next text message of that chat. State lives in memory only and is lost on
//! restart.

use std::{collections::HashMap, sync::Arc};

use teloxide::types::ChatId;
use tokio::sync::Mutex;

/// Multi-step interactions the bot knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    DeleteUser,
    DeactivateUser,
    AddAdmin,
    RemoveAdmin,
    Registration,
}

impl Flow {
    /// Flows only admins can start.
    pub(crate) fn is_admin(self) -> bool {
        !matches!(self, Self::Registration)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum ConversationState {
    #[default]
    Idle,
    Awaiting {
        flow: Flow,
        /// Last payload received while the flow stayed pending.
        last_input: Option<String>,
    },
}

impl ConversationState {
    pub(crate) fn awaiting(flow: Flow) -> Self {
        Self::Awaiting {
            flow,
            last_input: None,
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub(crate) fn flow(&self) -> Option<Flow> {
        match self {
            Self::Idle => None,
            Self::Awaiting { flow, .. } => Some(*flow),
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<ChatId, ConversationState>>>,
}

impl SessionStore {
    pub(crate) async fn get(&self, chat_id: ChatId) -> ConversationState {
        let guard = self.inner.lock().await;
        guard.get(&chat_id).cloned().unwrap_or_default()
    }

    /// Start `flow` for the chat, replacing whatever was pending.
    pub(crate) async fn start(&self, chat_id: ChatId, flow: Flow) {
        let mut guard = self.inner.lock().await;
        guard.insert(chat_id, ConversationState::awaiting(flow));
    }

    /// Keep the pending flow and remember the payload it just rejected.
    pub(crate) async fn record_input(&self, chat_id: ChatId, input: &str) {
        let mut guard = self.inner.lock().await;
        if let Some(ConversationState::Awaiting { last_input, .. }) = guard.get_mut(&chat_id) {
            *last_input = Some(input.to_string());
        }
    }

    pub(crate) async fn clear(&self, chat_id: ChatId) {
        let mut guard = self.inner.lock().await;
        guard.remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_chat_is_idle() {
        let sessions = SessionStore::default();
        assert!(sessions.get(ChatId(1)).await.is_idle());
    }

    #[tokio::test]
    async fn start_record_and_clear() {
        let sessions = SessionStore::default();
        let chat = ChatId(1);

        sessions.start(chat, Flow::AddAdmin).await;
        assert_eq!(sessions.get(chat).await.flow(), Some(Flow::AddAdmin));

        sessions.record_input(chat, "bob@example.com").await;
        assert_eq!(
            sessions.get(chat).await,
            ConversationState::Awaiting {
                flow: Flow::AddAdmin,
                last_input: Some("bob@example.com".to_string()),
            }
        );

        sessions.clear(chat).await;
        assert!(sessions.get(chat).await.is_idle());
    }

    #[test]
    fn registration_is_the_only_user_flow() {
        assert!(!Flow::Registration.is_admin());
        for flow in [
            Flow::DeleteUser,
            Flow::DeactivateUser,
            Flow::AddAdmin,
            Flow::RemoveAdmin,
        ] {
            assert!(flow.is_admin());
        }
    }

    #[tokio::test]
    async fn chats_do_not_share_state() {
        let sessions = SessionStore::default();
        sessions.start(ChatId(1), Flow::DeleteUser).await;

        assert!(sessions.get(ChatId(2)).await.is_idle());
        sessions.record_input(ChatId(2), "ignored").await;
        assert!(sessions.get(ChatId(2)).await.is_idle());
    }
}
