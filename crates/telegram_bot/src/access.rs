//! Gate for the admin handlers.

use engine::Engine;
use teloxide::types::User;

/// Telegram user id of the sender as stored in the `users` table.
pub(crate) fn sender_id(user: Option<&User>) -> Option<i64> {
    user.and_then(|u| i64::try_from(u.id.0).ok())
}

/// True only for senders whose user record carries the admin flag. Missing
/// senders, unknown users and store failures are all treated as non-admin.
pub(crate) async fn is_admin(engine: &Engine, sender: Option<i64>) -> bool {
    let Some(telegram_id) = sender else {
        return false;
    };

    match engine.is_admin(telegram_id).await {
        Ok(is_admin) => {
            if !is_admin {
                tracing::debug!(telegram_id, "admin access denied");
            }
            is_admin
        }
        Err(err) => {
            tracing::error!(telegram_id, "admin check failed: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::engine_with_db;

    #[tokio::test]
    async fn missing_sender_is_not_admin() {
        let engine = engine_with_db().await;
        assert!(!is_admin(&engine, None).await);
    }

    #[tokio::test]
    async fn unknown_sender_is_not_admin() {
        let engine = engine_with_db().await;
        assert!(!is_admin(&engine, Some(42)).await);
    }

    #[tokio::test]
    async fn only_flagged_users_pass() {
        let engine = engine_with_db().await;
        engine.register_user(1, "user@example.com").await.unwrap();
        engine.register_user(2, "admin@example.com").await.unwrap();
        engine.promote_admin("admin@example.com").await.unwrap();

        assert!(!is_admin(&engine, Some(1)).await);
        assert!(is_admin(&engine, Some(2)).await);
    }
}
