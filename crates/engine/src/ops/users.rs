use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, User, normalize_email, users};

use super::Engine;

/// Outcome of a promote/demote request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminUpdate {
    /// The flag was flipped and committed.
    Updated(User),
    /// The user already had the requested flag value.
    Unchanged(User),
    NotFound,
}

impl Engine {
    /// Get a user by telegram id.
    pub async fn user(&self, telegram_id: i64) -> ResultEngine<Option<User>> {
        Ok(users::Entity::find_by_id(telegram_id)
            .one(&self.database)
            .await?
            .map(User::from))
    }

    /// Get a user by email. The lookup is case-insensitive; a malformed email
    /// simply matches nobody.
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .map(User::from))
    }

    /// All users ordered by telegram id.
    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::TelegramId)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::from)
            .collect())
    }

    /// Whether `telegram_id` belongs to an admin. Unknown ids are not admins.
    pub async fn is_admin(&self, telegram_id: i64) -> ResultEngine<bool> {
        Ok(self.user(telegram_id).await?.is_some_and(|u| u.is_admin))
    }

    /// Register a new active, non-admin user.
    pub async fn register_user(&self, telegram_id: i64, email: &str) -> ResultEngine<User> {
        let email = normalize_email(email)?;

        if self.user(telegram_id).await?.is_some() {
            return Err(EngineError::ExistingKey(telegram_id.to_string()));
        }
        if self.user_by_email(&email).await?.is_some() {
            return Err(EngineError::EmailTaken(email));
        }

        let user = User::new(telegram_id, email);
        match users::ActiveModel::from(&user).insert(&self.database).await {
            Ok(model) => {
                tracing::info!(telegram_id, "registered new user");
                Ok(model.into())
            }
            // Lost a race against a concurrent registration with the same email.
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(EngineError::EmailTaken(user.email))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Hard-delete a user. Returns `false` when nothing was deleted.
    pub async fn remove_user(&self, telegram_id: i64) -> ResultEngine<bool> {
        let result = users::Entity::delete_by_id(telegram_id)
            .exec(&self.database)
            .await?;
        if result.rows_affected > 0 {
            tracing::info!(telegram_id, "removed user");
        }
        Ok(result.rows_affected > 0)
    }

    /// Flip the `is_active` flag. Returns the updated user, or `None` when the
    /// id is unknown.
    pub async fn toggle_active(&self, telegram_id: i64) -> ResultEngine<Option<User>> {
        let db_tx = self.database.begin().await?;
        let Some(model) = users::Entity::find_by_id(telegram_id).one(&db_tx).await? else {
            return Ok(None);
        };

        let is_active = !model.is_active;
        let mut active: users::ActiveModel = model.into();
        active.is_active = ActiveValue::Set(is_active);
        let model = active.update(&db_tx).await?;
        db_tx.commit().await?;

        tracing::info!(telegram_id, is_active, "toggled user activity");
        Ok(Some(model.into()))
    }

    /// Set the `is_active` flag to a given value.
    pub async fn set_active(&self, telegram_id: i64, is_active: bool) -> ResultEngine<Option<User>> {
        let Some(model) = users::Entity::find_by_id(telegram_id)
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };
        if model.is_active == is_active {
            return Ok(Some(model.into()));
        }

        let mut active: users::ActiveModel = model.into();
        active.is_active = ActiveValue::Set(is_active);
        let model = active.update(&self.database).await?;

        tracing::info!(telegram_id, is_active, "updated user activity");
        Ok(Some(model.into()))
    }

    /// Grant (`true`) or revoke (`false`) admin rights of the user owning
    /// `email`.
    pub async fn set_admin(&self, email: &str, is_admin: bool) -> ResultEngine<AdminUpdate> {
        let email = email.trim().to_lowercase();
        let Some(model) = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
        else {
            return Ok(AdminUpdate::NotFound);
        };
        if model.is_admin == is_admin {
            return Ok(AdminUpdate::Unchanged(model.into()));
        }

        let telegram_id = model.telegram_id;
        let mut active: users::ActiveModel = model.into();
        active.is_admin = ActiveValue::Set(is_admin);
        let model = active.update(&self.database).await?;

        tracing::info!(telegram_id, is_admin, "updated admin flag");
        Ok(AdminUpdate::Updated(model.into()))
    }

    /// Shorthand for [`Engine::set_admin`] with `true`.
    pub async fn promote_admin(&self, email: &str) -> ResultEngine<AdminUpdate> {
        self.set_admin(email, true).await
    }

    /// Shorthand for [`Engine::set_admin`] with `false`.
    pub async fn demote_admin(&self, email: &str) -> ResultEngine<AdminUpdate> {
        self.set_admin(email, false).await
    }
}
