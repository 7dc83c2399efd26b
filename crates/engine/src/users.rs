//! User primitives.
//!
//! A `User` is identified by its telegram id and owns a unique email. The
//! `is_admin` flag gates the administrative handlers of the bot and
//! `is_active` is toggled by admins without deleting the record.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub telegram_id: i64,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub registered_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered user: active and without admin rights.
    pub fn new(telegram_id: i64, email: String) -> Self {
        Self {
            telegram_id,
            email,
            is_admin: false,
            is_active: true,
            registered_at: Utc::now(),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} • {} • admin: {} • active: {}",
            self.telegram_id,
            self.email,
            yes_no(self.is_admin),
            yes_no(self.is_active)
        )
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub telegram_id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub registered_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            telegram_id: ActiveValue::Set(user.telegram_id),
            email: ActiveValue::Set(user.email.clone()),
            is_admin: ActiveValue::Set(user.is_admin),
            is_active: ActiveValue::Set(user.is_active),
            registered_at: ActiveValue::Set(user.registered_at),
        }
    }
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            telegram_id: model.telegram_id,
            email: model.email,
            is_admin: model.is_admin,
            is_active: model.is_active,
            registered_at: model.registered_at,
        }
    }
}

/// Trim and lowercase an email, rejecting anything that is not shaped like
/// `local@domain.tld`.
pub fn normalize_email(raw: &str) -> ResultEngine<String> {
    let email = raw.trim().to_lowercase();
    let invalid = || EngineError::InvalidEmail(raw.trim().to_string());

    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(email)
}
