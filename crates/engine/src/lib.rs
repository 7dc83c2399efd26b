//! User store of the registration bot.
//!
//! [`Engine`] wraps the database connection and exposes the operations the
//! bot and the admin CLI perform on the `users` table.

pub use error::EngineError;
pub use ops::{AdminUpdate, Engine, EngineBuilder};
pub use users::{User, normalize_email};

mod error;
mod ops;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
