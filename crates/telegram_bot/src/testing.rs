use engine::Engine;
use migration::MigratorTrait;
use sea_orm::Database;

pub(crate) async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

/// An engine with one admin (id 1, `admin@example.com`) and one regular user
/// (id 2, `user@example.com`).
pub(crate) async fn engine_with_users() -> Engine {
    let engine = engine_with_db().await;
    engine.register_user(1, "admin@example.com").await.unwrap();
    engine.register_user(2, "user@example.com").await.unwrap();
    engine.promote_admin("admin@example.com").await.unwrap();
    engine
}
