//! Applies the regbot schema to the database in `DATABASE_URL`.
use sea_orm::Database;
use sea_orm_migration::prelude::*;

/// Same file the regbot app opens with its default settings.
const DEFAULT_DATABASE_URL: &str = "sqlite:./regbot.db?mode=rwc";

const USAGE: &str = "Usage: migration [up|down|fresh|status|help]

Runs the regbot users schema migrations (default: up) against DATABASE_URL,
or sqlite:./regbot.db?mode=rwc when it is unset.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cmd = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    if matches!(cmd.as_str(), "help" | "-h" | "--help") {
        println!("{USAGE}");
        return Ok(());
    }

    let db_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        other => {
            eprintln!("unknown command: {other}\n\n{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}
