use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{AdminUpdate, Engine};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "regbot_admin")]
#[command(about = "Admin utilities for regbot (bootstrap the first admin, manage users)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./regbot.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// List every registered user.
    List,
    /// Grant admin rights.
    Promote(EmailArgs),
    /// Revoke admin rights.
    Demote(EmailArgs),
    Activate(IdArgs),
    Deactivate(IdArgs),
    /// Delete the user record.
    Delete(IdArgs),
}

#[derive(Args, Debug)]
struct EmailArgs {
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct IdArgs {
    #[arg(long)]
    telegram_id: i64,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    let Command::User(User { command }) = cli.command;
    match command {
        UserCommand::List => {
            let users = engine.users().await?;
            if users.is_empty() {
                println!("no users");
            }
            for user in users {
                println!("{user}");
            }
        }
        UserCommand::Promote(args) => report_admin_update(
            &args.email,
            engine.promote_admin(&args.email).await?,
            "is now an admin",
            "is already an admin",
        ),
        UserCommand::Demote(args) => report_admin_update(
            &args.email,
            engine.demote_admin(&args.email).await?,
            "is no longer an admin",
            "is not an admin",
        ),
        UserCommand::Activate(args) => {
            match engine.set_active(args.telegram_id, true).await? {
                Some(user) => println!("activated: {user}"),
                None => not_found(&args.telegram_id.to_string()),
            }
        }
        UserCommand::Deactivate(args) => {
            match engine.set_active(args.telegram_id, false).await? {
                Some(user) => println!("deactivated: {user}"),
                None => not_found(&args.telegram_id.to_string()),
            }
        }
        UserCommand::Delete(args) => {
            if engine.remove_user(args.telegram_id).await? {
                println!("deleted user: {}", args.telegram_id);
            } else {
                not_found(&args.telegram_id.to_string());
            }
        }
    }

    Ok(())
}

fn report_admin_update(email: &str, update: AdminUpdate, updated: &str, unchanged: &str) {
    match update {
        AdminUpdate::Updated(user) => println!("{} {updated}", user.email),
        AdminUpdate::Unchanged(user) => println!("{} {unchanged}", user.email),
        AdminUpdate::NotFound => not_found(email),
    }
}

fn not_found(key: &str) -> ! {
    eprintln!("user not found: {key}");
    std::process::exit(1);
}
