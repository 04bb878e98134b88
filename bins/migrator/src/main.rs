//! Database migration runner for Tally.
//!
//! Reads the database URL from the regular configuration
//! (`TALLY__DATABASE__URL`, `config/*.toml`).
//!
//! Usage:
//!   migrator [up]    - Run all pending migrations
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!   migrator reset   - Rollback all migrations

use anyhow::{Context, bail};
use sea_orm_migration::MigratorTrait;
use tally_db::{connect, migration::Migrator};
use tally_shared::AppConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sea_orm_migration=info,migrator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    match command.as_str() {
        "up" => Migrator::up(&db, None).await?,
        "down" => Migrator::down(&db, Some(1)).await?,
        "status" => Migrator::status(&db).await?,
        "fresh" => Migrator::fresh(&db).await?,
        "reset" => Migrator::reset(&db).await?,
        other => bail!("unknown command `{other}`; expected up, down, status, fresh, or reset"),
    }

    info!(command = %command, "migration command finished");
    Ok(())
}
