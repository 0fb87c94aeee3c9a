use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use marketplace_backend::database::{Database, DatabaseConfig};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;
    let database = Database::connect(&DatabaseConfig::new(database_url, 5))
        .await
        .context("Failed to connect to database")?;

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("up");

    match command {
        "up" => {
            info!("Running database migrations...");
            database.migrate().await.context("Failed to apply migrations")?;
            info!("Database migrations completed successfully");
        }
        "status" => show_migration_status(&database).await?,
        _ => {
            eprintln!("Usage: migrate [up|status]");
            eprintln!("  up      - Run all pending migrations (default)");
            eprintln!("  status  - Show applied migrations");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn show_migration_status(database: &Database) -> Result<()> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = '_sqlx_migrations')",
    )
    .fetch_one(database.pool())
    .await
    .context("Failed to inspect schema")?;

    if !table_exists {
        println!("No migrations have been applied");
        return Ok(());
    }

    let applied: Vec<(i64, String, DateTime<Utc>, bool)> = sqlx::query_as(
        "SELECT version, description, installed_on, success FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(database.pool())
    .await
    .context("Failed to read applied migrations")?;

    println!("Applied migrations:");
    for (version, description, installed_on, success) in applied {
        let state = if success { "ok" } else { "FAILED" };
        println!("  {} {} ({}) {}", version, description, installed_on.format("%Y-%m-%d %H:%M:%S"), state);
    }

    Ok(())
}
