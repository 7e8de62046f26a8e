// src/main.rs

use quiz_engine::{config::Config, db, telemetry};

/// Prepares the database the engine runs against: connects and applies migrations.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let _guard = telemetry::init(&config);

    let pool = db::connect(&config).await?;
    tracing::info!("Database connected...");

    db::migrate(&pool).await?;
    pool.close().await;

    Ok(())
}
