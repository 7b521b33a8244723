use dotenvy::dotenv;
use party_ledger::errors::Result;
use party_ledger::{config, scheduler};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the application settings
    let settings = config::settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load application settings: {}", e))?;
    info!(
        interval_secs = settings.reconciliation.interval_secs,
        "Loaded application settings."
    );

    // 4. Initialize database (DATABASE_URL or the default local file)
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ensured."))
        .inspect_err(|e| error!("Failed to create database tables: {}", e))?;

    // 5. Run the reconciliation scheduler
    scheduler::run_scheduler(db, settings.reconciliation.interval_secs).await?;

    Ok(())
}
