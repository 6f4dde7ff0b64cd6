//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! luxe-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `LUXE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use luxe_commerce::config::CommerceConfig;
use luxe_commerce::db;

/// Run the commerce migrations.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CommerceConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running commerce migrations...");
    sqlx::migrate!("../commerce/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
