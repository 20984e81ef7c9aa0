use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Connection pool for the worker. Batches run sequentially, so a handful
/// of connections covers the claim/read/insert traffic of one run.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting worker to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url)
        .await?;

    info!("Worker database pool ready");
    Ok(pool)
}
