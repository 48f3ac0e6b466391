//! Server: loads config from env (and `.env`), optionally bootstraps the database, mounts all routes.

use customer_api::{app, ensure_database_exists, ensure_tables, AppState, PgStore, ServerConfig};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("customer_api=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    if config.bootstrap {
        ensure_database_exists(&config.database_url).await?;
    }
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await?;
    if config.bootstrap {
        ensure_tables(&pool, &config.schema).await?;
    }

    let state = AppState::new(PgStore::new(pool, config.schema.clone()));
    let router = app(state, config.max_body_bytes);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        max_connections = config.max_connections,
        schema = %config.schema,
        "listening"
    );
    axum::serve(listener, router).await?;
    Ok(())
}
