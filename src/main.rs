#![allow(clippy::result_large_err)]

//! Process entry point: tracing, configuration, database, HTTP server.

use coinvault::{
    api::{AppState, build_router},
    config::{Settings, database},
    errors::Result,
    pricing::CoinGecko,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; non-fatal, env vars can be set externally
    dotenv().ok();

    // 3. Load configuration; fails fast when admin secrets are missing
    let settings = Settings::load()?;
    info!("configuration loaded");

    // 4. Initialize database and create tables
    let db = database::create_connection(&settings.database_url).await?;
    database::create_tables(&db).await?;
    info!(url = %settings.database_url, "database initialized");

    // 5. Build the application and serve
    let oracle = Arc::new(CoinGecko::new(settings.coingecko_url.clone()));
    let bind_addr = settings.bind_addr.clone();
    let state = AppState {
        db,
        oracle,
        settings: Arc::new(settings),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
