//! HTTP server for the time bucketing engine.

use std::env;
use std::path::Path;

use timebucket_engine::api::{AppState, create_router};
use timebucket_engine::config::{Settings, SettingsLoader};
use timebucket_engine::storage;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_DATABASE_URL: &str = "sqlite://timebucket.db";
const DEFAULT_SETTINGS_PATH: &str = "./config/settings.yaml";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
    let settings_path = env::var("SETTINGS_PATH").unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.into());
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());

    let pool = storage::connect(&database_url).await?;
    let state = if Path::new(&settings_path).exists() {
        // Validate now; each batch run reads the file again.
        let settings = SettingsLoader::load(&settings_path)?;
        info!(
            path = %settings_path,
            timezone = %settings.timezone,
            week_start = ?settings.week_start_day,
            mode = ?settings.month_boundary_mode,
            "Settings loaded"
        );
        AppState::with_settings_file(pool, &settings_path)
    } else {
        warn!(path = %settings_path, "Settings file not found, using defaults");
        AppState::new(pool, Settings::default())
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(address = %bind_addr, "Server listening");
    axum::serve(listener, router).await?;

    Ok(())
}
