//! Application state for the time bucketing API.

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::{Settings, SettingsLoader};
use crate::error::EngineResult;

/// Where batch runs take their settings from.
#[derive(Debug, Clone)]
enum SettingsSource {
    /// Fixed settings, used when no settings file is configured.
    Fixed(Arc<Settings>),
    /// A YAML file re-read at the start of every batch run.
    File(Arc<PathBuf>),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    settings: SettingsSource,
}

impl AppState {
    /// Creates a state whose batch runs all use `settings`.
    pub fn new(pool: SqlitePool, settings: Settings) -> Self {
        Self {
            pool,
            settings: SettingsSource::Fixed(Arc::new(settings)),
        }
    }

    /// Creates a state that loads settings from `path` for each batch run.
    pub fn with_settings_file(pool: SqlitePool, path: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            settings: SettingsSource::File(Arc::new(path.into())),
        }
    }

    /// The database pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Settings for a batch starting now.
    pub fn load_settings(&self) -> EngineResult<Settings> {
        match &self.settings {
            SettingsSource::Fixed(settings) => Ok(settings.as_ref().clone()),
            SettingsSource::File(path) => SettingsLoader::load(path.as_path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::io::Write;

    #[test]
    fn test_app_state_is_clone() {
        // Required for axum state
        fn assert_clone<T: Clone + Send + Sync>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_settings_file_is_read_on_every_load() {
        let pool = crate::storage::connect_in_memory().await.unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "week_start_day: Mon").unwrap();
        let state = AppState::with_settings_file(pool, file.path());
        assert_eq!(state.load_settings().unwrap().week_start_day, chrono::Weekday::Mon);

        let mut rewritten = std::fs::File::create(file.path()).unwrap();
        writeln!(rewritten, "week_start_day: Sun").unwrap();
        drop(rewritten);
        assert_eq!(state.load_settings().unwrap().week_start_day, chrono::Weekday::Sun);
    }

    #[tokio::test]
    async fn test_missing_settings_file_is_an_error() {
        let pool = crate::storage::connect_in_memory().await.unwrap();
        let state = AppState::with_settings_file(pool, "/nonexistent/settings.yaml");
        assert!(matches!(
            state.load_settings(),
            Err(EngineError::ConfigNotFound { .. })
        ));
    }
}
