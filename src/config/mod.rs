//! Settings loading and validation for the time bucketing engine.
//!
//! Settings are read once at batch start and passed explicitly through the
//! call chain.
//!
//! # Example
//!
//! ```no_run
//! use timebucket_engine::config::SettingsLoader;
//!
//! let settings = SettingsLoader::load("./config/settings.yaml").unwrap();
//! println!("Week starts on {:?}", settings.week_start_day);
//! ```

mod loader;
mod types;

pub use loader::SettingsLoader;
pub use types::{MonthBoundaryMode, RoundingRule, Settings, SettingsFile};
