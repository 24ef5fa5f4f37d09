//! Configuration management for relqa.
//!
//! Settings live in one TOML file with a table per concern. The manager
//! creates it with defaults, fills in missing keys, drops unknown tables
//! and writes atomically (temp file, then rename). `Settings` converts into
//! the immutable engine configs.
//!
//! # Example
//!
//! ```no_run
//! use relqa_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//! config.ensure_dirs_exist().unwrap();
//!
//! let matcher = config.settings().matcher_config();
//! println!("Duration tolerance: {} ms", matcher.duration_tolerance_ms);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, CorrelationSettings, FingerprintSettings, LoggingSettings, MatchingSettings,
    PathSettings, ProbeSettings, Settings, ToolSettings,
};
