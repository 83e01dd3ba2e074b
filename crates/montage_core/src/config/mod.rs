//! Configuration management.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//!
//! # Example
//!
//! ```no_run
//! use montage_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/montage.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Output folder: {}", config.settings().paths.output_folder);
//!
//! config.settings_mut().render.preset = "veryfast".to_string();
//! config.update_section(ConfigSection::Render).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, LoggingSettings, PathSettings, RenderSettings, RequestDefaults, Settings,
    ToolSettings,
};
