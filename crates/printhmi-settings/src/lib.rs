//! printhmi Settings Crate
//!
//! Handles the configuration file: model, defaults, loading and validation.

pub mod config;
pub mod error;

pub use config::{Config, HmiSettings, MoonrakerSettings, KNOWN_UIS};
pub use error::{ConfigError, SettingsError, SettingsResult};
