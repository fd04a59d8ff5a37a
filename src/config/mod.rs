//! Configuration module for the document-chat client.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform config directories, TOML persistence via
//! `AppConfig::load` / `AppConfig::save`, and the durable language
//! preferences written on every selector change.

pub mod paths;
pub mod preferences;
pub mod settings;

pub use paths::AppPaths;
pub use preferences::{
    LanguagePreferences, PreferenceError, PreferenceStore, AUTO_DETECT, DEFAULT_OUTPUT_LANGUAGE,
};
pub use settings::{AppConfig, BackendConfig, StatusConfig, UiConfig, VoiceConfig};
