//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

/// Where the document-chat backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Origin every endpoint path is appended to, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.  `0` disables the timeout, so a hung
    /// request leaves its component busy until the backend answers.
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// The configured timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            timeout_secs: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// StatusConfig
// ---------------------------------------------------------------------------

/// How long transient success/error messages stay visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub success_clear_secs: u64,
    pub error_clear_secs: u64,
    /// The PDF upload form clears faster than the other forms.
    pub upload_pdf_clear_secs: u64,
    /// Catalog and history load errors.
    pub load_error_clear_secs: u64,
}

impl StatusConfig {
    pub fn success_ttl(&self) -> Duration {
        Duration::from_secs(self.success_clear_secs)
    }

    pub fn error_ttl(&self) -> Duration {
        Duration::from_secs(self.error_clear_secs)
    }

    pub fn load_error_ttl(&self) -> Duration {
        Duration::from_secs(self.load_error_clear_secs)
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            success_clear_secs: 3,
            error_clear_secs: 3,
            upload_pdf_clear_secs: 2,
            load_error_clear_secs: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceConfig
// ---------------------------------------------------------------------------

/// Settings for the continuous voice-chat loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Consecutive request failures tolerated before the loop stops.
    /// `1` stops on the first failure.
    pub max_consecutive_failures: u32,
    /// External program used to play the assistant's audio reply, invoked
    /// as `<program> <args..> <audio-url>`.  `None` skips playback.
    pub player_command: Option<Vec<String>>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 1,
            player_command: None,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial inner window size `(width, height)` in points.
    pub window_size: (f32, f32),
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (720.0, 640.0),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use doc_chat::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// println!("{}", config.backend.base_url);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub status: StatusConfig,
    pub voice: VoiceConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
