//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout (config dir):
//!   Windows: %APPDATA%\doc-chat\
//!   macOS:   ~/Library/Application Support/doc-chat/
//!   Linux:   ~/.config/doc-chat/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `preferences.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml` (backend URL, status timings, voice).
    pub settings_file: PathBuf,
    /// Full path to `preferences.toml` (persisted language selection).
    pub preferences_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "doc-chat";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let preferences_file = config_dir.join("preferences.toml");

        Self {
            config_dir,
            settings_file,
            preferences_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_in_the_config_dir() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .preferences_file
            .file_name()
            .is_some_and(|n| n == "preferences.toml"));
        assert_eq!(paths.settings_file.parent(), Some(paths.config_dir.as_path()));
    }
}
