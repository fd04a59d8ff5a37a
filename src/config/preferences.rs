//! Durable language preferences, restored on launch and written on change.
//!
//! Stored separately from `settings.toml` because the UI rewrites this file
//! whenever either selector changes.  The file carries the two keys the
//! backend request bodies also use:
//!
//! ```toml
//! inputLanguage = "auto-detect"
//! outputLanguage = "English"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AppPaths;

/// Input-language sentinel asking the backend to detect the language.
pub const AUTO_DETECT: &str = "auto-detect";

/// Output language used when nothing (valid) was stored.
pub const DEFAULT_OUTPUT_LANGUAGE: &str = "English";

// ---------------------------------------------------------------------------
// PreferenceError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The output language must name a concrete language.
    #[error("output language cannot be `auto-detect`")]
    AutoDetectOutput,

    #[error("failed to write preferences: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
}

// ---------------------------------------------------------------------------
// LanguagePreferences
// ---------------------------------------------------------------------------

/// The `(inputLanguage, outputLanguage)` pair.
///
/// The output language is never [`AUTO_DETECT`]; [`set_output`](Self::set_output)
/// rejects it and loading repairs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguagePreferences {
    input_language: String,
    output_language: String,
}

impl LanguagePreferences {
    /// Build a pair, substituting the default output for the sentinel.
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        let mut prefs = Self {
            input_language: input.into(),
            output_language: output.into(),
        };
        prefs.repair();
        prefs
    }

    pub fn input_language(&self) -> &str {
        &self.input_language
    }

    pub fn output_language(&self) -> &str {
        &self.output_language
    }

    pub fn set_input(&mut self, name: impl Into<String>) {
        self.input_language = name.into();
    }

    pub fn set_output(&mut self, name: impl Into<String>) -> Result<(), PreferenceError> {
        let name = name.into();
        if name == AUTO_DETECT {
            return Err(PreferenceError::AutoDetectOutput);
        }
        self.output_language = name;
        Ok(())
    }

    fn repair(&mut self) {
        if self.input_language.trim().is_empty() {
            self.input_language = AUTO_DETECT.into();
        }
        if self.output_language == AUTO_DETECT || self.output_language.trim().is_empty() {
            self.output_language = DEFAULT_OUTPUT_LANGUAGE.into();
        }
    }
}

impl Default for LanguagePreferences {
    fn default() -> Self {
        Self {
            input_language: AUTO_DETECT.into(),
            output_language: DEFAULT_OUTPUT_LANGUAGE.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PreferenceStore
// ---------------------------------------------------------------------------

/// Owns the location of `preferences.toml`.
///
/// [`PreferenceStore::in_memory`] never touches the filesystem, which the
/// controller tests rely on.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
}

impl PreferenceStore {
    /// Store backed by the platform-appropriate `preferences.toml`.
    pub fn new() -> Self {
        Self::at(AppPaths::new().preferences_file)
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Restore the stored pair.  Missing or unreadable files yield defaults.
    pub fn load(&self) -> LanguagePreferences {
        let Some(path) = self.path.as_deref() else {
            return LanguagePreferences::default();
        };
        if !path.exists() {
            return LanguagePreferences::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                toml::from_str::<LanguagePreferences>(&content).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(mut prefs) => {
                prefs.repair();
                prefs
            }
            Err(e) => {
                log::warn!("preferences: could not read {} ({e}); using defaults", path.display());
                LanguagePreferences::default()
            }
        }
    }

    /// Write both values.
    pub fn save(&self, prefs: &LanguagePreferences) -> Result<(), PreferenceError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(prefs)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_auto_detect_and_english() {
        let prefs = LanguagePreferences::default();
        assert_eq!(prefs.input_language(), "auto-detect");
        assert_eq!(prefs.output_language(), "English");
    }

    #[test]
    fn output_rejects_auto_detect() {
        let mut prefs = LanguagePreferences::default();
        prefs.set_output("French").unwrap();

        let err = prefs.set_output(AUTO_DETECT).unwrap_err();
        assert!(matches!(err, PreferenceError::AutoDetectOutput));
        assert_eq!(prefs.output_language(), "French");
    }

    #[test]
    fn input_accepts_auto_detect() {
        let mut prefs = LanguagePreferences::new("Spanish", "French");
        prefs.set_input(AUTO_DETECT);
        assert_eq!(prefs.input_language(), AUTO_DETECT);
    }

    #[test]
    fn new_repairs_sentinel_output() {
        let prefs = LanguagePreferences::new("French", AUTO_DETECT);
        assert_eq!(prefs.output_language(), DEFAULT_OUTPUT_LANGUAGE);
    }

    #[test]
    fn store_writes_camel_case_keys() {
        let dir = tempdir().expect("temp dir");
        let store = PreferenceStore::at(dir.path().join("preferences.toml"));

        store.save(&LanguagePreferences::new("Spanish", "French")).unwrap();

        let raw = std::fs::read_to_string(store.path().unwrap()).unwrap();
        assert!(raw.contains("inputLanguage = \"Spanish\""));
        assert!(raw.contains("outputLanguage = \"French\""));
        assert_eq!(store.load(), LanguagePreferences::new("Spanish", "French"));
    }

    #[test]
    fn store_load_missing_file_gives_defaults() {
        let dir = tempdir().expect("temp dir");
        let store = PreferenceStore::at(dir.path().join("absent.toml"));
        assert_eq!(store.load(), LanguagePreferences::default());
    }

    #[test]
    fn store_load_repairs_stored_sentinel_output() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "inputLanguage = \"German\"\noutputLanguage = \"auto-detect\"\n")
            .unwrap();

        let prefs = PreferenceStore::at(&path).load();
        assert_eq!(prefs.input_language(), "German");
        assert_eq!(prefs.output_language(), "English");
    }

    #[test]
    fn store_load_garbage_gives_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "inputLanguage = [").unwrap();

        assert_eq!(PreferenceStore::at(&path).load(), LanguagePreferences::default());
    }

    #[test]
    fn in_memory_store_is_a_no_op() {
        let store = PreferenceStore::in_memory();
        store.save(&LanguagePreferences::new("French", "Spanish")).unwrap();
        assert_eq!(store.load(), LanguagePreferences::default());
    }
}
