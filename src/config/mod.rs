//! Settings management for ClipDrop
//!
//! Settings are read from a JSON (or TOML) file. Every field is optional and
//! falls back to its default. [`Settings::load_or_default`] tolerates a bad
//! file: an unparsable one yields defaults, and out-of-range fields are reset
//! one by one while the rest of the file is kept.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the settings file location
pub const CONFIG_ENV: &str = "CLIPDROP_CONFIG";

const MAX_CLIPS_LIMIT: usize = 10_000;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading or writing a settings file
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML settings: {0}")]
    Toml(#[from] toml::de::Error),

    /// Validation error
    #[error("Settings validation failed: {0}")]
    Validation(String),
}

/// What to do when the persisted clip index cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptIndexPolicy {
    /// Refuse to open the store and leave the file untouched
    #[default]
    Fail,
    /// Move the corrupt file aside and start with an empty history
    Backup,
}

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Number of clips to retain
    #[serde(default = "default_max_clips")]
    pub max_clips: usize,

    /// Preview window geometry
    #[serde(default)]
    pub window: WindowSettings,

    /// Directory holding the clip index and image blobs
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Handling of an unparsable clip index
    #[serde(default)]
    pub corrupt_index: CorruptIndexPolicy,
}

/// Preview window geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Window alpha in `(0.0, 1.0]`
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

// Default value functions
fn default_max_clips() -> usize {
    50
}

fn default_width() -> u32 {
    700
}

fn default_height() -> u32 {
    600
}

fn default_opacity() -> f64 {
    0.95
}

fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("clipdrop").join("clips"))
        .unwrap_or_else(|| PathBuf::from("~/.local/share/clipdrop/clips"))
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            opacity: default_opacity(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_clips: default_max_clips(),
            window: WindowSettings::default(),
            store_dir: default_store_dir(),
            log_level: default_log_level(),
            corrupt_index: CorruptIndexPolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings strictly
    ///
    /// Checks in order:
    /// 1. The explicit path, if given
    /// 2. Path from the CLIPDROP_CONFIG environment variable
    /// 3. ~/.config/clipdrop/settings.json
    /// 4. Defaults if no file exists
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::find_config_path(explicit) {
            Some(path) => Self::load_from_path(&path),
            None => {
                let mut settings = Self::default();
                settings.expand_paths();
                Ok(settings)
            }
        }
    }

    /// Load settings, falling back to defaults when the file is malformed
    ///
    /// The error that forced the fallback is handed back so the caller can
    /// report it once logging is up.
    pub fn load_or_default(explicit: Option<&Path>) -> (Self, Option<ConfigError>) {
        let parsed = match Self::find_config_path(explicit) {
            Some(path) => Self::parse_path(&path),
            None => Ok(Self::default()),
        };

        let mut settings = match parsed {
            Ok(settings) => settings,
            Err(e) => {
                let mut settings = Self::default();
                settings.expand_paths();
                return (settings, Some(e));
            }
        };

        settings.expand_paths();
        match settings.validate() {
            Ok(()) => (settings, None),
            Err(e) => {
                settings.reset_invalid();
                (settings, Some(e))
            }
        }
    }

    /// Load settings from a specific path, picking the format by extension
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::parse_path(path)?.finish()
    }

    fn parse_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(toml::from_str(&contents)?),
            _ => Ok(serde_json::from_str(&contents)?),
        }
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.finish()
    }

    /// Parse settings from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(toml_str)?;
        settings.finish()
    }

    fn finish(mut self) -> Result<Self, ConfigError> {
        self.expand_paths();
        self.validate()?;
        Ok(self)
    }

    /// Default settings file location
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("clipdrop").join("settings.json"))
    }

    fn find_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            // An explicit path is always honored, so a typo surfaces as an error
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        Self::default_config_path().filter(|p| p.exists())
    }

    fn expand_paths(&mut self) {
        self.store_dir = expand_path(&self.store_dir);
    }

    /// Validate settings values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_clips < 1 {
            return Err(ConfigError::Validation(
                "max_clips must be at least 1".to_string(),
            ));
        }
        if self.max_clips > MAX_CLIPS_LIMIT {
            return Err(ConfigError::Validation(format!(
                "max_clips must not exceed {}",
                MAX_CLIPS_LIMIT
            )));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Validation(
                "window width and height must be positive".to_string(),
            ));
        }
        if !(self.window.opacity > 0.0 && self.window.opacity <= 1.0) {
            return Err(ConfigError::Validation(
                "window opacity must be in (0.0, 1.0]".to_string(),
            ));
        }

        Ok(())
    }

    /// Replace each out-of-range field with its default
    fn reset_invalid(&mut self) {
        if !(1..=MAX_CLIPS_LIMIT).contains(&self.max_clips) {
            self.max_clips = default_max_clips();
        }
        if self.window.width == 0 {
            self.window.width = default_width();
        }
        if self.window.height == 0 {
            self.window.height = default_height();
        }
        if !(self.window.opacity > 0.0 && self.window.opacity <= 1.0) {
            self.window.opacity = default_opacity();
        }
    }

    /// Path of the persisted clip index
    pub fn index_path(&self) -> PathBuf {
        self.store_dir.join(crate::history::INDEX_FILE)
    }

    /// Generate an example settings document
    pub fn generate_example() -> String {
        let example = serde_json::json!({
            "max_clips": default_max_clips(),
            "window": {
                "width": default_width(),
                "height": default_height(),
                "opacity": default_opacity(),
            },
            "log_level": default_log_level(),
            "corrupt_index": "fail",
        });

        // A json! value with plain fields always serializes
        serde_json::to_string_pretty(&example).unwrap_or_default()
    }

    /// Write the example settings file, refusing to clobber without `force`
    pub fn write_example(path: &Path, force: bool) -> Result<(), ConfigError> {
        if !force && path.exists() {
            return Err(ConfigError::Validation(
                "Settings file already exists. Use --force to overwrite.".to_string(),
            ));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::generate_example())?;
        Ok(())
    }
}

/// Expand tilde in path
fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(path_str.as_ref());
    PathBuf::from(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.max_clips, 50);
        assert_eq!(settings.window.width, 700);
        assert_eq!(settings.window.height, 600);
        assert_eq!(settings.window.opacity, 0.95);
        assert_eq!(settings.corrupt_index, CorruptIndexPolicy::Fail);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "max_clips": 5 }"#).unwrap();
        assert_eq!(settings.max_clips, 5);
        assert_eq!(settings.window, WindowSettings::default());
    }

    #[test]
    fn test_window_section() {
        let json = r#"{ "window": { "width": 400, "opacity": 0.5 } }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.window.width, 400);
        assert_eq!(settings.window.height, 600);
        assert_eq!(settings.window.opacity, 0.5);
    }

    #[test]
    fn test_load_from_toml() {
        let toml_str = r#"
            max_clips = 12
            store_dir = "/tmp/clipdrop-test"
            corrupt_index = "backup"

            [window]
            height = 300
        "#;

        let settings = Settings::from_toml(toml_str).unwrap();
        assert_eq!(settings.max_clips, 12);
        assert_eq!(settings.store_dir, PathBuf::from("/tmp/clipdrop-test"));
        assert_eq!(settings.corrupt_index, CorruptIndexPolicy::Backup);
        assert_eq!(settings.window.height, 300);
    }

    #[test]
    fn test_validation_max_clips() {
        assert!(Settings::from_json(r#"{ "max_clips": 0 }"#).is_err());
        assert!(Settings::from_json(r#"{ "max_clips": 20000 }"#).is_err());
    }

    #[test]
    fn test_validation_opacity() {
        assert!(Settings::from_json(r#"{ "window": { "opacity": 0.0 } }"#).is_err());
        assert!(Settings::from_json(r#"{ "window": { "opacity": 1.5 } }"#).is_err());
    }

    #[test]
    fn test_tilde_expansion() {
        let settings = Settings::from_json(r#"{ "store_dir": "~/clips" }"#).unwrap();
        assert!(!settings.store_dir.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let (settings, err) = Settings::load_or_default(Some(&path));
        assert!(matches!(err, Some(ConfigError::Json(_))));
        assert_eq!(settings.max_clips, 50);
    }

    #[test]
    fn test_invalid_field_keeps_rest_of_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        let store_dir = temp_dir.path().join("my-clips");
        let json = serde_json::json!({
            "max_clips": 7,
            "store_dir": store_dir,
            "window": { "width": 300, "opacity": 1.5 },
        });
        std::fs::write(&path, json.to_string()).unwrap();

        let (settings, err) = Settings::load_or_default(Some(&path));
        assert!(matches!(err, Some(ConfigError::Validation(_))));
        assert_eq!(settings.store_dir, store_dir);
        assert_eq!(settings.max_clips, 7);
        assert_eq!(settings.window.width, 300);
        assert_eq!(settings.window.opacity, 0.95);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_strict_load_rejects_invalid_field() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "max_clips": 0 }"#).unwrap();

        assert!(matches!(
            Settings::load(Some(&path)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_example_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");

        Settings::write_example(&path, false).unwrap();
        assert!(Settings::write_example(&path, false).is_err());
        Settings::write_example(&path, true).unwrap();

        let loaded = Settings::load_from_path(&path).unwrap();
        assert_eq!(loaded.max_clips, 50);
    }
}
