//! TOML-based layout configuration.
//!
//! Stores the settings a day column needs to build its layout:
//! - Visible minute range of the day
//! - Pixel density and minimum event box size (which together yield the
//!   minimum displayed duration)
//! - Default timezone
//! - Debounce delay for coalescing occurrence additions
//!
//! Configuration is read from `~/.config/dayview/config.toml` when present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ValidationError};

/// Minutes in a day; the largest allowed view end minute.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Upper bound on the minimum displayed duration of an occurrence.
pub const MAX_MINIMUM_DURATION_MINUTES: i64 = MINUTES_PER_DAY as i64;

/// View configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// First visible minute of the day.
    #[serde(default)]
    pub day_start_minute: u32,
    /// Last visible minute of the day (exclusive).
    #[serde(default = "default_day_end_minute")]
    pub day_end_minute: u32,
    /// Smallest box size a renderer can draw legibly, in pixels.
    #[serde(default = "default_min_event_size_px")]
    pub min_event_size_px: f64,
    #[serde(default = "default_pixels_per_minute")]
    pub pixels_per_minute: f64,
    /// IANA timezone name used when the caller does not supply one.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Update scheduling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Delay before a burst of additions is laid out, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Layout configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

// Default functions

fn default_day_end_minute() -> u32 {
    MINUTES_PER_DAY
}

fn default_min_event_size_px() -> f64 {
    16.0
}

fn default_pixels_per_minute() -> f64 {
    0.6
}

fn default_timezone() -> String {
    "UTC".into()
}

fn default_debounce_ms() -> u64 {
    5
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            day_start_minute: 0,
            day_end_minute: default_day_end_minute(),
            min_event_size_px: default_min_event_size_px(),
            pixels_per_minute: default_pixels_per_minute(),
            timezone: default_timezone(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl ViewConfig {
    /// Parse the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a known IANA zone.
    pub fn tz(&self) -> Result<chrono_tz::Tz, ValidationError> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| ValidationError::UnknownTimezone(self.timezone.clone()))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Default location of the config file.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("dayview")
            .join("config.toml")
    }

    /// Load from the default location, or return defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// holds invalid values.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or holds invalid
    /// values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Render as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let view = &self.view;
        if view.day_end_minute > MINUTES_PER_DAY {
            return Err(invalid(
                "view.day_end_minute",
                format!("must be at most {MINUTES_PER_DAY}"),
            ));
        }
        if view.day_start_minute >= view.day_end_minute {
            return Err(invalid(
                "view.day_start_minute",
                "must be less than view.day_end_minute".into(),
            ));
        }
        if !view.pixels_per_minute.is_finite() || view.pixels_per_minute <= 0.0 {
            return Err(invalid(
                "view.pixels_per_minute",
                "must be a positive number".into(),
            ));
        }
        if !view.min_event_size_px.is_finite() || view.min_event_size_px < 0.0 {
            return Err(invalid(
                "view.min_event_size_px",
                "must not be negative".into(),
            ));
        }
        if view.min_event_size_px / view.pixels_per_minute > MAX_MINIMUM_DURATION_MINUTES as f64 {
            return Err(invalid(
                "view.min_event_size_px",
                format!(
                    "must not exceed {MAX_MINIMUM_DURATION_MINUTES} minutes at view.pixels_per_minute"
                ),
            ));
        }
        view.tz()
            .map_err(|e| invalid("view.timezone", e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

fn invalid(key: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.into(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.view.day_start_minute, 0);
        assert_eq!(cfg.view.day_end_minute, 1440);
        assert_eq!(cfg.scheduler.debounce_ms, 5);
        assert_eq!(cfg.view.timezone, "UTC");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [view]
            day_start_minute = 480
            timezone = "Europe/Berlin"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.view.day_start_minute, 480);
        assert_eq!(cfg.view.day_end_minute, 1440);
        assert_eq!(cfg.view.tz().unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(cfg.scheduler.debounce_ms, 5);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = Config::from_toml_str(
            r#"
            [view]
            day_start_minute = 600
            day_end_minute = 540
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "view.day_start_minute"));
    }

    #[test]
    fn test_rejects_oversized_minimum_event() {
        let err = Config::from_toml_str("[view]\nmin_event_size_px = 1e12\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "view.min_event_size_px"));

        let one_day = "[view]\nmin_event_size_px = 1440.0\npixels_per_minute = 1.0\n";
        assert!(Config::from_toml_str(one_day).is_ok());
    }

    #[test]
    fn test_rejects_unknown_timezone() {
        let err = Config::from_toml_str("[view]\ntimezone = \"Mars/Olympus\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "view.timezone"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            Config::from_toml_str("[view\n"),
            Err(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scheduler]\ndebounce_ms = 40").unwrap();
        let cfg = Config::load_from(file.path()).unwrap();
        assert_eq!(cfg.scheduler.debounce_ms, 40);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/dayview.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }

    #[test]
    fn test_get_by_path() {
        let cfg = Config::default();
        assert_eq!(cfg.get("view.timezone").as_deref(), Some("UTC"));
        assert_eq!(cfg.get("scheduler.debounce_ms").as_deref(), Some("5"));
        assert!(cfg.get("view.nope").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn test_toml_roundtrip_keeps_values() {
        let mut cfg = Config::default();
        cfg.view.day_start_minute = 420;
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), cfg);
    }
}
