//! Persisted key/value settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::paths::ensure_parent_dir;

/// Header written at the top of every saved settings file.
const FILE_HEADER: &str = "# phono settings\n# Automatically saved; values are numbers or yes/no\n\n";

/// Flat map of control names to stored text values.
///
/// Values are kept as text so that a hand-edited file survives a load/save
/// cycle untouched; interpretation happens on read.
///
/// # TOML Format
///
/// ```toml
/// "Gain (dB)" = "3.0"
/// "Subsonic Filter" = "2"
/// "RIAA Enable" = "yes"
/// ```
///
/// Bare TOML numbers and booleans are accepted on load as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

/// Interprets a stored value.
///
/// `yes`/`true` read as 1 and `no`/`false` as 0, case-insensitively.
/// Anything else must parse as a number in full.
pub fn parse_value(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("yes") || raw.eq_ignore_ascii_case("true") {
        return Some(1.0);
    }
    if raw.eq_ignore_ascii_case("no") || raw.eq_ignore_ascii_case("false") {
        return Some(0.0);
    }
    raw.parse::<f32>().ok()
}

impl Settings {
    /// Create empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Raw stored text for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Store raw text for `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove `key`, returning its previous text.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Store a number using its shortest exact text form.
    pub fn set_f32(&mut self, key: impl Into<String>, value: f32) {
        self.set(key, value.to_string());
    }

    /// Store a toggle as `yes`/`no`.
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.set(key, if value { "yes" } else { "no" });
    }

    /// Strict numeric read: `Ok(None)` when absent, an error when malformed.
    pub fn try_get_f32(&self, key: &str) -> Result<Option<f32>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => parse_value(raw)
                .map(Some)
                .ok_or_else(|| ConfigError::invalid_value(key, raw)),
        }
    }

    /// Numeric read with fallback.
    ///
    /// Absent keys return `default` silently; malformed values return
    /// `default` with a warning.
    pub fn get_f32(&self, key: &str, default: f32) -> f32 {
        match self.try_get_f32(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                tracing::warn!(%err, default, "using default");
                default
            }
        }
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(text)?;
        let mut settings = Self::new();
        for (key, value) in table {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => String::from(if b { "yes" } else { "no" }),
                other => {
                    tracing::warn!(key = %key, kind = other.type_str(), "ignoring non-scalar setting");
                    continue;
                }
            };
            settings.values.insert(key, text);
        }
        Ok(settings)
    }

    /// Render settings as TOML with a comment header.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let body = toml::to_string(self)?;
        Ok(format!("{FILE_HEADER}{body}"))
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let settings = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), keys = settings.len(), "settings loaded");
        Ok(settings)
    }

    /// Load settings, treating a missing file as empty settings.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::new());
        }
        Self::load(path)
    }

    /// Save settings to a TOML file, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::info!(path = %path.display(), keys = self.len(), "settings saved");
        Ok(())
    }
}
