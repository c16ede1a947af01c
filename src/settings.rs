//! Persistent key-value settings
//!
//! A small INI-like store: one `key=value` per line, `#` and `;` comments,
//! blank lines and `[section]` headers are skipped. The store is an explicit
//! value owned by the caller; the analysis core never reads it.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SETTINGS_FILE: &str = "loglens.ini";
pub const SETTINGS_PATH_ENV: &str = "LOGLENS_CONFIG";

pub const KEY_INPUT_PATH: &str = "input_path";
pub const KEY_CUSTOM_PATTERN: &str = "custom_pattern";
pub const KEY_USE_CUSTOM_PARSER: &str = "use_custom_parser";
pub const KEY_THREADS: &str = "threads";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// `$LOGLENS_CONFIG` if set, otherwise `loglens.ini` in the working directory
    pub fn default_path() -> PathBuf {
        env::var_os(SETTINGS_PATH_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    /// Load settings from `path`. A missing file gives empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file");
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings = Self::parse(&content);
        tracing::debug!(path = %path.display(), keys = settings.values.len(), "loaded settings");
        Ok(settings)
    }

    pub fn parse(content: &str) -> Self {
        let mut values = BTreeMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if !key.is_empty() {
                    values.insert(key.to_string(), value.trim().to_string());
                }
            }
        }
        Self { values }
    }

    /// Serialized form, keys in sorted order
    pub fn to_ini_string(&self) -> String {
        let mut output = String::new();
        for (key, value) in &self.values {
            output.push_str(&format!("{}={}\n", key, value));
        }
        output
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_ini_string())
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved settings");
        Ok(())
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// `None` when the key is missing or not an integer
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get_string(key)?.parse().ok()
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.set_string(key, value.to_string());
    }

    /// `"1"` and `"true"` are true, anything else present is false
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_string(key).map(|v| v == "1" || v == "true")
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_string(key, if value { "1" } else { "0" });
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
