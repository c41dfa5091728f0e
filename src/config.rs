//! Toolkit configuration.
//!
//! Stored as JSON at `~/.config/softgui/config.json`. `GuiConfig::load` never
//! fails (missing or broken files fall back to defaults); `load_from` is the
//! strict variant for callers that want to see the error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Result;

/// Default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("softgui")
        .join("config.json")
}

/// Settings read once when a [`Context`](crate::Context) is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiConfig {
    /// Main loop rate in Hz. Values outside 1..=1000 fall back to 60.
    #[serde(default = "default_update_rate")]
    pub update_rate: f64,
    /// 0 = never report the frame clock, 1 = report on clean exit, 2 = always.
    #[serde(default = "default_log_clock")]
    pub log_clock_at_quit: u8,
    /// Directory searched for `<name>.png` font atlases.
    #[serde(default = "default_font_dir")]
    pub font_dir: PathBuf,
    /// Font loaded on demand when nothing has been installed yet.
    #[serde(default = "default_font")]
    pub default_font: String,
    /// Text encoding used by editable widgets.
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Fail widget creation when the construction args belong to another type.
    #[serde(default)]
    pub strict_args: bool,
}

fn default_update_rate() -> f64 { 60.0 }
fn default_log_clock() -> u8 { 1 }
fn default_font_dir() -> PathBuf { PathBuf::from("fonts") }
fn default_font() -> String { "font_bold_g0_8x16".into() }
fn default_encoding() -> String { "utf8".into() }

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            update_rate: default_update_rate(),
            log_clock_at_quit: default_log_clock(),
            font_dir: default_font_dir(),
            default_font: default_font(),
            encoding: default_encoding(),
            strict_args: false,
        }
    }
}

impl GuiConfig {
    /// Load from the default path, falling back to defaults on any error.
    pub fn load() -> Self {
        match Self::load_from(&default_path()) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Persist as pretty JSON, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Effective loop rate after range checking.
    pub fn effective_rate(&self) -> f64 {
        if (1.0..=1000.0).contains(&self.update_rate) {
            self.update_rate
        } else {
            default_update_rate()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: GuiConfig = serde_json::from_str(r#"{ "update_rate": 30.0 }"#).unwrap();
        assert_eq!(config.update_rate, 30.0);
        assert_eq!(config.encoding, "utf8");
        assert!(!config.strict_args);
    }

    #[test]
    fn test_effective_rate_clamps() {
        let mut config = GuiConfig::default();
        config.update_rate = 0.5;
        assert_eq!(config.effective_rate(), 60.0);
        config.update_rate = 5000.0;
        assert_eq!(config.effective_rate(), 60.0);
        config.update_rate = 120.0;
        assert_eq!(config.effective_rate(), 120.0);
    }
}
