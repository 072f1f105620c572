//! Engine configuration loaded from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pointer: PointerConfig,
    #[serde(default)]
    pub touch: TouchConfig,
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

impl Config {
    /// Load configuration from the given path, or the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| EngineError::Config(format!("failed to read config: {e}")))?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| EngineError::Config(format!("failed to parse config: {e}")))?;
            info!(path = %config_path.display(), "loaded config");
            config
        } else {
            info!("no config file found, using defaults");
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), EngineError> {
        let ratio = self.pointer.edge_release_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(EngineError::Config(format!(
                "pointer.edge_release_ratio must be in (0, 1], got {ratio}"
            )));
        }
        if self.pointer.frame_interval_ms == 0 {
            return Err(EngineError::Config(
                "pointer.frame_interval_ms must be non-zero".to_string(),
            ));
        }
        non_negative("pointer.edge_buffer_px", self.pointer.edge_buffer_px)?;
        non_negative("pointer.tap_max_travel_px", self.pointer.tap_max_travel_px)?;

        let touch = &self.touch;
        for (name, value) in [
            ("touch.move_base", touch.move_base),
            ("touch.move_min", touch.move_min),
            ("touch.move_max", touch.move_max),
            ("touch.scroll_factor", touch.scroll_factor),
            ("touch.scroll_min", touch.scroll_min),
            ("touch.scroll_max", touch.scroll_max),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::Config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        ordered("touch.move", touch.move_min, touch.move_max)?;
        ordered("touch.scroll", touch.scroll_min, touch.scroll_max)?;
        non_negative("touch.multi_tap_travel_px", touch.multi_tap_travel_px)?;

        if self.pointer.tap_max_ms == 0 || touch.multi_tap_ms == 0 {
            return Err(EngineError::Config(
                "pointer.tap_max_ms and touch.multi_tap_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::Config(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

fn ordered(name: &str, min: f64, max: f64) -> Result<(), EngineError> {
    if min <= max {
        Ok(())
    } else {
        Err(EngineError::Config(format!(
            "{name}_min ({min}) must not exceed {name}_max ({max})"
        )))
    }
}

/// Host connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            log_level: default_log_level(),
        }
    }
}

/// Mouse, edge release, and frame coalescing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerConfig {
    /// Fraction of the screen dimension to push past an edge before release.
    #[serde(default = "default_edge_release_ratio")]
    pub edge_release_ratio: f64,
    #[serde(default = "default_edge_buffer_px")]
    pub edge_buffer_px: f64,
    #[serde(default = "default_edge_release_delay_ms")]
    pub edge_release_delay_ms: u64,
    #[serde(default = "default_double_click_ms")]
    pub double_click_ms: u64,
    #[serde(default = "default_tap_max_ms")]
    pub tap_max_ms: u64,
    #[serde(default = "default_tap_max_travel_px")]
    pub tap_max_travel_px: f64,
    /// Length of one coalescing frame.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            edge_release_ratio: default_edge_release_ratio(),
            edge_buffer_px: default_edge_buffer_px(),
            edge_release_delay_ms: default_edge_release_delay_ms(),
            double_click_ms: default_double_click_ms(),
            tap_max_ms: default_tap_max_ms(),
            tap_max_travel_px: default_tap_max_travel_px(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl PointerConfig {
    pub fn edge_release_delay(&self) -> Duration {
        Duration::from_millis(self.edge_release_delay_ms)
    }

    pub fn double_click(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }

    pub fn tap_max(&self) -> Duration {
        Duration::from_millis(self.tap_max_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Touch scaling and multi-finger tap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchConfig {
    #[serde(default = "default_move_base")]
    pub move_base: f64,
    #[serde(default = "default_move_min")]
    pub move_min: f64,
    #[serde(default = "default_move_max")]
    pub move_max: f64,
    #[serde(default = "default_scroll_factor")]
    pub scroll_factor: f64,
    #[serde(default = "default_scroll_min")]
    pub scroll_min: f64,
    #[serde(default = "default_scroll_max")]
    pub scroll_max: f64,
    #[serde(default = "default_multi_tap_ms")]
    pub multi_tap_ms: u64,
    #[serde(default = "default_multi_tap_travel_px")]
    pub multi_tap_travel_px: f64,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            move_base: default_move_base(),
            move_min: default_move_min(),
            move_max: default_move_max(),
            scroll_factor: default_scroll_factor(),
            scroll_min: default_scroll_min(),
            scroll_max: default_scroll_max(),
            multi_tap_ms: default_multi_tap_ms(),
            multi_tap_travel_px: default_multi_tap_travel_px(),
        }
    }
}

impl TouchConfig {
    pub fn multi_tap(&self) -> Duration {
        Duration::from_millis(self.multi_tap_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardConfig {
    /// Held modifiers are released automatically after this long.
    #[serde(default = "default_modifier_release_ms")]
    pub modifier_release_ms: u64,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            modifier_release_ms: default_modifier_release_ms(),
        }
    }
}

impl KeyboardConfig {
    pub fn modifier_release(&self) -> Duration {
        Duration::from_millis(self.modifier_release_ms)
    }
}

/// Clipboard sync settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Delay between forwarding a copy/cut shortcut and pulling the result.
    #[serde(default = "default_pull_delay_ms")]
    pub pull_delay_ms: u64,
    #[serde(default = "default_max_clipboard_size")]
    pub max_size: usize,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pull_delay_ms: default_pull_delay_ms(),
            max_size: default_max_clipboard_size(),
        }
    }
}

impl ClipboardConfig {
    pub fn pull_delay(&self) -> Duration {
        Duration::from_millis(self.pull_delay_ms)
    }
}

fn default_url() -> String {
    "http://127.0.0.1:4001".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_edge_release_ratio() -> f64 {
    0.05
}

fn default_edge_buffer_px() -> f64 {
    2.0
}

fn default_edge_release_delay_ms() -> u64 {
    100
}

fn default_double_click_ms() -> u64 {
    320
}

fn default_tap_max_ms() -> u64 {
    220
}

fn default_tap_max_travel_px() -> f64 {
    20.0
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_move_base() -> f64 {
    0.9
}

fn default_move_min() -> f64 {
    1.6
}

fn default_move_max() -> f64 {
    10.0
}

fn default_scroll_factor() -> f64 {
    0.45
}

fn default_scroll_min() -> f64 {
    1.5
}

fn default_scroll_max() -> f64 {
    6.0
}

fn default_multi_tap_ms() -> u64 {
    260
}

fn default_multi_tap_travel_px() -> f64 {
    95.0
}

fn default_modifier_release_ms() -> u64 {
    8000
}

fn default_pull_delay_ms() -> u64 {
    250
}

fn default_max_clipboard_size() -> usize {
    10 * 1024 * 1024 // 10 MiB
}

/// Get the default config directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("lan-control")
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}
