//! Configuration file support.
//!
//! Settings are stored as versioned JSON, by default under the user's config
//! directory (`<config_dir>/boxlab/boxlab-config.json`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Annotation engine behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Canvas width in display pixels
    #[serde(default = "default_container_width")]
    pub container_width: f32,

    /// Canvas height in display pixels
    #[serde(default = "default_container_height")]
    pub container_height: f32,

    /// Smallest accepted box side, in image pixels
    #[serde(default = "default_min_box_size")]
    pub min_box_size: f32,

    /// Stroke color of boxes that have no class yet
    #[serde(default = "default_draft_color")]
    pub draft_color: String,
}

fn default_container_width() -> f32 {
    900.0
}

fn default_container_height() -> f32 {
    400.0
}

fn default_min_box_size() -> f32 {
    20.0
}

fn default_draft_color() -> String {
    "red".to_string()
}

impl EngineConfig {
    /// Canvas size in display pixels.
    pub fn container_size(&self) -> Size {
        Size::new(self.container_width, self.container_height)
    }

    /// Reject settings the engine cannot draw with: a container without
    /// area, or a minimum box size that is negative or not a number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("engine.container_width", self.container_width, self.container_width > 0.0),
            ("engine.container_height", self.container_height, self.container_height > 0.0),
            ("engine.min_box_size", self.min_box_size, self.min_box_size >= 0.0),
        ];
        for (field, value, in_range) in checks {
            if !(in_range && value.is_finite()) {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            container_width: default_container_width(),
            container_height: default_container_height(),
            min_box_size: default_min_box_size(),
            draft_color: default_draft_color(),
        }
    }
}

/// How a surface strokes boxes and places labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceStyle {
    /// Outline width in display pixels
    #[serde(default = "default_line_width")]
    pub line_width: f32,

    /// Label font description
    #[serde(default = "default_font")]
    pub font: String,

    /// Horizontal label offset from the box's top-left corner
    #[serde(default = "default_label_offset_x")]
    pub label_offset_x: f32,

    /// Vertical label offset (baseline) from the box's top-left corner
    #[serde(default = "default_label_offset_y")]
    pub label_offset_y: f32,
}

fn default_line_width() -> f32 {
    2.0
}

fn default_font() -> String {
    "bold 14px monospace".to_string()
}

fn default_label_offset_x() -> f32 {
    4.0
}

fn default_label_offset_y() -> f32 {
    12.0
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            line_width: default_line_width(),
            font: default_font(),
            label_offset_x: default_label_offset_x(),
            label_offset_y: default_label_offset_y(),
        }
    }
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Whether changes are saved automatically
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,

    /// Minimum seconds between automatic saves
    #[serde(default = "default_auto_save_interval_secs")]
    pub auto_save_interval_secs: u64,

    /// Seconds of inactivity before an automatic save
    #[serde(default = "default_auto_save_debounce_secs")]
    pub auto_save_debounce_secs: u64,
}

fn default_auto_save() -> bool {
    true
}

fn default_auto_save_interval_secs() -> u64 {
    60
}

fn default_auto_save_debounce_secs() -> u64 {
    5
}

impl UserPreferences {
    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(self.auto_save_interval_secs)
    }

    pub fn auto_save_debounce(&self) -> Duration {
        Duration::from_secs(self.auto_save_debounce_secs)
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            auto_save: default_auto_save(),
            auto_save_interval_secs: default_auto_save_interval_secs(),
            auto_save_debounce_secs: default_auto_save_debounce_secs(),
        }
    }
}

/// Application configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Engine behavior
    #[serde(default)]
    pub engine: EngineConfig,

    /// Drawing style for surfaces that honor it
    #[serde(default)]
    pub surface: SurfaceStyle,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            engine: EngineConfig::default(),
            surface: SurfaceStyle::default(),
            preferences: UserPreferences::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }
        config.engine.validate()?;

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "boxlab-config.json"
    }

    /// Default config file location, if a config directory can be found.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("boxlab").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("boxlab")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write the configuration, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save(&path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error("Config version {file_version} is newer than supported version {supported_version}")]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A setting is outside the range the engine accepts
    #[error("Invalid value {value} for {field}")]
    InvalidValue { field: &'static str, value: f32 },

    /// No config directory could be determined
    #[error("Could not determine config directory")]
    NoConfigDir,
}
