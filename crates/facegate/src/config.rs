//! Configuration management for facegate.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "facegate";

/// Cascade shipped with OpenCV, looked up in its sample data paths.
pub const DEFAULT_CASCADE: &str = "haarcascades/haarcascade_frontalface_default.xml";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FACEGATE_`, sections split on `__`)
/// 2. TOML config file at `~/.config/facegate/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Face detection configuration.
    pub detection: DetectionConfig,
    /// Face recognition configuration.
    pub recognition: RecognitionConfig,
    /// Camera configuration.
    pub camera: CameraConfig,
}

/// Where the JSON documents and face crops live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `roles.json`, `roles_access.json`, `areas.json`
    /// and `registered_faces/`.
    /// Defaults to `~/.local/share/facegate`
    pub data_dir: Option<PathBuf>,
}

/// Haar cascade parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Path to the cascade XML. Unset means OpenCV's bundled frontal face cascade.
    pub cascade_path: Option<PathBuf>,
    /// Image pyramid scale step. Must be greater than 1.
    pub scale_factor: f64,
    /// Neighbouring detections required to keep a candidate.
    pub min_neighbors: i32,
    /// Smallest face side in pixels; 0 lets the cascade decide.
    pub min_face_size: i32,
}

/// LBPH recognizer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Predictions with a distance below this are treated as known faces.
    pub confidence_threshold: f64,
    /// Side of the square every face is resized to before training and prediction.
    pub face_size: i32,
    /// LBP radius.
    pub radius: i32,
    /// LBP sample points.
    pub neighbors: i32,
    /// Histogram grid columns.
    pub grid_x: i32,
    /// Histogram grid rows.
    pub grid_y: i32,
}

/// Capture device settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device index passed to the capture backend.
    pub device_index: i32,
    /// Milliseconds to wait for a key press between frames.
    pub frame_delay_ms: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cascade_path: None,
            scale_factor: 1.1,
            min_neighbors: 5,
            min_face_size: 0,
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 50.0,
            face_size: 200,
            radius: 1,
            neighbors: 8,
            grid_x: 8,
            grid_y: 8,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            frame_delay_ms: 1,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FACEGATE_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let detection = &self.detection;
        if !(detection.scale_factor > 1.0 && detection.scale_factor.is_finite()) {
            return Err(invalid(format!(
                "scale_factor ({}) must be greater than 1.0",
                detection.scale_factor
            )));
        }
        if detection.min_neighbors < 0 {
            return Err(invalid("min_neighbors cannot be negative"));
        }
        if detection.min_face_size < 0 {
            return Err(invalid("min_face_size cannot be negative"));
        }

        let recognition = &self.recognition;
        if !(recognition.confidence_threshold > 0.0 && recognition.confidence_threshold.is_finite())
        {
            return Err(invalid(format!(
                "confidence_threshold ({}) must be a positive number",
                recognition.confidence_threshold
            )));
        }
        if recognition.face_size <= 0 {
            return Err(invalid("face_size must be greater than 0"));
        }
        for (name, value) in [
            ("radius", recognition.radius),
            ("neighbors", recognition.neighbors),
            ("grid_x", recognition.grid_x),
            ("grid_y", recognition.grid_y),
        ] {
            if value < 1 {
                return Err(invalid(format!("{name} must be at least 1")));
            }
        }

        if self.camera.device_index < 0 {
            return Err(invalid("device_index cannot be negative"));
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the delay between frames as a Duration.
    #[must_use]
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.camera.frame_delay_ms))
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}
