//! Configuration system
//!
//! [`WorldConfig`] holds the knobs a [`TransformWorld`](crate::world::TransformWorld)
//! is built with. Any config type implementing [`Config`] can be loaded from or
//! saved to TOML or RON, chosen by file extension.

use serde::{Deserialize, Serialize};

use crate::coords::{Rect, YAxis};
use crate::foundation::math::KernelKind;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that load fine but cannot be used
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// # Transform World Configuration
///
/// Settings fixed when a world is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Which way world +Y points on screen
    pub y_axis: YAxis,
    /// Matrix kernel used for compositions and bounding boxes
    pub kernel: KernelKind,
    /// Local bounds given to objects registered without explicit bounds
    pub default_bounds: Rect,
    /// Node slots to reserve up front
    pub initial_capacity: usize,
    /// Emit a debug summary of [`FrameStats`](crate::scene::FrameStats) after each cull
    pub log_frame_stats: bool,
}

impl WorldConfig {
    /// Builder pattern: set the up-axis convention
    #[must_use]
    pub fn with_y_axis(mut self, y_axis: YAxis) -> Self {
        self.y_axis = y_axis;
        self
    }

    /// Builder pattern: set the matrix kernel
    #[must_use]
    pub fn with_kernel(mut self, kernel: KernelKind) -> Self {
        self.kernel = kernel;
        self
    }

    /// Builder pattern: set default local bounds
    #[must_use]
    pub fn with_default_bounds(mut self, bounds: Rect) -> Self {
        self.default_bounds = bounds;
        self
    }

    /// Builder pattern: reserve node slots
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Builder pattern: toggle per-frame stats logging
    #[must_use]
    pub fn with_frame_stats_logging(mut self, enabled: bool) -> Self {
        self.log_frame_stats = enabled;
        self
    }

    /// Validate the configuration
    ///
    /// Only structural settings are checked; transform and camera values are
    /// never validated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_bounds.w < 0.0 || self.default_bounds.h < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "default bounds must have non-negative size, got {}x{}",
                self.default_bounds.w, self.default_bounds.h
            )));
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            y_axis: YAxis::Up,
            kernel: KernelKind::Scalar,
            default_bounds: Rect::local(-0.5, -0.5, 1.0, 1.0),
            initial_capacity: 256,
            log_frame_stats: false,
        }
    }
}

impl Config for WorldConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        let dir = std::env::temp_dir().join(format!("scene2d_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name).to_string_lossy().into_owned()
    }

    fn custom() -> WorldConfig {
        WorldConfig::default()
            .with_y_axis(YAxis::Down)
            .with_kernel(KernelKind::Batched)
            .with_default_bounds(Rect::local(-8.0, -8.0, 16.0, 16.0))
            .with_initial_capacity(1024)
            .with_frame_stats_logging(true)
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("world.toml");
        custom().save_to_file(&path).unwrap();
        let loaded = WorldConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, custom());
    }

    #[test]
    fn test_ron_round_trip() {
        let path = temp_path("world.ron");
        custom().save_to_file(&path).unwrap();
        let loaded = WorldConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, custom());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: WorldConfig = toml::from_str("y_axis = \"Down\"\n").unwrap();
        assert_eq!(config.y_axis, YAxis::Down);
        assert_eq!(config.kernel, KernelKind::Scalar);
        assert_eq!(config.initial_capacity, 256);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = WorldConfig::load_from_file("world.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_) | ConfigError::UnsupportedFormat(_)));

        let err = WorldConfig::default().save_to_file(&temp_path("world.json")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_validate_rejects_negative_bounds() {
        assert!(WorldConfig::default().validate().is_ok());
        let bad = WorldConfig::default().with_default_bounds(Rect::local(0.0, 0.0, -1.0, 1.0));
        assert!(matches!(bad.validate(), Err(ConfigError::Invalid(_))));
    }
}
