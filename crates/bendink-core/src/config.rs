//! Tunable thresholds for the interaction machine.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Pointer travel, in page units, before a press becomes a drag.
pub const DEAD_ZONE: f64 = 3.0;
/// Gap between a shape and a clone placed beside it.
pub const CLONING_DISTANCE: f64 = 32.0;
/// Margin added around the selection to size clone-paint cells.
pub const CLONE_PAINT_MARGIN: f64 = 16.0;
/// Angle divisions used when snapping a dragged arrow endpoint.
pub const ANGLE_SNAP_SEGMENTS: u32 = 24;

/// Thresholds used by the select tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub dead_zone: f64,
    pub cloning_distance: f64,
    pub clone_paint_margin: f64,
    pub angle_snap_segments: u32,
    pub handle_hit_tolerance: f64,
    /// Rotation snap divisions used while the snap modifier is held.
    pub rotate_snap_segments: u32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            dead_zone: DEAD_ZONE,
            cloning_distance: CLONING_DISTANCE,
            clone_paint_margin: CLONE_PAINT_MARGIN,
            angle_snap_segments: ANGLE_SNAP_SEGMENTS,
            handle_hit_tolerance: 8.0,
            rotate_snap_segments: 24,
        }
    }
}

impl InteractionConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Reject distances that are negative or not finite, and zero segment counts.
    pub fn validate(&self) -> ConfigResult<()> {
        let distances = [
            ("dead_zone", self.dead_zone),
            ("cloning_distance", self.cloning_distance),
            ("clone_paint_margin", self.clone_paint_margin),
            ("handle_hit_tolerance", self.handle_hit_tolerance),
        ];
        for (field, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a finite non-negative distance, got {value}"),
                });
            }
        }

        let segments = [
            ("angle_snap_segments", self.angle_snap_segments),
            ("rotate_snap_segments", self.rotate_snap_segments),
        ];
        for (field, value) in segments {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "segment count must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}
