//! Generation parameters, their defaults, and TOML/JSON loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Inclusive integer range. Reversed bounds are swapped on construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
}

impl IntRange {
    pub fn new(a: i32, b: i32) -> Self {
        if a <= b { Self { min: a, max: b } } else { Self { min: b, max: a } }
    }

    pub fn fixed(value: i32) -> Self {
        Self { min: value, max: value }
    }

    pub fn contains(self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn has_odd_value(self) -> bool {
        self.min <= self.max && (self.min % 2 != 0 || self.min < self.max)
    }

    fn normalized(self) -> Self {
        Self::new(self.min, self.max)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    pub room_count: IntRange,
    pub room_width: IntRange,
    pub room_height: IntRange,
    pub layout_spread_factor: f32,
    pub ellipse_x_scale: f32,
    pub ellipse_y_scale: f32,
    pub grid_size: i32,
    /// Clearance kept around every room while resolving overlaps.
    pub room_padding: i32,
    pub main_room_threshold: f32,
    pub edge_add_back_ratio: f32,
    pub main_room_count: IntRange,
    pub max_resolver_steps: u32,
    pub sleep_threshold: f32,
    pub max_placement_attempts: u32,
    pub max_regenerations: u32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            room_count: IntRange::new(30, 50),
            room_width: IntRange::new(3, 11),
            room_height: IntRange::new(3, 11),
            layout_spread_factor: 1.0,
            ellipse_x_scale: 2.0,
            ellipse_y_scale: 1.0,
            grid_size: 1,
            room_padding: 2,
            main_room_threshold: 1.1,
            edge_add_back_ratio: 0.1,
            main_room_count: IntRange::new(6, 8),
            max_resolver_steps: 20_000,
            sleep_threshold: 0.001,
            max_placement_attempts: 256,
            max_regenerations: 32,
        }
    }
}

impl DungeonConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.normalized().validated()
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.normalized().validated()
    }

    /// Loads a `.json` file as JSON and anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, range) in [
            ("room_count", self.room_count),
            ("room_width", self.room_width),
            ("room_height", self.room_height),
            ("main_room_count", self.main_room_count),
        ] {
            if range.min > range.max {
                return Err(ConfigError::InvalidRange {
                    field,
                    min: range.min,
                    max: range.max,
                    reason: "min is greater than max",
                });
            }
        }
        if self.room_count.min < 1 {
            return Err(ConfigError::InvalidRange {
                field: "room_count",
                min: self.room_count.min,
                max: self.room_count.max,
                reason: "at least one room is required",
            });
        }
        for (field, range) in [("room_width", self.room_width), ("room_height", self.room_height)]
        {
            if range.min < 3 {
                return Err(ConfigError::InvalidRange {
                    field,
                    min: range.min,
                    max: range.max,
                    reason: "rooms need a wall ring around at least one floor cell",
                });
            }
            if !range.has_odd_value() {
                return Err(ConfigError::NoOddValue { field, min: range.min, max: range.max });
            }
        }
        if self.main_room_count.min < 4 {
            return Err(ConfigError::InvalidRange {
                field: "main_room_count",
                min: self.main_room_count.min,
                max: self.main_room_count.max,
                reason: "four special rooms need four main rooms",
            });
        }
        if self.main_room_count.max > self.room_count.max {
            return Err(ConfigError::InvalidRange {
                field: "main_room_count",
                min: self.main_room_count.min,
                max: self.main_room_count.max,
                reason: "cannot exceed the largest room count",
            });
        }
        if self.grid_size <= 0 {
            return Err(ConfigError::OutOfBounds {
                field: "grid_size",
                value: self.grid_size as f32,
                expected: "a positive cell size",
            });
        }
        if self.room_padding < 0 {
            return Err(ConfigError::OutOfBounds {
                field: "room_padding",
                value: self.room_padding as f32,
                expected: "a non-negative cell count",
            });
        }
        if !(0.0..=1.0).contains(&self.edge_add_back_ratio) {
            return Err(ConfigError::OutOfBounds {
                field: "edge_add_back_ratio",
                value: self.edge_add_back_ratio,
                expected: "[0, 1]",
            });
        }
        for (field, value) in [
            ("layout_spread_factor", self.layout_spread_factor),
            ("ellipse_x_scale", self.ellipse_x_scale),
            ("ellipse_y_scale", self.ellipse_y_scale),
            ("main_room_threshold", self.main_room_threshold),
            ("sleep_threshold", self.sleep_threshold),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::OutOfBounds { field, value, expected: "(0, inf)" });
            }
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.room_count = self.room_count.normalized();
        self.room_width = self.room_width.normalized();
        self.room_height = self.room_height.normalized();
        self.main_room_count = self.main_room_count.normalized();
        self
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}
