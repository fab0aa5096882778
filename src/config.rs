use directories::ProjectDirs;
use iced::{Point, Rectangle, Size};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::edge::Routing;
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::input::{Binding, Command};
use crate::view::ZoomLimits;

/// Canvas engine settings, stored as JSON in the user's config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world: WorldBounds,
    pub grid_minor: u32,
    pub snap: u32,
    pub zoom: ZoomLimits,
    pub fit_padding: f32,
    pub routing: Routing,
    pub bindings: Vec<Binding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldBounds::default(),
            grid_minor: 20,
            snap: 10,
            zoom: ZoomLimits::default(),
            fit_padding: 20.0,
            routing: Routing::default(),
            bindings: vec![Binding::new("ctrl-middle-click", Command::ZoomReset)],
        }
    }
}

/// The fixed rectangle node centers are confined to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            x: -5000.0,
            y: -500.0,
            width: 10000.0,
            height: 10000.0,
        }
    }
}

impl WorldBounds {
    pub fn to_rectangle(self) -> Rectangle {
        Rectangle::new(Point::new(self.x, self.y), Size::new(self.width, self.height))
    }
}

impl Config {
    /// Load from the standard location.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to the standard location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::Invalid(reason));

        if self.grid_minor == 0 {
            return invalid("grid_minor must be greater than zero".into());
        }
        if self.snap == 0 {
            return invalid("snap must be greater than zero".into());
        }
        // Written to also reject NaN
        if !(self.zoom.step > 1.0) {
            return invalid(format!("zoom step {} must be greater than 1", self.zoom.step));
        }
        if !(self.zoom.min > 0.0 && self.zoom.min < 1.0 && self.zoom.max > 1.0) {
            return invalid(format!(
                "zoom limits ({}, {}) must surround 1.0",
                self.zoom.min, self.zoom.max
            ));
        }
        if !(self.fit_padding >= 0.0) {
            return invalid(format!("fit_padding {} must not be negative", self.fit_padding));
        }
        let snap = self.snap as f32;
        if !(self.world.width >= snap && self.world.height >= snap) {
            return invalid(format!(
                "world bounds {}x{} must span at least one snap increment ({snap})",
                self.world.width, self.world.height
            ));
        }
        for binding in self.bindings.iter().filter(|b| b.use_regex) {
            if let Err(e) = regex::Regex::new(&binding.gesture) {
                return invalid(format!("gesture pattern '{}': {e}", binding.gesture));
            }
        }
        Ok(())
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_minor, self.snap)
    }

    fn config_path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("", "", "flowboard")?;
        Some(dirs.config_dir().join("canvas.json"))
    }
}
