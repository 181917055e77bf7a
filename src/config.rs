//! Tunable solver parameters.
//!
//! The simulation reads these fresh on every tick, so a settings panel can
//! hold `&mut Config` and edit values between frames. Nothing here is
//! validated: the ranges below are what the panel offers, not what the
//! solver enforces.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DENSITY_DISSIPATION_RANGE: RangeInclusive<f32> = 0.9..=1.0;
pub const VELOCITY_DISSIPATION_RANGE: RangeInclusive<f32> = 0.9..=1.0;
pub const PRESSURE_DISSIPATION_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const PRESSURE_ITERATIONS_RANGE: RangeInclusive<u32> = 1..=60;
pub const CURL_RANGE: RangeInclusive<f32> = 0.0..=50.0;
pub const SPLAT_RADIUS_RANGE: RangeInclusive<f32> = 0.01..=1.0;
pub const TEXTURE_DOWNSAMPLE_RANGE: RangeInclusive<u32> = 0..=4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Right shift applied to the drawing buffer size to get the grid size.
    pub texture_downsample: u32,
    pub density_dissipation: f32,
    pub velocity_dissipation: f32,
    /// Decay applied to last frame's pressure before it seeds relaxation.
    pub pressure_dissipation: f32,
    pub pressure_iterations: u32,
    /// Vorticity confinement strength.
    pub curl: f32,
    /// Splat size as a percentage of the unit texture square.
    pub splat_radius: f32,
    /// Splat on every pointer move. When false, only moves made while the
    /// pointer is held down inject anything.
    pub splat_on_hover: bool,
    /// Periodically drop a faint random splat so an idle canvas keeps moving.
    pub ambient_splats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            texture_downsample: 1,
            density_dissipation: 0.98,
            velocity_dissipation: 0.99,
            pressure_dissipation: 0.8,
            pressure_iterations: 25,
            curl: 30.0,
            splat_radius: 0.35,
            splat_on_hover: true,
            ambient_splats: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
