//! Physics tuning and level-boundary settings
//!
//! Persisted as JSON. Every field has a default, so partial files only
//! override what they mention.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::CollisionType;

/// What a tile lookup outside the map returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OutOfBoundsPolicy {
    /// Map edges are open; bodies can leave the grid sideways
    #[default]
    Empty,
    /// Map edges behave like solid walls
    Solid,
}

impl OutOfBoundsPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutOfBoundsPolicy::Empty => "Empty",
            OutOfBoundsPolicy::Solid => "Solid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "empty" | "open" => Some(OutOfBoundsPolicy::Empty),
            "solid" | "wall" => Some(OutOfBoundsPolicy::Solid),
            _ => None,
        }
    }

    /// Tile type reported for coordinates outside the grid
    pub fn sentinel(&self) -> CollisionType {
        match self {
            OutOfBoundsPolicy::Empty => CollisionType::Empty,
            OutOfBoundsPolicy::Solid => CollisionType::SolidBox,
        }
    }
}

/// Player feel constants. Speeds are world units per tick,
/// accelerations world units per tick².
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    // === Ground movement ===
    /// Top speed reachable from input alone
    pub run_speed: f32,
    /// Acceleration along the ground tangent at rest (eases off toward `run_speed`)
    pub ground_accel: f32,
    /// Per-tick multiplier on ground speed with no horizontal input
    pub ground_damping: f32,

    // === Air movement ===
    /// Base air acceleration, scaled by the band factors below
    pub air_accel: f32,
    /// Factor while moving against the held direction
    pub air_turn_factor: f32,
    /// Factor below `air_slow_band * run_speed`
    pub air_slow_factor: f32,
    /// Factor between the slow band and `run_speed`
    pub air_fast_factor: f32,
    /// Factor at or above `run_speed`
    pub air_over_max_factor: f32,
    /// Fraction of `run_speed` separating the slow and fast bands
    pub air_slow_band: f32,
    /// Per-tick multiplier on horizontal air speed with no horizontal input
    pub air_damping: f32,

    // === Jumping and gravity ===
    pub jump_velocity: f32,
    /// Gravity while idle or falling
    pub gravity_idle: f32,
    /// Gravity while rising with jump held
    pub gravity_jumping: f32,
    /// Gravity while rising after jump was released
    pub gravity_jump_cancel: f32,
    /// Downward speed forced when leaving a slope lip while rising
    pub slope_lip_drop: f32,

    // === Contacts ===
    /// Per-contact velocity multiplier on walls and ceilings
    pub wall_friction: f32,
    /// Speeds below this on ground contacts snap to zero
    pub settle_speed: f32,
    /// Collision passes per tick
    pub resolution_passes: u32,
    /// Push the player out of overlapped geometry before moving
    pub depenetrate: bool,

    // === Charge coupling ===
    /// Numerator of the inverse-cube force between players
    pub charge_strength: f32,
    /// Distances below this are clamped to it
    pub charge_core_radius: f32,
    /// Vertical speeds within this of zero carry no charge
    pub charge_deadzone: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            run_speed: 5.0,
            ground_accel: 0.8,
            ground_damping: 0.7,

            air_accel: 0.5,
            air_turn_factor: 1.0,
            air_slow_factor: 0.6,
            air_fast_factor: 0.3,
            air_over_max_factor: 0.0,
            air_slow_band: 0.5,
            air_damping: 0.97,

            jump_velocity: 8.0,
            gravity_idle: 0.5,
            gravity_jumping: 0.3,
            gravity_jump_cancel: 0.8,
            slope_lip_drop: 0.5,

            wall_friction: 0.9,
            settle_speed: 0.01,
            resolution_passes: 2,
            depenetrate: true,

            charge_strength: 2000.0,
            charge_core_radius: 32.0,
            charge_deadzone: 0.05,
        }
    }
}

/// Errors from loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings JSON is invalid: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub tuning: PhysicsTuning,
    /// Behavior of tile lookups past the map edges
    pub out_of_bounds: OutOfBoundsPolicy,
    /// Run one simulation tick every `frame_skip` frames (0 or 1 = every frame)
    pub frame_skip: u32,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a JSON file
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Read settings from a JSON file, falling back to defaults on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
