//! Gravitymania - two-player gravity-inversion platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, swept collision, tilemaps, players)
//! - `settings`: Data-driven physics tuning and level-boundary policy
//! - `frame_advance`: Pause / single-step / frame-skip gate for the tick loop
//! - `demo`: Seeded input driver for headless runs

pub mod demo;
pub mod frame_advance;
pub mod settings;
pub mod sim;

pub use frame_advance::FrameAdvance;
pub use settings::{OutOfBoundsPolicy, PhysicsTuning, Settings, SettingsError};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation rate. Velocities are expressed in world units per tick.
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Side length of a square tile in world units
    pub const TILE_SIZE: f32 = 16.0;

    /// Number of players (and maps) in a match
    pub const PLAYER_COUNT: usize = 2;

    /// Fraction of the hit time a body stops short of a surface
    pub const TIME_EPSILON: f32 = 0.0001;
    /// Tolerance for "exactly axis-aligned" normal comparisons
    pub const NORMAL_EPSILON: f32 = 0.00001;
    /// Normals closer than this (by dot product) to a disallowed normal are ignored
    pub const DISALLOWED_NORMAL_EPSILON: f32 = 0.001;
    /// A contact normal whose dot with world-up exceeds this is ground
    pub const GROUND_NORMAL_THRESHOLD: f32 = 0.7;
    /// Slack for point-in-segment-box tests
    pub const SEGMENT_BOX_TOLERANCE: f32 = 0.004;
    /// Swept query bounds grow by this fraction of the ellipse radii
    pub const COLLISION_BUFFER: f32 = 0.1;
    /// Extra world-space clearance added when pushing a body out of geometry
    pub const DEPENETRATION_SKIN: f32 = 0.001;
}

/// World-space up direction
pub const UP: Vec2 = Vec2::Y;

/// World-space right direction
pub const RIGHT: Vec2 = Vec2::X;

/// Perpendicular rotated +90° (counter-clockwise)
#[inline]
pub fn left_perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Perpendicular rotated -90° (clockwise)
#[inline]
pub fn right_perp(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perpendiculars() {
        let v = Vec2::new(3.0, 1.0);
        assert_eq!(left_perp(v), Vec2::new(-1.0, 3.0));
        assert_eq!(right_perp(v), Vec2::new(1.0, -3.0));
        assert_eq!(left_perp(v).dot(v), 0.0);
        assert_eq!(right_perp(RIGHT), -UP);
    }
}
