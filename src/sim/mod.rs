//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - No RNG inside the simulation (input drivers live outside)
//! - Stable iteration order (tiles row by row, players by slot)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geom;
pub mod level;
pub mod player;
pub mod query;
pub mod state;
pub mod tick;
pub mod tilemap;

pub use collision::{
    CollisionResult, ContactKind, OverlapResult, collide_ellipse_with_line,
    collide_ellipse_with_point, overlap_ellipse_with_line, overlap_ellipse_with_point,
};
pub use geom::{Aabb, Ellipse, LineEquation, LineSegment};
pub use level::{LevelError, load_builtin_levels, parse_level};
pub use player::{ChargeSnapshot, Contact, JumpState, PLAYER_HALF_WIDTH, Player, PlayerCommand};
pub use query::{
    CollisionBody, SweptEllipse, deepest_overlap, first_collision, moving_bounds,
    resolve_overlaps,
};
pub use state::GameState;
pub use tick::{PlayerInput, TickInput, tick};
pub use tilemap::{CollisionType, Tile, TileDirection, TileIndex, TileMap, TileRange};
