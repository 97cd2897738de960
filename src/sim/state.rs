//! Game state: both maps and both players
//!
//! Each player runs through their own map. The players only interact through
//! charge coupling, which reads a start-of-tick snapshot of the other player.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::{LevelError, load_builtin_levels};
use super::player::{PLAYER_HALF_WIDTH, Player};
use super::tilemap::TileMap;
use crate::consts::{PLAYER_COUNT, TILE_SIZE};
use crate::frame_advance::FrameAdvance;
use crate::settings::Settings;

/// Tile column players start above
pub const SPAWN_COLUMN: i32 = 2;

/// Gap left between a fresh player and the ground below it
const SPAWN_CLEARANCE: f32 = 1.0;

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// One map per player, indexed by player slot
    pub maps: [TileMap; PLAYER_COUNT],
    pub players: [Player; PLAYER_COUNT],
    pub settings: Settings,
    pub frame_advance: FrameAdvance,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Jump held state from the last simulated tick, for edge detection
    pub prev_jump: [bool; PLAYER_COUNT],
}

impl GameState {
    /// Fresh state with each player standing above their map's spawn column
    pub fn new(maps: [TileMap; PLAYER_COUNT], settings: Settings) -> Self {
        let players = std::array::from_fn(|i| {
            Player::new(spawn_point(&maps[i], SPAWN_COLUMN), PLAYER_HALF_WIDTH)
        });
        let frame_advance = FrameAdvance::new(settings.frame_skip);

        Self {
            maps,
            players,
            settings,
            frame_advance,
            time_ticks: 0,
            prev_jump: [false; PLAYER_COUNT],
        }
    }

    /// Fresh state on the shipped levels
    pub fn with_builtin_levels(settings: Settings) -> Result<Self, LevelError> {
        let maps = load_builtin_levels(settings.out_of_bounds)?;
        Ok(Self::new(maps, settings))
    }

    /// Put both players back at their spawn points, at rest
    pub fn reset_players(&mut self) {
        for (player, map) in self.players.iter_mut().zip(&self.maps) {
            *player = Player::new(spawn_point(map, SPAWN_COLUMN), PLAYER_HALF_WIDTH);
        }
        self.prev_jump = [false; PLAYER_COUNT];
        log::info!("Players reset to spawn");
    }
}

/// Point above the highest solid tile in `column`, or on the world floor if
/// the column is empty
pub fn spawn_point(map: &TileMap, column: i32) -> Vec2 {
    let x = (column as f32 + 0.5) * TILE_SIZE;
    let ground = (0..map.height())
        .rev()
        .find(|&y| !map.tile(column, y).collision.is_empty())
        .map_or(0.0, |y| (y + 1) as f32 * TILE_SIZE);
    Vec2::new(x, ground + PLAYER_HALF_WIDTH.y + SPAWN_CLEARANCE)
}
