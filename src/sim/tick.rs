//! Fixed timestep simulation tick
//!
//! Advances both players deterministically from held-key input.

use serde::{Deserialize, Serialize};

use super::player::{ChargeSnapshot, PlayerCommand};
use super::state::GameState;
use crate::consts::PLAYER_COUNT;

/// Held keys for one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub players: [PlayerInput; PLAYER_COUNT],
    /// Pause toggle
    pub pause: bool,
    /// Pause and advance a single tick
    pub step: bool,
}

/// Advance the game state by one frame.
///
/// Returns whether the simulation actually ran; the frame-advance gate may
/// hold it back while paused or between skipped frames.
pub fn tick(state: &mut GameState, input: &TickInput) -> bool {
    if input.pause {
        state.frame_advance.toggle_pause();
    }
    if input.step {
        state.frame_advance.step();
    }

    let run = state.frame_advance.should_update();
    state.frame_advance.end_frame();
    if !run {
        return false;
    }

    let tuning = &state.settings.tuning;

    // Both players see each other as they were at the start of the tick
    let snapshots: [ChargeSnapshot; PLAYER_COUNT] =
        std::array::from_fn(|i| state.players[i].charge_snapshot(tuning));

    let commands: [PlayerCommand; PLAYER_COUNT] = std::array::from_fn(|i| {
        let held = input.players[i];
        PlayerCommand {
            left: held.left,
            right: held.right,
            jump_held: held.jump,
            jump_pressed: held.jump && !state.prev_jump[i],
        }
    });

    for i in 0..PLAYER_COUNT {
        let other = &snapshots[(i + 1) % PLAYER_COUNT];
        state.players[i].update(&commands[i], other, &state.maps[i], tuning);
    }

    for (prev, held) in state.prev_jump.iter_mut().zip(&input.players) {
        *prev = held.jump;
    }
    state.time_ticks += 1;

    if state.time_ticks % 600 == 0 {
        log::debug!(
            "Tick {}: players at ({:.1}, {:.1}) and ({:.1}, {:.1})",
            state.time_ticks,
            state.players[0].position.x,
            state.players[0].position.y,
            state.players[1].position.x,
            state.players[1].position.y
        );
    }

    true
}
