//! Player controller
//!
//! Each tick a player integrates input, gravity and the charge pull of the
//! other player into a tentative velocity, then slides through the tile map
//! one contact at a time: advance to just short of the earliest hit, project
//! the velocity onto the surface, and sweep again with what is left.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::CollisionResult;
use super::geom::{Aabb, Ellipse};
use super::query::{CollisionBody, first_collision, resolve_overlaps};
use super::tilemap::TileMap;
use crate::consts::{GROUND_NORMAL_THRESHOLD, NORMAL_EPSILON, TIME_EPSILON};
use crate::settings::PhysicsTuning;
use crate::{UP, right_perp};

/// Collision radii of a player
pub const PLAYER_HALF_WIDTH: Vec2 = Vec2::new(6.0, 10.0);

/// Vertical phase of a jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JumpState {
    /// On the ground or falling
    #[default]
    Idle,
    /// Rising with jump held
    Jumping,
    /// Rising after jump was released early
    JumpHeightCancel,
}

/// Input for one player for one tick, after edge detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerCommand {
    pub left: bool,
    pub right: bool,
    /// Jump is held this tick
    pub jump_held: bool,
    /// Jump went down this tick
    pub jump_pressed: bool,
}

impl PlayerCommand {
    /// -1 for left, +1 for right, 0 for neither or both
    pub fn horizontal(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// A surface touched during the last resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub normal: Vec2,
    pub position: Vec2,
}

/// Start-of-tick view of a player, read by the other player's charge coupling
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChargeSnapshot {
    pub position: Vec2,
    pub charge: f32,
}

/// Physical state of one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Ellipse radii
    pub half_width: Vec2,
    pub grounded: bool,
    /// Touching a wall on the left side (wall normal points right)
    pub left_wall: bool,
    /// Touching a wall on the right side (wall normal points left)
    pub right_wall: bool,
    /// Normal of the most recent ground contact
    pub last_known_ground_plane: Vec2,
    pub last_known_ground_position: Vec2,
    pub last_known_ground_velocity: Vec2,
    pub jump_state: JumpState,
    /// Contacts from the most recent resolution, in the order they were hit
    #[serde(skip)]
    pub contacts: Vec<Contact>,
}

impl Player {
    pub fn new(position: Vec2, half_width: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            half_width,
            grounded: false,
            left_wall: false,
            right_wall: false,
            last_known_ground_plane: UP,
            last_known_ground_position: position,
            last_known_ground_velocity: Vec2::ZERO,
            jump_state: JumpState::Idle,
            contacts: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Aabb {
        self.collision().bounds()
    }

    /// +1 while rising, -1 while falling, 0 within the dead zone
    pub fn charge(&self, tuning: &PhysicsTuning) -> f32 {
        if self.velocity.y > tuning.charge_deadzone {
            1.0
        } else if self.velocity.y < -tuning.charge_deadzone {
            -1.0
        } else {
            0.0
        }
    }

    pub fn charge_snapshot(&self, tuning: &PhysicsTuning) -> ChargeSnapshot {
        ChargeSnapshot {
            position: self.position,
            charge: self.charge(tuning),
        }
    }

    /// Vertical acceleration from the other player's charge.
    ///
    /// Inverse-cube in the distance between the players, clamped to the core
    /// radius. Like charges push apart vertically, opposite charges pull together.
    pub fn charge_acceleration(
        &self,
        own_charge: f32,
        other: &ChargeSnapshot,
        tuning: &PhysicsTuning,
    ) -> f32 {
        let product = own_charge * other.charge;
        if product == 0.0 {
            return 0.0;
        }

        let distance = self
            .position
            .distance(other.position)
            .max(tuning.charge_core_radius);
        if distance <= 0.0 {
            return 0.0;
        }
        let away = if self.position.y >= other.position.y {
            1.0
        } else {
            -1.0
        };

        tuning.charge_strength * product / (distance * distance * distance) * away
    }

    /// Advance one tick
    pub fn update(
        &mut self,
        command: &PlayerCommand,
        other: &ChargeSnapshot,
        map: &TileMap,
        tuning: &PhysicsTuning,
    ) {
        let was_grounded = self.grounded;
        let own_charge = self.charge(tuning);

        self.update_jump_state(command, tuning);
        self.velocity.y += self.charge_acceleration(own_charge, other, tuning);
        self.apply_horizontal_input(command, tuning);
        self.velocity.y -= self.gravity(tuning);

        if tuning.depenetrate {
            let push = resolve_overlaps(&self.collision(), map, tuning.resolution_passes.max(1));
            self.position += push;
        }

        self.resolve_collisions(map, tuning);
        self.clamp_to_world_floor();

        // Running off the top of a ramp would otherwise launch the player
        if was_grounded
            && !self.grounded
            && self.velocity.y > 0.0
            && self.jump_state == JumpState::Idle
        {
            self.velocity.y = -tuning.slope_lip_drop;
        }

        if self.grounded {
            self.last_known_ground_position = self.position;
            self.last_known_ground_velocity = self.velocity;
        }
    }

    fn update_jump_state(&mut self, command: &PlayerCommand, tuning: &PhysicsTuning) {
        match self.jump_state {
            JumpState::Idle => {
                if command.jump_pressed && self.grounded {
                    self.velocity.y = tuning.jump_velocity;
                    self.grounded = false;
                    self.jump_state = JumpState::Jumping;
                    log::debug!(
                        "Jump from ({:.1}, {:.1})",
                        self.position.x,
                        self.position.y
                    );
                }
            }
            JumpState::Jumping => {
                if self.velocity.y < 0.0 {
                    self.jump_state = JumpState::Idle;
                } else if !command.jump_held {
                    self.jump_state = JumpState::JumpHeightCancel;
                }
            }
            JumpState::JumpHeightCancel => {
                if self.velocity.y < 0.0 {
                    self.jump_state = JumpState::Idle;
                }
            }
        }
    }

    fn gravity(&self, tuning: &PhysicsTuning) -> f32 {
        match self.jump_state {
            JumpState::Idle => tuning.gravity_idle,
            JumpState::Jumping => tuning.gravity_jumping,
            JumpState::JumpHeightCancel => tuning.gravity_jump_cancel,
        }
    }

    fn apply_horizontal_input(&mut self, command: &PlayerCommand, tuning: &PhysicsTuning) {
        let input = command.horizontal();

        if self.grounded {
            // Accelerate along the surface, not along world x
            let tangent = right_perp(self.last_known_ground_plane);
            let along = self.velocity.dot(tangent);

            if input != 0.0 {
                let speed = along * input;
                let ease = if tuning.run_speed > 0.0 {
                    ((tuning.run_speed - speed) / tuning.run_speed).clamp(0.0, 2.0)
                } else {
                    0.0
                };
                self.velocity += tangent * (input * tuning.ground_accel * ease);
            } else {
                self.velocity += tangent * (along * tuning.ground_damping - along);
            }
            return;
        }

        if input == 0.0 {
            self.velocity.x *= tuning.air_damping;
            return;
        }

        let speed = self.velocity.x * input;
        let factor = if speed < 0.0 {
            tuning.air_turn_factor
        } else if speed < tuning.air_slow_band * tuning.run_speed {
            tuning.air_slow_factor
        } else if speed < tuning.run_speed {
            tuning.air_fast_factor
        } else {
            tuning.air_over_max_factor
        };

        let boosted = speed + tuning.air_accel * factor;
        let capped = if speed < tuning.run_speed {
            boosted.min(tuning.run_speed)
        } else {
            boosted
        };
        self.velocity.x = capped * input;
    }

    /// Move through `map` along the current velocity, sliding along whatever is hit.
    ///
    /// Recomputes `grounded`, the wall flags and `contacts` from scratch. Gives
    /// up after `tuning.resolution_passes` contacts, leaving any time still
    /// unspent for this tick.
    pub fn resolve_collisions(&mut self, map: &TileMap, tuning: &PhysicsTuning) {
        self.contacts.clear();
        self.grounded = false;
        self.left_wall = false;
        self.right_wall = false;

        let mut remaining = 1.0f32;
        let mut disallowed = Vec2::ZERO;

        for _ in 0..tuning.resolution_passes {
            let hit = first_collision(&*self, map, 1.0 - remaining, disallowed);
            if !hit.hit {
                self.position += self.velocity * remaining;
                remaining = 0.0;
                break;
            }

            self.position += self.velocity * (remaining * (hit.time - TIME_EPSILON).max(0.0));
            remaining *= 1.0 - hit.time;
            self.respond_to_contact(&hit, tuning);
            disallowed = hit.normal;
        }

        if remaining > 0.0 && self.velocity != Vec2::ZERO {
            log::debug!(
                "Collision passes exhausted with {:.4} of the tick left at ({:.2}, {:.2})",
                remaining,
                self.position.x,
                self.position.y
            );
        }
    }

    fn respond_to_contact(&mut self, hit: &CollisionResult, tuning: &PhysicsTuning) {
        let normal = hit.normal;

        // Keep moving the way we were going along the surface
        let tangent = right_perp(normal);
        let tangent = if self.velocity.dot(tangent) >= 0.0 {
            tangent
        } else {
            -tangent
        };
        self.velocity = tangent * self.velocity.dot(tangent);

        let is_ground = normal.dot(UP) > GROUND_NORMAL_THRESHOLD;
        if is_ground {
            if self.velocity.length() < tuning.settle_speed {
                self.velocity = Vec2::ZERO;
            }
            self.grounded = true;
            self.last_known_ground_plane = normal;
        } else {
            self.velocity *= tuning.wall_friction;
            if self.grounded {
                // No sliding up or down a wall while standing
                self.velocity.y = 0.0;
            } else if (normal.x - 1.0).abs() < NORMAL_EPSILON {
                self.left_wall = true;
            } else if (normal.x + 1.0).abs() < NORMAL_EPSILON {
                self.right_wall = true;
            }
        }

        self.contacts.push(Contact {
            normal,
            position: hit.position,
        });
    }

    /// The bottom of the world is solid regardless of the map
    fn clamp_to_world_floor(&mut self) {
        if self.position.y - self.half_width.y < 0.0 {
            self.position.y = self.half_width.y;
            self.velocity.y = 0.0;
            self.grounded = true;
            self.last_known_ground_plane = UP;
        }
    }
}

impl CollisionBody for Player {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn collision(&self) -> Ellipse {
        Ellipse::new(self.position, self.half_width)
    }
}
