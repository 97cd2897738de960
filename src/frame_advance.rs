//! Pause, single-step and frame-skip gate for the simulation loop
//!
//! The caller asks [`FrameAdvance::should_update`] once per frame, runs a
//! tick if it says so, and calls [`FrameAdvance::end_frame`] afterwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameAdvance {
    pub paused: bool,
    /// Run one tick every `frame_skip` frames (0 or 1 = every frame)
    pub frame_skip: u32,
    frame_counter: u32,
    advance_frame: bool,
}

impl FrameAdvance {
    pub fn new(frame_skip: u32) -> Self {
        Self {
            frame_skip,
            ..Self::default()
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!("Simulation {}", if self.paused { "paused" } else { "resumed" });
    }

    /// Pause and run exactly one more tick
    pub fn step(&mut self) {
        self.paused = true;
        self.advance_frame = true;
    }

    pub fn should_update(&self) -> bool {
        (!self.paused && self.frame_counter == 0) || self.advance_frame
    }

    pub fn end_frame(&mut self) {
        self.frame_counter += 1;
        if self.frame_counter >= self.frame_skip {
            self.frame_counter = 0;
        }
        self.advance_frame = false;
    }
}
