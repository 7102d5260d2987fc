//! Gameplay configuration
//!
//! Everything here has a sensible default taken from [`crate::consts`]. A
//! frontend may override values from JSON; missing fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Playfield bounds in world units (y axis points up)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            left: PLAYFIELD_LEFT,
            right: PLAYFIELD_RIGHT,
            top: PLAYFIELD_TOP,
            bottom: PLAYFIELD_BOTTOM,
        }
    }
}

impl Playfield {
    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    /// True if the fixed brick grid and the paddle fit inside the walls with
    /// room for a ball to pass under the bricks
    pub fn contains_layout(&self) -> bool {
        self.left <= LAYOUT_LEFT
            && self.right >= LAYOUT_RIGHT
            && self.top >= LAYOUT_TOP
            && self.bottom < LAYOUT_BOTTOM
            && self.width() > PADDLE_WIDTH
    }
}

/// Tunable gameplay values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub playfield: Playfield,

    // === Ball ===
    pub ball_radius: f32,
    /// Height at which fresh balls wait to be served
    pub ball_start_y: f32,
    pub ball_start_speed: f32,
    pub serve_speed: f32,
    /// Factor applied to a ball's speed for every consumed milestone
    pub speed_multiplier: f32,
    pub paddle_bounce_milestones: Vec<u32>,

    // === Paddle ===
    pub paddle_y: f32,
    pub paddle_step: f32,

    // === Lives / scoring ===
    pub starting_lives: u32,
    /// A bonus life is granted every time the score passes a multiple of this
    pub bonus_life_interval: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            playfield: Playfield::default(),

            ball_radius: BALL_RADIUS,
            ball_start_y: BALL_START_Y,
            ball_start_speed: BALL_START_SPEED,
            serve_speed: BALL_SERVE_SPEED,
            speed_multiplier: BALL_SPEED_MULT,
            paddle_bounce_milestones: PADDLE_BOUNCE_MILESTONES.to_vec(),

            paddle_y: PADDLE_Y,
            paddle_step: PADDLE_STEP,

            starting_lives: STARTING_LIVES,
            bonus_life_interval: BONUS_LIFE_INTERVAL,
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON (unknown fields are ignored, missing ones defaulted)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<GameConfig>(json).map(GameConfig::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp values that would break the simulation back into a usable range
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !self.playfield.contains_layout() {
            log::warn!(
                "Playfield {:?} cannot hold the brick grid, using default",
                self.playfield
            );
            self.playfield = defaults.playfield;
        }
        if !(self.ball_radius > 0.0) {
            log::warn!("ball_radius {} not positive, using default", self.ball_radius);
            self.ball_radius = defaults.ball_radius;
        }
        if !(self.ball_start_speed > 0.0) {
            self.ball_start_speed = defaults.ball_start_speed;
        }
        if !(self.serve_speed > 0.0) {
            self.serve_speed = defaults.serve_speed;
        }
        // Speed must never decrease through a milestone
        if !(self.speed_multiplier >= 1.0) {
            log::warn!("speed_multiplier {} below 1.0, clamping", self.speed_multiplier);
            self.speed_multiplier = 1.0;
        }
        if !(self.paddle_step >= 0.0) {
            self.paddle_step = defaults.paddle_step;
        }
        self.paddle_y = self
            .paddle_y
            .min(self.playfield.top - PADDLE_HEIGHT)
            .max(self.playfield.bottom);
        self.ball_start_y = self
            .ball_start_y
            .min(self.playfield.top - self.ball_radius)
            .max(self.paddle_y);
        if self.bonus_life_interval == 0 {
            self.bonus_life_interval = defaults.bonus_life_interval;
        }
        self.paddle_bounce_milestones.retain(|&n| n > 0);
        self.paddle_bounce_milestones.sort_unstable();
        self.paddle_bounce_milestones.dedup();
        self
    }
}
