//! Breakout - a deterministic brick-breaking simulation core
//!
//! Core modules:
//! - `sim`: Frame-synchronous simulation (collisions, scoring, screens)
//! - `config`: Playfield bounds and gameplay tunables
//! - `snapshot`: Read-only view of the game for a renderer
//!
//! Windowing, input wiring and drawing live outside this crate. A frontend
//! latches its input into a [`sim::TickInput`], calls [`sim::tick`] once per
//! frame and draws from [`GameState::snapshot`].

pub mod config;
pub mod sim;
pub mod snapshot;

pub use config::{GameConfig, Playfield};
pub use sim::GameState;
pub use snapshot::Snapshot;

use glam::Vec2;

/// Game configuration constants (world units, y axis pointing up)
pub mod consts {
    /// Playfield bounds
    pub const PLAYFIELD_LEFT: f32 = 0.0;
    pub const PLAYFIELD_RIGHT: f32 = 20.0;
    pub const PLAYFIELD_TOP: f32 = 26.0;
    pub const PLAYFIELD_BOTTOM: f32 = 0.0;

    /// Brick dimensions, shared by every color tier
    pub const BLOCK_SCALE: f32 = 1.75;
    pub const BLOCK_WIDTH: f32 = 1.0 * BLOCK_SCALE;
    pub const BLOCK_HEIGHT: f32 = 0.3 * BLOCK_SCALE;

    /// Paddle dimensions and placement
    pub const PADDLE_SCALE: f32 = 1.25;
    pub const PADDLE_WIDTH: f32 = 1.5 * PADDLE_SCALE;
    pub const PADDLE_HEIGHT: f32 = 0.15 * PADDLE_SCALE;
    pub const PADDLE_Y: f32 = 2.0;
    /// Horizontal distance covered by one keyboard nudge
    pub const PADDLE_STEP: f32 = 0.5;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.4;
    pub const BALL_START_Y: f32 = 7.0;
    pub const BALL_START_SPEED: f32 = 0.1;
    /// Downward velocity given to a ball when it is served
    pub const BALL_SERVE_SPEED: f32 = 0.1;
    /// Speed multiplier applied when a milestone is consumed
    pub const BALL_SPEED_MULT: f32 = 1.2;
    /// Paddle bounce counts that speed the ball up
    pub const PADDLE_BOUNCE_MILESTONES: [u32; 3] = [4, 8, 12];

    /// Lives and scoring
    pub const STARTING_LIVES: u32 = 3;
    pub const BONUS_LIFE_INTERVAL: u64 = 1000;

    /// Screen layout
    pub const BLOCK_COLUMNS: usize = 10;
    pub const BLOCK_ROWS: usize = 8;
    pub const BLOCK_GAP_X: f32 = 0.2;
    pub const BLOCK_GAP_Y: f32 = 0.1;
    pub const LAYOUT_LEFT: f32 = 0.3;
    pub const LAYOUT_BOTTOM: f32 = 20.0;
    /// Right edge of the last brick column
    pub const LAYOUT_RIGHT: f32 =
        LAYOUT_LEFT + BLOCK_COLUMNS as f32 * (BLOCK_WIDTH + BLOCK_GAP_X) - BLOCK_GAP_X;
    /// Top edge of the highest brick row
    pub const LAYOUT_TOP: f32 =
        LAYOUT_BOTTOM + BLOCK_ROWS as f32 * (BLOCK_HEIGHT + BLOCK_GAP_Y) - BLOCK_GAP_Y;
}

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 650.0,
        }
    }
}

/// Convert a pointer position (pixels, origin top-left) to world coordinates
#[inline]
pub fn screen_to_world(px: f32, py: f32, viewport: Viewport, playfield: &Playfield) -> Vec2 {
    let w = viewport.width.max(1.0);
    let h = viewport.height.max(1.0);
    Vec2::new(
        playfield.left + px / w * playfield.width(),
        playfield.top - py / h * playfield.height(),
    )
}
