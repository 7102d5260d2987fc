//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One fixed step per frame, velocities in world units per frame
//! - Stable iteration order (paddle first, then bricks by index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod state;
pub mod tick;

pub use collision::{ball_wall_collision, paddle_deflection};
pub use geometry::{CollisionAxis, Rect};
pub use state::{
    Ball, Block, BlockKind, GameEvent, GamePhase, GameState, SpeedMilestone, SpeedMilestones,
    PADDLE_INDEX,
};
pub use tick::{Direction, TickInput, generate_screen, tick};
