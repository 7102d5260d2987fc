//! Game state and core simulation types
//!
//! `GameState` exclusively owns every ball and block. The paddle is stored as
//! the first entry of the block list so the collision pass can walk a single
//! collection in a fixed order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{CollisionAxis, Rect};
use crate::config::{GameConfig, Playfield};
use crate::consts::*;

/// Index of the paddle within `GameState::blocks`
pub const PADDLE_INDEX: usize = 0;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation advances every frame
    Playing,
    /// Simulation frozen, single-stepping allowed
    Paused,
    /// Out of lives; only `reset` leaves this phase
    GameOver,
}

/// A one-shot condition that speeds a ball up when first met
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedMilestone {
    /// The ball has bounced off the paddle this many times
    PaddleBounces(u32),
    /// First orange block hit
    OrangeHit,
    /// First red block hit
    RedHit,
}

/// Pending speed milestones for one ball; each can be taken only once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedMilestones {
    pending: Vec<SpeedMilestone>,
}

impl SpeedMilestones {
    pub fn new(paddle_bounces: &[u32]) -> Self {
        let mut pending: Vec<SpeedMilestone> = paddle_bounces
            .iter()
            .map(|&n| SpeedMilestone::PaddleBounces(n))
            .collect();
        pending.push(SpeedMilestone::OrangeHit);
        pending.push(SpeedMilestone::RedHit);
        Self { pending }
    }

    pub fn is_pending(&self, milestone: SpeedMilestone) -> bool {
        self.pending.contains(&milestone)
    }

    /// Remove the milestone if still pending. Returns true if it was.
    pub fn take(&mut self, milestone: SpeedMilestone) -> bool {
        match self.pending.iter().position(|m| *m == milestone) {
            Some(i) => {
                self.pending.swap_remove(i);
                true
            }
            None => false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// World units per frame
    pub vel: Vec2,
    pub radius: f32,
    /// Magnitude applied when the paddle sets a new direction
    pub speed: f32,
    pub milestones: SpeedMilestones,
    pub paddle_bounces: u32,
    /// Unserved balls sit still until the player launches them
    pub served: bool,
    /// Set once a block has flipped this ball's velocity in the current frame
    pub bounced: bool,
}

impl Ball {
    /// A fresh, unserved ball centered above the paddle
    pub fn new(config: &GameConfig) -> Self {
        Self {
            pos: Vec2::new(config.playfield.center_x(), config.ball_start_y),
            vel: Vec2::ZERO,
            radius: config.ball_radius,
            speed: config.ball_start_speed,
            milestones: SpeedMilestones::new(&config.paddle_bounce_milestones),
            paddle_bounces: 0,
            served: false,
            bounced: false,
        }
    }

    /// Launch the ball toward the paddle. No-op if already served.
    pub fn serve(&mut self, serve_speed: f32) -> bool {
        if self.served {
            return false;
        }
        self.vel.y = -serve_speed;
        self.served = true;
        true
    }

    /// Where the ball was one frame ago
    #[inline]
    pub fn prev_pos(&self) -> Vec2 {
        self.pos - self.vel
    }

    /// Flip one velocity component unless a block already did so this frame
    pub fn bounce(&mut self, axis: CollisionAxis) -> bool {
        if self.bounced {
            return false;
        }
        match axis {
            CollisionAxis::Vertical => self.vel.y = -self.vel.y,
            CollisionAxis::Horizontal => self.vel.x = -self.vel.x,
        }
        self.bounced = true;
        true
    }

    /// Consume a milestone and multiply speed if it was still pending
    pub fn boost(&mut self, milestone: SpeedMilestone, multiplier: f32) -> bool {
        if self.milestones.take(milestone) {
            self.speed *= multiplier;
            log::debug!("Ball speed up ({:?}) -> {}", milestone, self.speed);
            true
        } else {
            false
        }
    }

    /// Move by one frame of velocity
    #[inline]
    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    /// Ball has fallen entirely below the paddle's bottom face.
    ///
    /// This tests the ball's top edge (`y + r < paddle_y`), not its bottom
    /// edge: a ball whose bottom has dipped under the paddle may still be
    /// inside the paddle's contact band and get returned on this frame.
    #[inline]
    pub fn is_below(&self, y: f32) -> bool {
        self.pos.y + self.radius < y
    }
}

/// Block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Yellow,
    Green,
    Orange,
    Red,
    /// The player's paddle; never destroyed
    Paddle,
}

impl BlockKind {
    /// Brick colors stacked bottom to top in every column
    pub const COLUMN_ORDER: [BlockKind; BLOCK_ROWS] = [
        BlockKind::Yellow,
        BlockKind::Yellow,
        BlockKind::Green,
        BlockKind::Green,
        BlockKind::Orange,
        BlockKind::Orange,
        BlockKind::Red,
        BlockKind::Red,
    ];

    /// Points awarded for destroying the block
    pub fn value(self) -> u32 {
        match self {
            BlockKind::Yellow => 1,
            BlockKind::Green => 3,
            BlockKind::Orange => 5,
            BlockKind::Red => 7,
            BlockKind::Paddle => 0,
        }
    }

    pub fn color(self) -> [f32; 3] {
        match self {
            BlockKind::Yellow => [1.0, 1.0, 0.0],
            BlockKind::Green => [0.0, 1.0, 0.0],
            BlockKind::Orange => [1.0, 0.647, 0.0],
            BlockKind::Red => [1.0, 0.0, 0.0],
            BlockKind::Paddle => [1.0, 1.0, 1.0],
        }
    }

    pub fn size(self) -> Vec2 {
        match self {
            BlockKind::Paddle => Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
            _ => Vec2::new(BLOCK_WIDTH, BLOCK_HEIGHT),
        }
    }

    /// Milestone consumed the first time a ball destroys this kind
    pub fn milestone(self) -> Option<SpeedMilestone> {
        match self {
            BlockKind::Orange => Some(SpeedMilestone::OrangeHit),
            BlockKind::Red => Some(SpeedMilestone::RedHit),
            _ => None,
        }
    }

    #[inline]
    pub fn is_paddle(self) -> bool {
        self == BlockKind::Paddle
    }
}

/// A block entity. Destroyed blocks stay in place as inactive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub rect: Rect,
    pub active: bool,
}

impl Block {
    pub fn new(kind: BlockKind, x: f32, y: f32) -> Self {
        let size = kind.size();
        Self {
            kind,
            rect: Rect::new(x, y, size.x, size.y),
            active: true,
        }
    }

    /// The paddle, centered horizontally at the configured height
    pub fn paddle(playfield: &Playfield, y: f32) -> Self {
        Self::new(BlockKind::Paddle, playfield.center_x() - PADDLE_WIDTH / 2.0, y)
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.kind.value()
    }
}

/// Things that happened during the last step, for sound/effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BlockDestroyed { index: usize, kind: BlockKind, value: u32 },
    PaddleHit { ball: usize },
    WallBounce { ball: usize },
    SpeedUp { ball: usize, speed: f32 },
    BonusLife { lives: u32 },
    BallLost { ball: usize, lives_left: u32 },
    ScreenCleared { next_screen: u32 },
    GameOver { score: u64 },
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    pub phase: GamePhase,
    pub lives: u32,
    pub score: u64,
    /// Current screen, starting at 1; also the number of balls in play
    pub screen: u32,
    /// Balls in play, in stable order
    pub balls: Vec<Ball>,
    /// Paddle at `PADDLE_INDEX`, followed by the bricks of the current screen
    pub blocks: Vec<Block>,
    /// Autopilot: the paddle follows the lowest falling ball
    pub cheat: bool,
    /// Simulation steps taken since the last reset
    pub frame: u64,
    /// Events emitted by the most recent step
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        let mut state = Self {
            config: config.sanitized(),
            phase: GamePhase::Playing,
            lives: 0,
            score: 0,
            screen: 1,
            balls: Vec::new(),
            blocks: Vec::new(),
            cheat: false,
            frame: 0,
            events: Vec::new(),
        };
        state.reset();
        state
    }

    /// Start over: fresh lives, score, screen 1, new layout and ball
    pub fn reset(&mut self) {
        self.phase = GamePhase::Playing;
        self.lives = self.config.starting_lives;
        self.score = 0;
        self.screen = 1;
        self.cheat = false;
        self.frame = 0;
        self.events.clear();

        self.blocks.clear();
        self.blocks
            .push(Block::paddle(&self.config.playfield, self.config.paddle_y));
        super::tick::generate_screen(self);
        self.respawn_balls();
        log::info!("New game: {} lives", self.lives);
    }

    /// Replace the balls with `screen`-many fresh, unserved balls
    pub fn respawn_balls(&mut self) {
        let count = self.screen as usize;
        self.balls.clear();
        self.balls.reserve(count);
        for _ in 0..count {
            self.balls.push(Ball::new(&self.config));
        }
    }

    pub fn paddle(&self) -> &Block {
        &self.blocks[PADDLE_INDEX]
    }

    pub(crate) fn paddle_mut(&mut self) -> &mut Block {
        &mut self.blocks[PADDLE_INDEX]
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Bricks still standing (the paddle is not included)
    pub fn active_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|b| b.active && !b.kind.is_paddle())
    }

    /// True once every brick on the screen has been destroyed
    pub fn screen_cleared(&self) -> bool {
        self.active_blocks().next().is_none()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn screen(&self) -> u32 {
        self.screen
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game() {
        let state = GameState::new();
        assert_eq!(state.lives(), 3);
        assert_eq!(state.score(), 0);
        assert_eq!(state.screen(), 1);
        assert_eq!(state.balls().len(), 1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.paddle().kind.is_paddle());
        assert_eq!(state.active_blocks().count(), BLOCK_COLUMNS * BLOCK_ROWS);
    }

    #[test]
    fn test_fresh_ball() {
        let ball = Ball::new(&GameConfig::default());
        assert_eq!(ball.pos, Vec2::new(10.0, BALL_START_Y));
        assert_eq!(ball.vel, Vec2::ZERO);
        assert!(!ball.served);
        assert_eq!(ball.milestones.remaining(), 5);
    }

    #[test]
    fn test_serve_is_idempotent() {
        let mut ball = Ball::new(&GameConfig::default());
        assert!(ball.serve(0.1));
        assert_eq!(ball.vel.y, -0.1);

        ball.vel.y = 0.3;
        assert!(!ball.serve(0.1));
        assert_eq!(ball.vel.y, 0.3);
    }

    #[test]
    fn test_bounce_once_per_frame() {
        let mut ball = Ball::new(&GameConfig::default());
        ball.vel = Vec2::new(0.1, 0.2);
        assert!(ball.bounce(CollisionAxis::Vertical));
        assert!(!ball.bounce(CollisionAxis::Horizontal));
        assert_eq!(ball.vel, Vec2::new(0.1, -0.2));
    }

    #[test]
    fn test_missed_only_when_whole_ball_is_under_paddle() {
        let mut ball = Ball::new(&GameConfig::default());
        // Bottom edge under the paddle, top edge still above it
        ball.pos.y = PADDLE_Y - 0.2;
        assert!(!ball.is_below(PADDLE_Y));

        ball.pos.y = PADDLE_Y - BALL_RADIUS + 0.01;
        assert!(!ball.is_below(PADDLE_Y));

        ball.pos.y = PADDLE_Y - BALL_RADIUS - 0.01;
        assert!(ball.is_below(PADDLE_Y));
    }

    #[test]
    fn test_milestone_taken_once() {
        let mut ball = Ball::new(&GameConfig::default());
        assert!(ball.boost(SpeedMilestone::RedHit, 1.2));
        let speed = ball.speed;
        assert!((speed - 0.12).abs() < 1e-6);
        assert!(!ball.boost(SpeedMilestone::RedHit, 1.2));
        assert_eq!(ball.speed, speed);
        assert!(!ball.milestones.is_pending(SpeedMilestone::RedHit));
        assert!(ball.milestones.is_pending(SpeedMilestone::OrangeHit));
    }

    #[test]
    fn test_block_kinds() {
        assert_eq!(BlockKind::Yellow.value(), 1);
        assert_eq!(BlockKind::Green.value(), 3);
        assert_eq!(BlockKind::Orange.value(), 5);
        assert_eq!(BlockKind::Red.value(), 7);
        assert_eq!(BlockKind::Orange.milestone(), Some(SpeedMilestone::OrangeHit));
        assert_eq!(BlockKind::Green.milestone(), None);
        assert_eq!(BlockKind::Paddle.size(), Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT));
    }

    #[test]
    fn test_respawn_matches_screen() {
        let mut state = GameState::new();
        state.screen = 4;
        state.respawn_balls();
        assert_eq!(state.balls.len(), 4);
        assert!(state.balls.iter().all(|b| !b.served));
    }
}
