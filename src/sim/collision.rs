//! Collision detection and response
//!
//! Bricks reflect a ball by flipping one velocity component. The paddle
//! replaces the velocity entirely, with an angle chosen from where on the
//! paddle the ball landed.

use glam::Vec2;

use super::state::{Ball, Block, BlockKind, SpeedMilestone};
use crate::config::{GameConfig, Playfield};

/// Horizontal direction components, from paddle center outward
const DEFLECTION_STEPS: [f32; 4] = [0.05, 0.25, 0.5, 1.5];

impl Block {
    /// Test this block against a ball and apply the collision response.
    ///
    /// Returns true on contact, whether or not the ball's velocity changed.
    pub fn resolve_collision(&mut self, ball: &mut Ball, config: &GameConfig) -> bool {
        match self.kind {
            BlockKind::Paddle => resolve_paddle_collision(self, ball, config),
            BlockKind::Yellow | BlockKind::Green | BlockKind::Orange | BlockKind::Red => {
                resolve_brick_collision(self, ball, config)
            }
        }
    }
}

/// Brick hit: deactivate, flip one axis (once per frame), maybe speed up
fn resolve_brick_collision(block: &mut Block, ball: &mut Ball, config: &GameConfig) -> bool {
    if !block.active || !block.rect.overlaps_circle(ball.pos, ball.radius) {
        return false;
    }

    block.active = false;
    let axis = block.rect.classify_hit(ball.pos, ball.prev_pos(), ball.radius);
    let flipped = ball.bounce(axis);
    log::debug!(
        "{:?} block hit at {:?}: axis={:?} flipped={}",
        block.kind,
        block.rect.pos,
        axis,
        flipped
    );

    if let Some(milestone) = block.kind.milestone() {
        ball.boost(milestone, config.speed_multiplier);
    }
    true
}

/// Paddle hit: count the bounce, then aim the ball by impact offset
fn resolve_paddle_collision(paddle: &Block, ball: &mut Ball, config: &GameConfig) -> bool {
    // Only a falling ball can strike the paddle; a ball already sent upward
    // may still overlap it for a few frames.
    if ball.vel.y >= 0.0 || !paddle.rect.touches_circle_inclusive_y(ball.pos, ball.radius) {
        return false;
    }

    ball.paddle_bounces += 1;
    ball.boost(
        SpeedMilestone::PaddleBounces(ball.paddle_bounces),
        config.speed_multiplier,
    );

    let dx = ball.pos.x - paddle.rect.center().x;
    let max_dx = paddle.rect.size.x / 2.0;
    let dir = Vec2::new(paddle_deflection(dx, max_dx), 1.0);
    ball.vel = dir.normalize() * ball.speed;
    log::debug!(
        "Paddle hit #{}: dx={:.3} vel={:?}",
        ball.paddle_bounces,
        dx,
        ball.vel
    );
    true
}

/// Map an impact offset to a horizontal direction component.
///
/// Seven buckets, symmetric about the center. Comparisons are strict, so an
/// offset exactly on a bucket boundary falls through to the steepest bucket,
/// and `dx == 0` takes the (slightly) leftward center bucket.
pub fn paddle_deflection(dx: f32, max_dx: f32) -> f32 {
    let [center, inner, outer, edge] = DEFLECTION_STEPS;
    if dx > 0.0 {
        if dx < max_dx / 4.0 {
            center
        } else if dx > max_dx / 4.0 && dx < max_dx / 2.0 {
            inner
        } else if dx > max_dx / 2.0 && dx < max_dx {
            outer
        } else {
            edge
        }
    } else if dx > -max_dx / 4.0 {
        -center
    } else if dx < -max_dx / 4.0 && dx > -max_dx / 2.0 {
        -inner
    } else if dx < -max_dx / 2.0 && dx > -max_dx {
        -outer
    } else {
        -edge
    }
}

/// Reflect a ball off the side walls and ceiling. There is no floor.
///
/// A component is only flipped while the ball is still heading out of the
/// playfield, so a ball that overshot a wall cannot get stuck flipping.
pub fn ball_wall_collision(ball: &mut Ball, field: &Playfield) -> bool {
    let r = ball.radius;
    let mut hit = false;

    if ball.pos.y > field.top - r && ball.vel.y > 0.0 {
        ball.vel.y = -ball.vel.y;
        hit = true;
    }
    if (ball.pos.x < field.left + r && ball.vel.x < 0.0)
        || (ball.pos.x > field.right - r && ball.vel.x > 0.0)
    {
        ball.vel.x = -ball.vel.x;
        hit = true;
    }
    if hit {
        log::debug!("Wall bounce at {:?}", ball.pos);
    }
    hit
}
