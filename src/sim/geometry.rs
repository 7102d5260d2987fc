//! Axis-aligned rectangle geometry for blocks and the paddle
//!
//! A rectangle is anchored at its bottom-left corner (y axis points up).
//! Balls are circles but are tested against rectangles through their
//! bounding square; corners are not geometrically exact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, anchored bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

/// Which face of a rectangle a ball struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionAxis {
    /// Top or bottom face, reflects `vel.y`
    Vertical,
    /// Left or right face, reflects `vel.x`
    Horizontal,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size / 2.0
    }

    /// Broad-phase circle test: the circle's bounding square must overlap the
    /// rectangle on both axes (strict).
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let d = (center - self.center()).abs();
        let reach = self.half_extents() + Vec2::splat(radius);
        d.x < reach.x && d.y < reach.y
    }

    /// Paddle-style edge test: strict horizontally, inclusive on the top and
    /// bottom faces so a ball resting exactly on the paddle still counts.
    pub fn touches_circle_inclusive_y(&self, center: Vec2, radius: f32) -> bool {
        center.x + radius > self.left()
            && center.x - radius < self.right()
            && center.y + radius >= self.bottom()
            && center.y - radius <= self.top()
    }

    /// Classify a hit from the ball's motion over the last frame.
    ///
    /// `prev` is where the ball was one frame ago. If its top edge moved up
    /// across the bottom face, or its bottom edge moved down across the top
    /// face, the hit is vertical; anything else is treated as a side hit.
    pub fn classify_hit(&self, center: Vec2, prev: Vec2, radius: f32) -> CollisionAxis {
        let crossed_bottom = prev.y + radius <= self.bottom() && center.y + radius > self.bottom();
        let crossed_top = prev.y - radius >= self.top() && center.y - radius < self.top();
        if crossed_bottom || crossed_top {
            CollisionAxis::Vertical
        } else {
            CollisionAxis::Horizontal
        }
    }

    /// Clamp the rectangle's x so it stays within `[left, right - width]`
    pub fn clamp_x(&mut self, left: f32, right: f32) {
        let max_x = (right - self.size.x).max(left);
        self.pos.x = self.pos.x.clamp(left, max_x);
    }
}
