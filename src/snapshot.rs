//! Read-only view of the game for a renderer
//!
//! Instance types are plain-old-data so a GPU frontend can upload them as
//! instance buffers without conversion.

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::sim::{Block, GamePhase, GameState};

/// One ball, as drawn
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct BallInstance {
    pub center: [f32; 2],
    pub radius: f32,
    /// 1.0 while waiting to be served
    pub waiting: f32,
}

/// One rectangle (brick or paddle), as drawn
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct BlockInstance {
    /// Bottom-left corner
    pub position: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
}

/// Everything a frame needs to draw
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub balls: Vec<BallInstance>,
    /// Active bricks only
    pub blocks: Vec<BlockInstance>,
    pub paddle: BlockInstance,
    pub score: u64,
    pub lives: u32,
    pub screen: u32,
    pub paused: bool,
    pub over: bool,
}

impl Snapshot {
    /// Raw bytes of the ball instances
    pub fn ball_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.balls)
    }

    /// Raw bytes of the brick instances
    pub fn block_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }
}

fn rect_instance(block: &Block) -> BlockInstance {
    let [r, g, b] = block.kind.color();
    BlockInstance {
        position: block.rect.pos.to_array(),
        size: block.rect.size.to_array(),
        color: [r, g, b, 1.0],
    }
}

impl GameState {
    /// Capture the drawable state for this frame
    pub fn snapshot(&self) -> Snapshot {
        let balls = self
            .balls
            .iter()
            .map(|b| BallInstance {
                center: b.pos.to_array(),
                radius: b.radius,
                waiting: if b.served { 0.0 } else { 1.0 },
            })
            .collect();

        Snapshot {
            balls,
            blocks: self.active_blocks().map(rect_instance).collect(),
            paddle: rect_instance(self.paddle()),
            score: self.score,
            lives: self.lives,
            screen: self.screen,
            paused: self.phase == GamePhase::Paused,
            over: self.phase == GamePhase::GameOver,
        }
    }
}
