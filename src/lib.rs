//! Neon Wor - deterministic simulation core for a maze arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze, movement, enemy AI, combat, phases)
//! - `config`: Immutable tunables passed into session construction
//!
//! Rendering, audio, and input mapping are deliberately absent: the
//! simulation exposes read-only state queries and a drained event stream
//! for those layers to consume.

pub mod config;
pub mod sim;

pub use config::GameConfig;
pub use sim::{GameEvent, GamePhase, GameState, MazeGrid, Species, TickInput, tick};

use glam::{IVec2, Vec2};

/// The four axis-aligned movement directions, in the scan order used by
/// direction selection (right, left, down, up).
pub const AXIS_DIRS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
];

/// Margin between an entity's bounding box and its tile edge, in length
/// units. Entity boxes are `tile - 2 * ENTITY_MARGIN` on a side so they
/// clear corridors without clipping walls.
pub const ENTITY_MARGIN: f32 = 2.0;

/// Top-left corner of the entity bounding box spawned inside a cell.
#[inline]
pub fn cell_spawn_pos(cell: IVec2, tile: f32) -> Vec2 {
    cell.as_vec2() * tile + Vec2::splat(ENTITY_MARGIN)
}

/// Grid cell containing a position (entity box origins map to their cell).
#[inline]
pub fn cell_of(pos: Vec2, tile: f32) -> IVec2 {
    (pos / tile).floor().as_ivec2()
}

/// Manhattan distance between two grid cells, in tiles.
#[inline]
pub fn manhattan(a: IVec2, b: IVec2) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
