//! Entity movement against the maze
//!
//! One movement contract shared by the player and every walking enemy:
//! wrap horizontally at the playfield edges, test the candidate box
//! against the walls, and on a block attempt the corner-slide correction
//! that nudges the entity toward the nearest aligned corridor. Without
//! the slide, turning at an intersection demands pixel-perfect alignment
//! and the maze feels stuck.

use glam::{IVec2, Vec2};

use crate::ENTITY_MARGIN;

use super::maze::{Aabb, MazeGrid};

/// Outcome of one movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Candidate position committed (possibly wrapped).
    Advanced,
    /// Blocked, but slid toward a corridor opening instead.
    Slid,
    /// Blocked with no opening; position unchanged.
    Blocked,
}

/// Advance an entity box origin by one tick along an axis direction.
///
/// The horizontal wrap is unconditional and applies before the wall
/// test, so a tunnel row carries the entity to the opposite edge even
/// though out-of-bounds cells read as walls.
pub fn step_entity(pos: &mut Vec2, dir: IVec2, speed: f32, slack: f32, maze: &MazeGrid) -> StepResult {
    if dir == IVec2::ZERO {
        return StepResult::Advanced;
    }

    let size = maze.entity_size();
    let max_x = maze.pixel_width() - maze.tile();

    let mut new_x = pos.x + dir.x as f32 * speed;
    let new_y = pos.y + dir.y as f32 * speed;
    if new_x < 0.0 {
        new_x = max_x;
    } else if new_x > max_x {
        new_x = 0.0;
    }

    let candidate = Aabb::square(Vec2::new(new_x, new_y), size);
    if !maze.collides(&candidate) {
        *pos = Vec2::new(new_x, new_y);
        return StepResult::Advanced;
    }

    let tile = maze.tile();
    let tolerance = tile / 2.0 + slack;

    if dir.x != 0 {
        // Blocked horizontally: search for a row-aligned opening at the
        // candidate x, trying the nearest row first, then one tile off.
        let base = (pos.y / tile).round() * tile + ENTITY_MARGIN;
        for k in [0.0, -1.0, 1.0] {
            let target = base + k * tile;
            let offset = target - pos.y;
            if offset.abs() > tolerance {
                continue;
            }
            if maze.collides(&Aabb::square(Vec2::new(new_x, target), size)) {
                continue;
            }
            // Slide vertically toward the opening, clamped to speed, and
            // only commit if the partial position itself is clear.
            let delta = offset.abs().min(speed) * offset.signum();
            let slid = Vec2::new(pos.x, pos.y + delta);
            if !maze.collides(&Aabb::square(slid, size)) {
                *pos = slid;
                return StepResult::Slid;
            }
        }
    }

    if dir.y != 0 {
        // Symmetric case: blocked vertically, search column alignment.
        let base = (pos.x / tile).round() * tile + ENTITY_MARGIN;
        for k in [0.0, -1.0, 1.0] {
            let target = base + k * tile;
            let offset = target - pos.x;
            if offset.abs() > tolerance {
                continue;
            }
            if maze.collides(&Aabb::square(Vec2::new(target, new_y), size)) {
                continue;
            }
            let delta = offset.abs().min(speed) * offset.signum();
            let slid = Vec2::new(pos.x + delta, pos.y);
            if !maze.collides(&Aabb::square(slid, size)) {
                *pos = slid;
                return StepResult::Slid;
            }
        }
    }

    StepResult::Blocked
}

/// Whether an entity box could travel `dist` along `dir` wall-free.
/// Samples the midpoint and the endpoint so a one-tile wall inside a
/// two-tile probe still blocks. Ignores wraparound: an off-field probe
/// reads as blocked.
pub fn path_clear(pos: Vec2, dir: IVec2, dist: f32, maze: &MazeGrid) -> bool {
    let size = maze.entity_size();
    for t in [0.5, 1.0] {
        let probe = pos + dir.as_vec2() * (dist * t);
        if probe.x < 0.0
            || probe.y < 0.0
            || probe.x + size > maze.pixel_width()
            || probe.y + size > maze.pixel_height()
        {
            return false;
        }
        if maze.collides(&Aabb::square(probe, size)) {
            return false;
        }
    }
    true
}

/// What became of a bullet after one movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletFate {
    Flying,
    HitWall,
    OutOfBounds,
}

/// Advance a bullet center point. Horizontal edges wrap like entities;
/// vertical exit and wall tiles destroy the bullet.
pub fn step_bullet(pos: &mut Vec2, dir: IVec2, speed: f32, maze: &MazeGrid) -> BulletFate {
    *pos += dir.as_vec2() * speed;

    let width = maze.pixel_width();
    if pos.x < 0.0 {
        pos.x = width;
    } else if pos.x > width {
        pos.x = 0.0;
    }

    let tile = maze.tile();
    let col = (pos.x / tile).floor() as i32;
    let row = (pos.y / tile).floor() as i32;
    let in_grid = col >= 0
        && row >= 0
        && (col as usize) < maze.width()
        && (row as usize) < maze.height();
    if in_grid && maze.is_wall(col, row) {
        return BulletFate::HitWall;
    }

    if pos.y < 0.0 || pos.y > maze.pixel_height() {
        return BulletFate::OutOfBounds;
    }

    BulletFate::Flying
}
