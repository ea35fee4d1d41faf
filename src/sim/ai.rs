//! Per-species enemy behavior
//!
//! All enemies share the movement contract from `motion`; what differs
//! per species is when they change direction, whether they cloak or
//! teleport, and how they shoot. Every random draw goes through the
//! session RNG handed in by the caller, never an ambient source.

use glam::{IVec2, Vec2};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::config::GameConfig;
use crate::{AXIS_DIRS, cell_spawn_pos};

use super::maze::MazeGrid;
use super::motion::{self, StepResult};
use super::state::{Enemy, GameEvent, Species};

/// What an enemy wants the session to do after its update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyAction {
    None,
    /// Spawn an enemy bullet from this enemy's center, flying `0`.
    Fire(IVec2),
    /// The bonus creature reached a tunnel exit; despawn without points.
    Escaped,
}

/// Advance one enemy by one tick: timers, movement, and the shooting
/// decision. `speed` is the level-scaled species speed.
#[allow(clippy::too_many_arguments)]
pub(super) fn update_enemy(
    enemy: &mut Enemy,
    maze: &MazeGrid,
    player_pos: Vec2,
    spawn_cells: &[IVec2],
    cfg: &GameConfig,
    speed: f32,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> EnemyAction {
    enemy.frame += 1;
    enemy.shoot_ticks = enemy.shoot_ticks.saturating_sub(1);

    match enemy.species {
        Species::Cloaking => update_cloak(enemy, cfg, rng, events),
        Species::Boss => update_teleport(enemy, maze, spawn_cells, cfg, rng, events),
        _ => {}
    }

    // The boss holds position between teleports; everyone else walks.
    if enemy.species != Species::Boss {
        let max_x = maze.pixel_width() - maze.tile();
        let candidate_x = enemy.pos.x + enemy.dir.x as f32 * speed;

        // The bonus creature leaves through a tunnel mouth instead of
        // wrapping: crossing the playfield edge is its escape.
        if enemy.species == Species::BonusFlee && (candidate_x < 0.0 || candidate_x > max_x) {
            return EnemyAction::Escaped;
        }

        let result = motion::step_entity(&mut enemy.pos, enemy.dir, speed, cfg.corner_slack, maze);
        if result == StepResult::Blocked {
            pick_new_direction(enemy, maze, player_pos, cfg, rng);
        }

        // Occasionally reconsider even when unobstructed.
        if rng.random_bool(cfg.direction_change_chance) {
            pick_new_direction(enemy, maze, player_pos, cfg, rng);
        }
    }

    shooting_decision(enemy, player_pos, maze.tile(), cfg, rng)
}

fn update_cloak(enemy: &mut Enemy, cfg: &GameConfig, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    enemy.cloak_ticks = enemy.cloak_ticks.saturating_sub(1);
    if enemy.cloak_ticks == 0 {
        enemy.visible = !enemy.visible;
        enemy.cloak_ticks = rng.random_range(cfg.cloak_interval.clone());
        events.push(if enemy.visible {
            GameEvent::EnemyBecameVisible
        } else {
            GameEvent::EnemyCloaked
        });
    }
}

fn update_teleport(
    enemy: &mut Enemy,
    maze: &MazeGrid,
    spawn_cells: &[IVec2],
    cfg: &GameConfig,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    enemy.teleport_ticks = enemy.teleport_ticks.saturating_sub(1);
    if enemy.teleport_ticks == 0 {
        debug_assert!(!spawn_cells.is_empty(), "spawn cache validated at construction");
        if let Some(&cell) = spawn_cells.choose(rng) {
            enemy.pos = cell_spawn_pos(cell, maze.tile());
        }
        enemy.teleport_ticks = rng.random_range(cfg.teleport_interval.clone());
        events.push(GameEvent::BossTeleported);
    }
}

/// Re-pick a movement direction from the wall-free candidates.
///
/// Candidates are the axis directions whose two-tile lookahead is clear.
/// An empty candidate set means the enemy is boxed in; it keeps its
/// direction and retries next tick. The bonus creature runs for the
/// nearest tunnel row; everyone else chases the player with a biased
/// coin, falling back to a uniform pick.
pub(super) fn pick_new_direction(
    enemy: &mut Enemy,
    maze: &MazeGrid,
    player_pos: Vec2,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) {
    let lookahead = maze.tile() * 2.0;
    let candidates: Vec<IVec2> = AXIS_DIRS
        .iter()
        .copied()
        .filter(|&d| motion::path_clear(enemy.pos, d, lookahead, maze))
        .collect();

    if candidates.is_empty() {
        return;
    }

    if enemy.species == Species::BonusFlee
        && let Some(dir) = flee_preference(enemy, maze, &candidates)
    {
        enemy.dir = dir;
        return;
    }

    if rng.random_bool(cfg.chase_bias) {
        let dx = (player_pos.x - enemy.pos.x).signum() as i32;
        let dy = (player_pos.y - enemy.pos.y).signum() as i32;
        if dx != 0 && candidates.contains(&IVec2::new(dx, 0)) && rng.random_bool(0.5) {
            enemy.dir = IVec2::new(dx, 0);
            return;
        }
        if dy != 0 && candidates.contains(&IVec2::new(0, dy)) {
            enemy.dir = IVec2::new(0, dy);
            return;
        }
    }

    if let Some(&dir) = candidates.choose(rng) {
        enemy.dir = dir;
    }
}

/// Preferred directions for the fleeing bonus creature: vertical toward
/// the nearest tunnel row, then horizontal along it toward an exit.
fn flee_preference(enemy: &Enemy, maze: &MazeGrid, candidates: &[IVec2]) -> Option<IVec2> {
    let tile = maze.tile();
    let tunnel = maze
        .tunnel_rows()
        .iter()
        .copied()
        .min_by_key(|&r| ((r as f32 * tile - enemy.pos.y).abs() * 100.0) as i64)?;
    let tunnel_y = tunnel as f32 * tile;

    let preferred: &[IVec2] = if enemy.pos.y < tunnel_y - 1.0 {
        &[IVec2::new(0, 1), IVec2::new(-1, 0), IVec2::new(1, 0)]
    } else if enemy.pos.y > tunnel_y + 1.0 {
        &[IVec2::new(0, -1), IVec2::new(-1, 0), IVec2::new(1, 0)]
    } else {
        &[IVec2::new(-1, 0), IVec2::new(1, 0)]
    };

    preferred.iter().copied().find(|d| candidates.contains(d))
}

/// Roll the shot cooldown. The boss fires whenever ready; regular
/// shooters also need the player nearly axis-aligned within range.
fn shooting_decision(
    enemy: &mut Enemy,
    player_pos: Vec2,
    tile: f32,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) -> EnemyAction {
    if !enemy.species.shoots() || enemy.shoot_ticks > 0 {
        return EnemyAction::None;
    }

    if enemy.species == Species::Boss {
        enemy.shoot_ticks = rng.random_range(cfg.boss_reload.clone());
        return EnemyAction::Fire(shoot_direction(enemy.pos, player_pos));
    }

    enemy.shoot_ticks = rng.random_range(cfg.enemy_reload.clone());
    let range = tile * cfg.shoot_proximity_tiles;
    let delta = player_pos - enemy.pos;
    if delta.x.abs() < range || delta.y.abs() < range {
        return EnemyAction::Fire(shoot_direction(enemy.pos, player_pos));
    }
    EnemyAction::None
}

/// Axis-aligned direction toward the target, preferring the axis with
/// the larger separation.
fn shoot_direction(from: Vec2, to: Vec2) -> IVec2 {
    let d = to - from;
    if d.x.abs() >= d.y.abs() {
        IVec2::new(if d.x >= 0.0 { 1 } else { -1 }, 0)
    } else {
        IVec2::new(0, if d.y >= 0.0 { 1 } else { -1 })
    }
}
