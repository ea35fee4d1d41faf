//! Fixed-timestep session update
//!
//! Order within a tick is part of the contract: player, enemies,
//! bullets, collisions, corpse sweep, phase machine. Keeping the order
//! fixed is what makes a (seed, inputs) pair replayable.

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::manhattan;

use super::ai::{self, EnemyAction};
use super::combat;
use super::motion::{self, BulletFate};
use super::state::{GameEvent, GamePhase, GameState, Owner, Species};

/// One tick's worth of player input, already mapped from whatever the
/// embedding layer reads. Axes are -1/0/1; the horizontal axis wins
/// when both are held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub move_x: i32,
    pub move_y: i32,
    pub fire: bool,
}

/// Advance the session by one tick. No-op once the session is over.
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.is_over() {
        return;
    }
    state.time_ticks += 1;

    update_player(state, input);
    update_enemies(state);
    update_bullets(state);
    combat::resolve(state);

    state.enemies.retain(|e| e.alive);
    state.bullets.retain(|b| b.alive);

    update_phase(state);
}

fn update_player(state: &mut GameState, input: &TickInput) {
    let dir = if input.move_x != 0 {
        IVec2::new(input.move_x.signum(), 0)
    } else if input.move_y != 0 {
        IVec2::new(0, input.move_y.signum())
    } else {
        IVec2::ZERO
    };

    if dir != IVec2::ZERO {
        let speed = state.config.player_speed;
        let slack = state.config.corner_slack;
        state.player.dir = dir;
        state.player.frame += 1;
        let GameState { player, maze, .. } = state;
        motion::step_entity(&mut player.pos, dir, speed, slack, maze);
    }

    if input.fire && state.player.shoot_cooldown == 0 {
        let center = state.player.center(state.maze.entity_size());
        let fire_dir = state.player.dir;
        state.spawn_bullet(center, fire_dir, Owner::Player);
        state.push_event(GameEvent::PlayerFired);
        state.player.shoot_cooldown = state.config.player_shoot_cooldown;
    } else {
        state.player.shoot_cooldown = state.player.shoot_cooldown.saturating_sub(1);
    }
}

fn update_enemies(state: &mut GameState) {
    let size = state.maze.entity_size();
    let level = state.level;
    let player_pos = state.player.pos;
    let mut shots: Vec<(Vec2, IVec2)> = Vec::new();

    {
        let GameState {
            enemies,
            maze,
            config,
            spawn_cells,
            rng,
            events,
            ..
        } = state;
        for enemy in enemies.iter_mut() {
            let speed =
                enemy.species.base_speed() * config.enemy_speed_scale * config.level_multiplier(level);
            match ai::update_enemy(enemy, maze, player_pos, spawn_cells, config, speed, rng, events)
            {
                EnemyAction::None => {}
                EnemyAction::Fire(dir) => shots.push((enemy.center(size), dir)),
                EnemyAction::Escaped => {
                    enemy.alive = false;
                    events.push(GameEvent::BonusEscaped);
                    log::debug!("bonus escaped through a tunnel");
                }
            }
        }
    }

    for (pos, dir) in shots {
        state.spawn_bullet(pos, dir, Owner::Enemy);
        state.push_event(GameEvent::EnemyFired);
    }
}

fn update_bullets(state: &mut GameState) {
    let GameState {
        bullets,
        maze,
        config,
        ..
    } = state;
    for bullet in bullets.iter_mut().filter(|b| b.alive) {
        match motion::step_bullet(&mut bullet.pos, bullet.dir, config.bullet_speed, maze) {
            BulletFate::Flying => {
                bullet.ttl_ticks = bullet.ttl_ticks.saturating_sub(1);
                if bullet.ttl_ticks == 0 {
                    bullet.alive = false;
                }
            }
            BulletFate::HitWall | BulletFate::OutOfBounds => bullet.alive = false,
        }
    }
}

/// Empty-dungeon phase machine. Phases only ever advance; GameOver is
/// set by combat, never here.
fn update_phase(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    if !state.enemies.is_empty() {
        state.phase_ticks = 0;
        return;
    }

    state.phase_ticks += 1;
    match state.phase {
        GamePhase::Normal if state.phase_ticks >= state.config.bonus_delay => spawn_bonus(state),
        GamePhase::BonusCreature if state.phase_ticks >= state.config.boss_delay => {
            spawn_boss(state)
        }
        GamePhase::Boss if state.phase_ticks >= state.config.victory_delay => {
            state.phase = GamePhase::Victory;
            state.push_event(GameEvent::PhaseAdvanced(GamePhase::Victory));
            state.push_event(GameEvent::Victory);
            log::info!(
                "dungeon {} cleared: score={}",
                state.level,
                state.player.score
            );
        }
        _ => {}
    }
}

/// Populate a fresh dungeon: the composed wave, placed on distinct
/// random cells in the upper half, away from the player spawn.
pub(super) fn spawn_wave(state: &mut GameState) {
    let (basics, cloakers, aggressives) = state.config.wave_composition;
    let min_dist = state.config.min_spawn_distance;
    let player_cell = crate::cell_of(state.player.spawn, state.maze.tile());
    let half = state.maze.height() as i32 / 2;

    let mut eligible: Vec<IVec2> = state
        .spawn_cells
        .iter()
        .copied()
        .filter(|&c| c.y < half && manhattan(c, player_cell) >= min_dist)
        .collect();

    let mut roster: Vec<Species> = Vec::with_capacity(basics + cloakers + aggressives);
    roster.extend(std::iter::repeat(Species::Basic).take(basics));
    roster.extend(std::iter::repeat(Species::Cloaking).take(cloakers));
    roster.extend(std::iter::repeat(Species::Aggressive).take(aggressives));

    let mut spawned = 0usize;
    for species in roster {
        if eligible.is_empty() {
            break;
        }
        let i = state.rng.random_range(0..eligible.len());
        let cell = eligible.swap_remove(i);
        state.spawn_enemy(species, cell);
        spawned += 1;
    }
    log::info!("wave spawned: {spawned} enemies on level {}", state.level);
}

fn spawn_bonus(state: &mut GameState) {
    let i = state.rng.random_range(0..state.spawn_cells.len());
    let cell = state.spawn_cells[i];
    state.phase = GamePhase::BonusCreature;
    state.phase_ticks = 0;
    state.spawn_enemy(Species::BonusFlee, cell);
    state.push_event(GameEvent::PhaseAdvanced(GamePhase::BonusCreature));
    state.push_event(GameEvent::BonusAppeared);
    log::info!("bonus creature loose");
}

fn spawn_boss(state: &mut GameState) {
    let i = state.rng.random_range(0..state.spawn_cells.len());
    let cell = state.spawn_cells[i];
    state.phase = GamePhase::Boss;
    state.phase_ticks = 0;
    state.spawn_enemy(Species::Boss, cell);
    state.push_event(GameEvent::PhaseAdvanced(GamePhase::Boss));
    state.push_event(GameEvent::BossAppeared);
    log::info!("boss has appeared");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::maze::MazeGrid;

    fn session(seed: u64) -> GameState {
        GameState::new(MazeGrid::default_layout(), GameConfig::default(), seed).unwrap()
    }

    #[test]
    fn test_wave_spawns_away_from_player() {
        let state = session(1);
        let player_cell = crate::cell_of(state.player.spawn, state.maze.tile());
        let half = state.maze.height() as i32 / 2;
        let mut seen = Vec::new();
        for enemy in &state.enemies {
            let cell = crate::cell_of(enemy.pos, state.maze.tile());
            assert!(cell.y < half, "spawned in the lower half: {cell:?}");
            assert!(manhattan(cell, player_cell) >= state.config.min_spawn_distance);
            assert!(!seen.contains(&cell), "duplicate spawn cell {cell:?}");
            seen.push(cell);
        }
    }

    #[test]
    fn test_fire_at_adjacent_enemy_scores() {
        let mut state = session(2);
        state.enemies.clear();
        state.spawn_enemy(Species::Basic, IVec2::new(3, 13));
        state.take_events();

        // Hold fire without moving; the facing direction starts rightward
        // and the bullet covers the two-tile gap in a handful of ticks.
        let input = TickInput {
            fire: true,
            ..TickInput::default()
        };
        let mut killed_at = None;
        for n in 1..=20 {
            tick(&mut state, &input);
            if state
                .take_events()
                .iter()
                .any(|e| matches!(e, GameEvent::EnemyKilled { .. }))
            {
                killed_at = Some(n);
                break;
            }
        }
        assert!(killed_at.is_some(), "enemy survived 20 ticks");
        assert_eq!(state.player.score, 100);
        assert_eq!(state.enemy_count(), 0);
    }

    #[test]
    fn test_determinism_same_seed_same_run() {
        let script = |n: u64| TickInput {
            move_x: match n % 7 {
                0 | 1 => 1,
                2 => -1,
                _ => 0,
            },
            move_y: match n % 5 {
                0 => 1,
                3 => -1,
                _ => 0,
            },
            fire: n % 3 == 0,
        };

        let mut a = session(1234);
        let mut b = session(1234);
        for n in 0..600 {
            let input = script(n);
            tick(&mut a, &input);
            tick(&mut b, &input);
            a.take_events();
            b.take_events();
        }
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn test_phase_progression_after_clear() {
        let mut state = session(3);
        let idle = TickInput::default();

        // Clear the wave by fiat; sixty empty ticks summon the bonus.
        state.enemies.clear();
        for _ in 0..60 {
            assert_eq!(state.phase, GamePhase::Normal);
            tick(&mut state, &idle);
        }
        assert_eq!(state.phase, GamePhase::BonusCreature);
        assert_eq!(state.enemy_count(), 1);
        assert_eq!(state.enemies[0].species, Species::BonusFlee);
        assert!(state.take_events().contains(&GameEvent::BonusAppeared));

        // Bonus down; ninety empty ticks summon the boss.
        state.enemies.clear();
        for _ in 0..90 {
            assert_eq!(state.phase, GamePhase::BonusCreature);
            tick(&mut state, &idle);
        }
        assert_eq!(state.phase, GamePhase::Boss);
        assert_eq!(state.enemy_count(), 1);
        assert_eq!(state.enemies[0].species, Species::Boss);
        assert!(state.take_events().contains(&GameEvent::BossAppeared));

        // Boss down; the victory delay runs out and the session ends.
        state.enemies.clear();
        state.bullets.clear();
        for _ in 0..60 {
            assert_eq!(state.phase, GamePhase::Boss);
            tick(&mut state, &idle);
        }
        assert_eq!(state.phase, GamePhase::Victory);
        let events = state.take_events();
        assert!(events.contains(&GameEvent::Victory));
        assert!(events.contains(&GameEvent::PhaseAdvanced(GamePhase::Victory)));
        assert!(state.is_over());
    }

    #[test]
    fn test_phases_never_regress() {
        let order = |p: GamePhase| match p {
            GamePhase::Normal => 0,
            GamePhase::BonusCreature => 1,
            GamePhase::Boss => 2,
            GamePhase::Victory | GamePhase::GameOver => 3,
        };

        let mut state = session(4);
        let idle = TickInput::default();
        let mut last = order(state.phase);
        for _ in 0..2000 {
            // Keep clearing the field so the machine keeps advancing.
            if state.time_ticks % 10 == 0 {
                state.enemies.clear();
            }
            tick(&mut state, &idle);
            state.take_events();
            let now = order(state.phase);
            assert!(now >= last, "phase regressed");
            last = now;
        }
    }

    #[test]
    fn test_bullet_expires_in_open_tunnel() {
        // A single fully-open tunnel row: a horizontal bullet wraps
        // forever and only the lifetime cap removes it.
        let rows: [&[u8]; 3] = [
            &[1, 1, 1, 1, 1],
            &[0, 0, 0, 0, 0],
            &[1, 1, 1, 1, 1],
        ];
        let maze = MazeGrid::from_rows(&rows, 41.0).unwrap();
        // Stall the phase machine so nothing else enters the field.
        let config = GameConfig {
            bonus_delay: u32::MAX,
            ..GameConfig::default()
        };
        let mut state = GameState::new(maze, config, 5).unwrap();
        state.enemies.clear();
        state.bullets.clear();
        state.spawn_bullet(
            Vec2::new(100.0, 1.5 * 41.0),
            IVec2::new(1, 0),
            Owner::Player,
        );

        let ttl = state.config.bullet_ttl;
        let idle = TickInput::default();
        for _ in 0..ttl {
            assert!(!state.bullets.is_empty());
            tick(&mut state, &idle);
            state.take_events();
        }
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_terminal_session_ignores_ticks() {
        let mut state = session(6);
        state.phase = GamePhase::GameOver;
        let before = state.to_json().unwrap();
        tick(
            &mut state,
            &TickInput {
                move_x: 1,
                fire: true,
                ..TickInput::default()
            },
        );
        assert_eq!(state.to_json().unwrap(), before);
        assert_eq!(state.time_ticks, 0);
    }
}
