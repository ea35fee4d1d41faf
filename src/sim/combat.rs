//! Collision resolution
//!
//! Runs after movement each tick. Hits only mark entities dead; the
//! tick loop sweeps the corpses afterwards, so nothing here removes
//! elements while iterating.

use super::state::{GameEvent, GamePhase, GameState, Owner, Player};

/// Resolve every overlap for this tick: player bullets against enemies,
/// enemy bullets against the player, and direct contact.
pub(super) fn resolve(state: &mut GameState) {
    let size = state.maze.entity_size();
    let cloaked_hittable = state.config.cloaked_hittable;

    let GameState {
        player,
        enemies,
        bullets,
        events,
        phase,
        ..
    } = state;

    // A player bullet spends itself on the first enemy it overlaps.
    // Cloaked enemies pass untouched; the bullet flies on.
    for bullet in bullets
        .iter_mut()
        .filter(|b| b.alive && b.owner == Owner::Player)
    {
        let bbox = bullet.bbox();
        for enemy in enemies.iter_mut().filter(|e| e.alive) {
            if !enemy.visible && !cloaked_hittable {
                continue;
            }
            if bbox.intersects(&enemy.bbox(size)) {
                bullet.alive = false;
                enemy.health = enemy.health.saturating_sub(1);
                if enemy.health == 0 {
                    enemy.alive = false;
                    let points = enemy.species.points();
                    player.score += u64::from(points);
                    events.push(GameEvent::EnemyKilled {
                        species: enemy.species,
                        points,
                    });
                    log::debug!("{} killed (+{points})", enemy.species);
                }
                break;
            }
        }
    }

    // Enemy bullets against the player. The box is re-read per bullet
    // so a respawned player is checked at the respawn position.
    for bullet in bullets
        .iter_mut()
        .filter(|b| b.alive && b.owner == Owner::Enemy)
    {
        if *phase == GamePhase::GameOver {
            break;
        }
        if bullet.bbox().intersects(&player.bbox(size)) {
            bullet.alive = false;
            hit_player(player, phase, events);
        }
    }

    // Touching an enemy costs a life too, cloaked or not.
    if *phase != GamePhase::GameOver {
        let player_bbox = player.bbox(size);
        if enemies
            .iter()
            .any(|e| e.alive && e.bbox(size).intersects(&player_bbox))
        {
            hit_player(player, phase, events);
        }
    }
}

/// One life lost. On the last life the session ends where the player
/// stands; otherwise the player returns to the session spawn point.
fn hit_player(player: &mut Player, phase: &mut GamePhase, events: &mut Vec<GameEvent>) {
    player.lives = player.lives.saturating_sub(1);
    events.push(GameEvent::PlayerHit);
    if player.lives == 0 {
        *phase = GamePhase::GameOver;
        events.push(GameEvent::GameOver);
        log::info!("game over: score={}", player.score);
    } else {
        player.pos = player.spawn;
        log::debug!("player hit, {} lives left", player.lives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::maze::MazeGrid;
    use crate::sim::state::Species;
    use glam::IVec2;

    fn session() -> GameState {
        GameState::new(MazeGrid::default_layout(), GameConfig::default(), 11).unwrap()
    }

    fn clear_field(state: &mut GameState) {
        state.enemies.clear();
        state.bullets.clear();
        state.take_events();
    }

    #[test]
    fn test_player_bullet_kills_enemy() {
        let mut state = session();
        clear_field(&mut state);
        state.spawn_enemy(Species::Basic, IVec2::new(3, 13));
        let size = state.maze.entity_size();
        let center = state.enemies[0].center(size);
        state.spawn_bullet(center, IVec2::new(1, 0), Owner::Player);

        resolve(&mut state);

        assert!(!state.enemies[0].alive);
        assert!(!state.bullets[0].alive);
        assert_eq!(state.player.score, 100);
        let events = state.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::EnemyKilled {
                species: Species::Basic,
                points: 100
            }
        )));
    }

    #[test]
    fn test_bullet_spends_on_single_enemy() {
        let mut state = session();
        clear_field(&mut state);
        state.spawn_enemy(Species::Basic, IVec2::new(3, 13));
        state.spawn_enemy(Species::Basic, IVec2::new(3, 13));
        let size = state.maze.entity_size();
        let center = state.enemies[0].center(size);
        state.spawn_bullet(center, IVec2::new(1, 0), Owner::Player);

        resolve(&mut state);

        let dead = state.enemies.iter().filter(|e| !e.alive).count();
        assert_eq!(dead, 1);
        assert_eq!(state.player.score, 100);
    }

    #[test]
    fn test_cloaked_enemy_not_hittable() {
        let mut state = session();
        clear_field(&mut state);
        state.spawn_enemy(Species::Cloaking, IVec2::new(3, 13));
        state.enemies[0].visible = false;
        let size = state.maze.entity_size();
        let center = state.enemies[0].center(size);
        state.spawn_bullet(center, IVec2::new(1, 0), Owner::Player);

        resolve(&mut state);

        // The bullet flies through without spending itself.
        assert!(state.enemies[0].alive);
        assert!(state.bullets[0].alive);
        assert_eq!(state.player.score, 0);
    }

    #[test]
    fn test_boss_takes_multiple_hits() {
        let mut state = session();
        clear_field(&mut state);
        state.spawn_enemy(Species::Boss, IVec2::new(3, 13));
        let size = state.maze.entity_size();
        let center = state.enemies[0].center(size);
        state.spawn_bullet(center, IVec2::new(1, 0), Owner::Player);

        resolve(&mut state);

        assert!(state.enemies[0].alive);
        assert_eq!(state.enemies[0].health, 2);
        assert_eq!(state.player.score, 0);
    }

    #[test]
    fn test_enemy_bullet_costs_life_and_respawns() {
        let mut state = session();
        clear_field(&mut state);
        let size = state.maze.entity_size();
        state.player.pos = state.player.spawn + glam::Vec2::new(41.0, 0.0);
        let center = state.player.center(size);
        state.spawn_bullet(center, IVec2::new(0, 1), Owner::Enemy);

        resolve(&mut state);

        assert_eq!(state.player.lives, 2);
        assert_eq!(state.player.pos, state.player.spawn);
        assert_eq!(state.phase, GamePhase::Normal);
        assert!(state.take_events().contains(&GameEvent::PlayerHit));
    }

    #[test]
    fn test_last_life_contact_ends_session_in_place() {
        let mut state = session();
        clear_field(&mut state);
        state.player.lives = 1;
        let off_spawn = state.player.spawn + glam::Vec2::new(41.0, 0.0);
        state.player.pos = off_spawn;
        let cell = crate::cell_of(off_spawn, state.maze.tile());
        state.spawn_enemy(Species::Aggressive, cell);

        resolve(&mut state);

        assert_eq!(state.player.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        // No respawn on the final life.
        assert_eq!(state.player.pos, off_spawn);
        let events = state.take_events();
        assert!(events.contains(&GameEvent::PlayerHit));
        assert!(events.contains(&GameEvent::GameOver));
    }

    #[test]
    fn test_contact_with_cloaked_enemy_still_hurts() {
        let mut state = session();
        clear_field(&mut state);
        state.player.pos = state.player.spawn + glam::Vec2::new(41.0, 0.0);
        let cell = crate::cell_of(state.player.pos, state.maze.tile());
        state.spawn_enemy(Species::Cloaking, cell);
        state.enemies[0].visible = false;

        resolve(&mut state);

        assert_eq!(state.player.lives, 2);
        assert_eq!(state.player.pos, state.player.spawn);
    }
}
