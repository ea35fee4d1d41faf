//! Game configuration
//!
//! Every tunable the simulation consults lives here, frozen at session
//! construction. Tests override individual fields to pin down behavior;
//! the defaults reproduce the classic arcade feel.

use serde::{Deserialize, Serialize};

use std::ops::RangeInclusive;

/// Immutable simulation tunables.
///
/// Speeds are in length units per tick, timers in ticks (the simulation
/// runs one tick per rendered frame, nominally 60 Hz).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    // === Movement ===
    /// Player speed.
    pub player_speed: f32,
    /// Global scale applied to every enemy's species speed.
    pub enemy_speed_scale: f32,
    /// Additional enemy speed per level beyond the first
    /// (multiplier = 1 + step * (level - 1)).
    pub level_speed_step: f32,
    /// Extra slack beyond half a tile when testing corner-slide alignment.
    pub corner_slack: f32,

    // === Shooting ===
    /// Bullet speed (both owners).
    pub bullet_speed: f32,
    /// Ticks before an undestroyed bullet expires.
    pub bullet_ttl: u32,
    /// Ticks between player shots.
    pub player_shoot_cooldown: u32,
    /// Reload range for regular shooting enemies.
    pub enemy_reload: RangeInclusive<u32>,
    /// Reload range for the boss (aggressive).
    pub boss_reload: RangeInclusive<u32>,
    /// Initial shot delay rolled at enemy spawn.
    pub initial_shot_delay: RangeInclusive<u32>,
    /// Regular enemies only fire when the player is within this many
    /// tiles on one axis. The boss ignores it.
    pub shoot_proximity_tiles: f32,

    // === AI ===
    /// Per-tick chance an enemy reconsiders its direction unprompted.
    pub direction_change_chance: f64,
    /// Chance a direction change is biased toward the player.
    pub chase_bias: f64,
    /// Cloak/uncloak countdown range for cloaking enemies.
    pub cloak_interval: RangeInclusive<u32>,
    /// First teleport countdown rolled at boss spawn.
    pub initial_teleport_delay: RangeInclusive<u32>,
    /// Countdown between subsequent boss teleports.
    pub teleport_interval: RangeInclusive<u32>,
    /// Whether a cloaked enemy can be hit by player bullets.
    pub cloaked_hittable: bool,

    // === Waves & phases ===
    /// Normal-wave composition: (Basic, Cloaking, Aggressive) counts.
    pub wave_composition: (usize, usize, usize),
    /// Minimum Manhattan distance (tiles) between a wave spawn cell and
    /// the player spawn cell.
    pub min_spawn_distance: i32,
    /// Ticks between the last normal kill and the bonus creature.
    pub bonus_delay: u32,
    /// Ticks between the bonus creature's removal and the boss.
    pub boss_delay: u32,
    /// Ticks between the boss kill and victory.
    pub victory_delay: u32,

    // === Player ===
    /// Starting lives.
    pub starting_lives: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_speed: 5.0,
            enemy_speed_scale: 0.3,
            level_speed_step: 0.1,
            corner_slack: 4.0,
            bullet_speed: 14.0,
            bullet_ttl: 240,
            player_shoot_cooldown: 12,
            enemy_reload: 90..=200,
            boss_reload: 30..=60,
            initial_shot_delay: 30..=90,
            shoot_proximity_tiles: 2.0,
            direction_change_chance: 0.03,
            chase_bias: 0.6,
            cloak_interval: 60..=120,
            initial_teleport_delay: 90..=180,
            teleport_interval: 60..=120,
            cloaked_hittable: false,
            wave_composition: (3, 2, 1),
            min_spawn_distance: 6,
            bonus_delay: 60,
            boss_delay: 90,
            victory_delay: 60,
            starting_lives: 3,
        }
    }
}

impl GameConfig {
    /// Enemy speed multiplier for a given 1-based level.
    pub fn level_multiplier(&self, level: u32) -> f32 {
        1.0 + self.level_speed_step * level.saturating_sub(1) as f32
    }
}
