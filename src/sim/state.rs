//! Game state and core simulation types
//!
//! Everything that must persist for save/restore and determinism lives
//! here. Iteration order over enemies and bullets is spawn order, kept
//! stable by monotonically increasing entity ids.

use glam::{IVec2, Vec2};
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::config::GameConfig;
use crate::{AXIS_DIRS, cell_of, cell_spawn_pos};

use super::maze::{Aabb, MazeError, MazeGrid};

/// Wave-progression phase of a session. Strictly monotonic apart from
/// the GameOver interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Regular wave of basic/cloaking/aggressive enemies.
    Normal,
    /// The fleeing bonus creature is (or is about to be) loose.
    BonusCreature,
    /// The teleporting boss holds the dungeon.
    Boss,
    /// Dungeon cleared; terminal for this session.
    Victory,
    /// Lives exhausted; terminal for this session.
    GameOver,
}

/// Enemy behavioral category. Species fixes speed, score value, health,
/// and which AI policy applies.
///
/// The arcade ancestry: Basic=burwor, Cloaking=garwor, Aggressive=thorwor,
/// BonusFlee=worluk, Boss=wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Basic,
    Cloaking,
    Aggressive,
    BonusFlee,
    Boss,
}

impl Species {
    /// Unscaled species speed, in length units per tick.
    pub fn base_speed(self) -> f32 {
        match self {
            Species::Basic | Species::Cloaking => 3.0,
            Species::Aggressive => 4.0,
            Species::BonusFlee => 5.0,
            // The boss never walks; it teleports.
            Species::Boss => 0.0,
        }
    }

    /// Score awarded for a kill.
    pub fn points(self) -> u32 {
        match self {
            Species::Basic => 100,
            Species::Cloaking => 200,
            Species::Aggressive => 500,
            Species::BonusFlee => 1000,
            Species::Boss => 2500,
        }
    }

    /// Whether this species fires bullets.
    pub fn shoots(self) -> bool {
        matches!(self, Species::Cloaking | Species::Aggressive | Species::Boss)
    }

    /// Starting health (hits to kill).
    pub fn health(self) -> u8 {
        match self {
            Species::Boss => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Species::Basic => "basic",
            Species::Cloaking => "cloaking",
            Species::Aggressive => "aggressive",
            Species::BonusFlee => "bonus",
            Species::Boss => "boss",
        };
        f.write_str(name)
    }
}

/// Who fired a bullet; decides which collisions it participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// The player avatar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Bounding-box origin (top-left), in length units.
    pub pos: Vec2,
    /// Facing/movement direction (axis unit or zero).
    pub dir: IVec2,
    pub lives: u8,
    pub score: u64,
    /// Ticks until the next shot is allowed.
    pub shoot_cooldown: u32,
    /// Respawn position, fixed at session start.
    pub spawn: Vec2,
    /// Animation counter for the rendering layer.
    pub frame: u32,
}

impl Player {
    fn new(spawn: Vec2, lives: u8) -> Self {
        Self {
            pos: spawn,
            dir: IVec2::new(1, 0),
            lives,
            score: 0,
            shoot_cooldown: 0,
            spawn,
            frame: 0,
        }
    }

    pub fn bbox(&self, size: f32) -> Aabb {
        Aabb::square(self.pos, size)
    }

    /// Center point, where fired bullets originate.
    pub fn center(&self, size: f32) -> Vec2 {
        self.pos + Vec2::splat(size / 2.0)
    }
}

/// One enemy. Which timers are live depends on the species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub species: Species,
    pub pos: Vec2,
    pub dir: IVec2,
    pub health: u8,
    /// Cloaking species toggle this; everyone else stays visible.
    pub visible: bool,
    /// Ticks to the next cloak toggle (Cloaking only).
    pub cloak_ticks: u32,
    /// Ticks to the next teleport (Boss only).
    pub teleport_ticks: u32,
    /// Ticks to the next shot opportunity (shooting species only).
    pub shoot_ticks: u32,
    /// Animation counter for the rendering layer.
    pub frame: u32,
    /// Cleared during a tick, swept in a second pass.
    pub alive: bool,
}

impl Enemy {
    fn spawn(id: u32, species: Species, pos: Vec2, cfg: &GameConfig, rng: &mut Pcg32) -> Self {
        let dir = *AXIS_DIRS
            .choose(rng)
            .unwrap_or(&IVec2::new(1, 0));
        Self {
            id,
            species,
            pos,
            dir,
            health: species.health(),
            visible: true,
            cloak_ticks: if species == Species::Cloaking {
                rng.random_range(cfg.cloak_interval.clone())
            } else {
                0
            },
            teleport_ticks: if species == Species::Boss {
                rng.random_range(cfg.initial_teleport_delay.clone())
            } else {
                0
            },
            shoot_ticks: if species.shoots() {
                rng.random_range(cfg.initial_shot_delay.clone())
            } else {
                0
            },
            frame: 0,
            alive: true,
        }
    }

    pub fn bbox(&self, size: f32) -> Aabb {
        Aabb::square(self.pos, size)
    }

    pub fn center(&self, size: f32) -> Vec2 {
        self.pos + Vec2::splat(size / 2.0)
    }
}

/// Radius of a bullet's square hit box.
pub const BULLET_HALF_SIZE: f32 = 4.0;

/// One bullet in flight. `pos` is the center point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub dir: IVec2,
    pub owner: Owner,
    /// Remaining lifetime; expiry destroys the bullet even in open space.
    pub ttl_ticks: u32,
    pub alive: bool,
}

impl Bullet {
    pub fn bbox(&self) -> Aabb {
        Aabb::square(self.pos - Vec2::splat(BULLET_HALF_SIZE), BULLET_HALF_SIZE * 2.0)
    }
}

/// Notifications for the excluded audio/particle layers, drained once
/// per tick via [`GameState::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned(Species),
    EnemyKilled { species: Species, points: u32 },
    EnemyCloaked,
    EnemyBecameVisible,
    PlayerFired,
    EnemyFired,
    PlayerHit,
    BonusAppeared,
    BonusEscaped,
    BossAppeared,
    BossTeleported,
    PhaseAdvanced(GamePhase),
    Victory,
    GameOver,
}

/// Session construction failures. All fatal; no recovery path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Maze(MazeError),
    /// The validated maze yielded no spawn cells.
    NoSpawnCells,
    /// No open cell suitable for the player start.
    NoPlayerSpawn,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Maze(e) => write!(f, "invalid maze: {e}"),
            SessionError::NoSpawnCells => write!(f, "maze has no valid spawn cells"),
            SessionError::NoPlayerSpawn => write!(f, "no player spawn position available"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Maze(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MazeError> for SessionError {
    fn from(e: MazeError) -> Self {
        SessionError::Maze(e)
    }
}

/// Complete session state: aggregate root owning the maze, the player,
/// and every live entity. Deterministic given (maze, config, seed) and
/// the input sequence; serializable for snapshot save/load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed, kept for reproduction/reporting.
    pub seed: u64,
    /// Live RNG; the only nondeterministic input, and it is seeded.
    pub rng: Pcg32,
    /// 1-based dungeon counter; scales enemy speed between sessions.
    pub level: u32,
    pub phase: GamePhase,
    /// Ticks spent waiting in the current empty-dungeon delay.
    pub phase_ticks: u32,
    pub time_ticks: u64,
    pub config: GameConfig,
    /// Read-only after construction.
    pub maze: MazeGrid,
    /// Cached valid spawn cells, computed once from the maze.
    pub spawn_cells: Vec<IVec2>,
    pub player: Player,
    /// Spawn order; order carries no gameplay meaning.
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    next_id: u32,
    /// Transient per-tick notifications; not part of a snapshot.
    #[serde(skip)]
    pub(super) events: Vec<GameEvent>,
}

impl GameState {
    /// Build a fresh session and spawn the first wave.
    pub fn new(maze: MazeGrid, config: GameConfig, seed: u64) -> Result<Self, SessionError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let spawn_cells = maze.spawn_cells();
        if spawn_cells.is_empty() {
            return Err(SessionError::NoSpawnCells);
        }

        let player_spawn = find_player_spawn(&maze, &spawn_cells, &mut rng)
            .ok_or(SessionError::NoPlayerSpawn)?;

        let mut state = Self {
            seed,
            rng,
            level: 1,
            phase: GamePhase::Normal,
            phase_ticks: 0,
            time_ticks: 0,
            player: Player::new(player_spawn, config.starting_lives),
            config,
            maze,
            spawn_cells,
            enemies: Vec::new(),
            bullets: Vec::new(),
            next_id: 1,
            events: Vec::new(),
        };

        log::info!(
            "session start: seed={} level={} spawn_cells={}",
            state.seed,
            state.level,
            state.spawn_cells.len()
        );
        super::tick::spawn_wave(&mut state);
        Ok(state)
    }

    /// Rebuild wholesale for the next dungeon: score carries over, the
    /// level counter increments, everything else starts fresh.
    pub fn next_level(&self, seed: u64) -> Result<Self, SessionError> {
        let mut next = Self::new(self.maze.clone(), self.config.clone(), seed)?;
        next.level = self.level + 1;
        next.player.score = self.player.score;
        Ok(next)
    }

    /// Rebuild the current dungeon from scratch: same level, fresh
    /// entities, score reset.
    pub fn restart_level(&self, seed: u64) -> Result<Self, SessionError> {
        let mut next = Self::new(self.maze.clone(), self.config.clone(), seed)?;
        next.level = self.level;
        Ok(next)
    }

    /// Allocate a new entity id.
    pub(super) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(super) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain the buffered notifications (audio/particle triggers).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawn one enemy of a species at a cell and announce it.
    pub(super) fn spawn_enemy(&mut self, species: Species, cell: IVec2) {
        let pos = cell_spawn_pos(cell, self.maze.tile());
        let id = self.next_entity_id();
        let cfg = self.config.clone();
        let enemy = Enemy::spawn(id, species, pos, &cfg, &mut self.rng);
        self.enemies.push(enemy);
        self.push_event(GameEvent::EnemySpawned(species));
    }

    pub(super) fn spawn_bullet(&mut self, pos: Vec2, dir: IVec2, owner: Owner) {
        let id = self.next_entity_id();
        let ttl_ticks = self.config.bullet_ttl;
        self.bullets.push(Bullet {
            id,
            pos,
            dir,
            owner,
            ttl_ticks,
            alive: true,
        });
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Terminal check; `tick` is a no-op once this is true.
    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::Victory | GamePhase::GameOver)
    }

    /// Grid cell the player currently occupies.
    pub fn player_cell(&self) -> IVec2 {
        cell_of(self.player.pos, self.maze.tile())
    }

    /// Enemy speed for this session's level, in units per tick.
    pub fn enemy_speed(&self, species: Species) -> f32 {
        species.base_speed() * self.config.enemy_speed_scale * self.config.level_multiplier(self.level)
    }

    /// Snapshot the session as JSON (events are transient and excluded).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a snapshot produced by [`GameState::to_json`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Classic arcade placement: bottom-left corner of the dungeon, falling
/// back to bottom-right, then any open cell in the bottom half.
fn find_player_spawn(maze: &MazeGrid, cells: &[IVec2], rng: &mut Pcg32) -> Option<Vec2> {
    let tile = maze.tile();
    let row = maze.height() as i32 - 2;

    for col in 1..4 {
        let cell = IVec2::new(col, row);
        if cells.contains(&cell) {
            return Some(cell_spawn_pos(cell, tile));
        }
    }
    let w = maze.width() as i32;
    for col in ((w - 3)..(w - 1)).rev() {
        let cell = IVec2::new(col, row);
        if cells.contains(&cell) {
            return Some(cell_spawn_pos(cell, tile));
        }
    }

    let bottom: Vec<IVec2> = cells
        .iter()
        .copied()
        .filter(|c| c.y > maze.height() as i32 / 2)
        .collect();
    bottom
        .choose(rng)
        .or_else(|| cells.first())
        .map(|&c| cell_spawn_pos(c, tile))
}
