//! Deterministic game simulation
//!
//! Fixed-timestep: the embedding layer calls [`tick`] once per frame
//! with the sampled input, then drains [`GameState::take_events`] for
//! audio/particle triggers. Given the same maze, config, seed, and
//! input sequence, two runs produce identical states, so all randomness
//! flows through the seeded RNG inside [`GameState`] and nothing here
//! reads clocks or ambient entropy.

mod ai;
mod combat;
pub mod maze;
pub mod motion;
mod state;
mod tick;

pub use maze::{Aabb, Cell, MazeError, MazeGrid};
pub use motion::{BulletFate, StepResult};
pub use state::{
    BULLET_HALF_SIZE, Bullet, Enemy, GameEvent, GamePhase, GameState, Owner, Player, SessionError,
    Species,
};
pub use tick::{TickInput, tick};
