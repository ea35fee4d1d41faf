//! Headless demo runner
//!
//! Drives a session with a simple autopilot and logs the event stream,
//! which doubles as a smoke test of the simulation without a renderer.
//! Pass a seed as the first argument to reproduce a run.

use glam::Vec2;

use neon_wor::sim::SessionError;
use neon_wor::{GameConfig, GameState, MazeGrid, TickInput, tick};

const MAX_TICKS: u64 = 60 * 60 * 5; // five minutes at 60 tps

fn main() -> Result<(), SessionError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0FFEE);

    let maze = MazeGrid::default_layout();
    let mut state = GameState::new(maze, GameConfig::default(), seed)?;

    while !state.is_over() && state.time_ticks < MAX_TICKS {
        let input = autopilot(&state);
        tick(&mut state, &input);
        for event in state.take_events() {
            log::debug!("t={} {event:?}", state.time_ticks);
        }
    }

    log::info!(
        "run finished: seed={seed} ticks={} phase={:?} score={} lives={}",
        state.time_ticks,
        state.phase,
        state.player.score,
        state.player.lives
    );
    Ok(())
}

/// Walk toward the nearest enemy and hold the trigger. Crude, but it
/// clears dungeons often enough to exercise every phase.
fn autopilot(state: &GameState) -> TickInput {
    let player = state.player.pos;
    let target = state
        .enemies
        .iter()
        .filter(|e| e.visible)
        .min_by_key(|e| (e.pos - player).length_squared() as i64)
        .map(|e| e.pos);

    let mut input = TickInput {
        fire: true,
        ..TickInput::default()
    };
    if let Some(target) = target {
        let delta: Vec2 = target - player;
        // Close the larger axis first so shots line up sooner.
        if delta.x.abs() >= delta.y.abs() {
            input.move_x = delta.x.signum() as i32;
        } else {
            input.move_y = delta.y.signum() as i32;
        }
    }
    input
}
