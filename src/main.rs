//! Breakout headless entry point
//!
//! Runs the simulation without a window: the paddle is driven by the
//! autopilot and balls are served after a random delay. Useful for soak
//! testing the physics and for profiling.
//!
//! Usage: `breakout [config.json] [frames] [seed]`

use std::path::Path;

use breakout::GameConfig;
use breakout::sim::{GameEvent, GameState, TickInput, tick};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

const DEFAULT_FRAMES: u64 = 20_000;
const DEFAULT_SEED: u64 = 12345;

/// Load a config file, falling back to defaults on any problem
fn load_config(path: Option<&str>) -> GameConfig {
    let Some(path) = path.filter(|p| !p.is_empty() && *p != "-") else {
        log::info!("Using default config");
        return GameConfig::default();
    };

    match std::fs::read_to_string(Path::new(path)) {
        Ok(json) => match GameConfig::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                log::warn!("Invalid config {}: {}; using defaults", path, e);
                GameConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Cannot read config {}: {}; using defaults", path, e);
            GameConfig::default()
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str));
    let frames = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);
    let seed = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    log::info!("Breakout (headless) starting: {} frames, seed {}", frames, seed);

    let mut rng = Pcg32::seed_from_u64(seed);
    let mut state = GameState::with_config(config);
    let mut serve_in: u32 = rng.random_range(10..120);
    let mut screens_cleared = 0u32;
    let mut balls_lost = 0u32;

    tick(
        &mut state,
        &TickInput {
            toggle_cheat: true,
            ..Default::default()
        },
    );

    for _ in 0..frames {
        let mut input = TickInput::default();
        if state.balls().iter().any(|b| !b.served) {
            if serve_in == 0 {
                input.serve = true;
                serve_in = rng.random_range(10..120);
            } else {
                serve_in -= 1;
            }
        }

        tick(&mut state, &input);

        for event in &state.events {
            match event {
                GameEvent::ScreenCleared { .. } => screens_cleared += 1,
                GameEvent::BallLost { .. } => balls_lost += 1,
                _ => {}
            }
        }
        if state.is_over() {
            break;
        }
    }

    log::info!(
        "Finished after {} frames: {} screens cleared, {} balls lost",
        state.frame,
        screens_cleared,
        balls_lost
    );

    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}
