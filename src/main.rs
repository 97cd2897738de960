//! Gravitymania headless runner
//!
//! Usage: `gravitymania [settings.json] [ticks] [seed]`
//!
//! Plays the built-in levels with seeded random input and prints the final
//! player state as JSON. `RUST_LOG=info` shows a per-second summary.

#[cfg(not(target_arch = "wasm32"))]
use gravitymania::Settings;
#[cfg(not(target_arch = "wasm32"))]
use gravitymania::consts::TICKS_PER_SECOND;
#[cfg(not(target_arch = "wasm32"))]
use gravitymania::demo::DemoDriver;
#[cfg(not(target_arch = "wasm32"))]
use gravitymania::sim::{GameState, tick};

/// Ten seconds of play
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_TICKS: u64 = 600;
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_SEED: u64 = 12345;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = match args.first() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let ticks = parse_arg(args.get(1), "ticks", DEFAULT_TICKS);
    let seed = parse_arg(args.get(2), "seed", DEFAULT_SEED);

    let mut state = match GameState::with_builtin_levels(settings) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to load built-in levels: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Gravitymania (headless) running {} ticks, seed {}", ticks, seed);

    let mut driver = DemoDriver::new(seed);
    for _ in 0..ticks {
        let input = driver.next_input();
        if !tick(&mut state, &input) {
            continue;
        }
        if state.time_ticks % u64::from(TICKS_PER_SECOND) == 0 {
            for (i, player) in state.players.iter().enumerate() {
                log::info!(
                    "t={}s player {}: pos ({:.1}, {:.1}) vel ({:.2}, {:.2}) grounded={} {:?}",
                    state.time_ticks / u64::from(TICKS_PER_SECOND),
                    i + 1,
                    player.position.x,
                    player.position.y,
                    player.velocity.x,
                    player.velocity.y,
                    player.grounded,
                    player.jump_state
                );
            }
        }
    }

    let summary = serde_json::json!({
        "time_ticks": state.time_ticks,
        "players": state.players,
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize final state: {}", e),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_arg(arg: Option<&String>, name: &str, default: u64) -> u64 {
    match arg {
        Some(text) => text.parse().unwrap_or_else(|e| {
            log::warn!("Invalid {} {:?} ({}), using {}", name, text, e, default);
            default
        }),
        None => default,
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is usable from wasm directly
}
