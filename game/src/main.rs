// game/src/main.rs
use rook_core::error::EngineError;
use rook_core::logging::logging::init_file_logger;
use rook_core::physics::headless::HeadlessPhysics;
use rook_core::runtime::config::GameConfig;
use rook_core::runtime::runtime::Runtime;
use rook_core::{console_error, console_info};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Headless frame cadence (~60 Hz).
const FRAME_STEP: Duration = Duration::from_micros(16_667);

fn main() {
    init_file_logger();

    if let Err(err) = run() {
        console_error!("{err}");
        std::process::exit(1);
    }
}

/// Loads the game config, brings up the runtime and steps frames until a
/// script requests quit (or the optional frame budget runs out).
fn run() -> Result<(), EngineError> {
    let mut args = std::env::args().skip(1);
    let resource_root = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("resources"));
    let max_frames: Option<u64> = args.next().and_then(|raw| raw.parse().ok());

    let config = GameConfig::load(&resource_root)?;
    if !config.game_title.is_empty() {
        console_info!("{}", config.game_title);
    }

    let mut runtime = Runtime::new(resource_root, Box::new(HeadlessPhysics::new()));

    if let Some(scene) = &config.initial_scene {
        runtime.load_scene(scene)?;
    }

    let mut frames: u64 = 0;
    let mut last_frame = Instant::now();

    while !runtime.quit_requested() {
        let now = Instant::now();
        let dt = (now - last_frame).as_secs_f32();
        last_frame = now;

        runtime.update(dt)?;

        frames += 1;
        if let Some(budget) = max_frames {
            if frames >= budget {
                break;
            }
        }

        std::thread::sleep(FRAME_STEP);
    }

    Ok(())
}
