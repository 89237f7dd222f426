//! Orbit Runner entry point
//!
//! Runs a headless demo round: starts the round, switches lanes on a simple
//! cadence and prints HUD updates until the round ends.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use orbit_runner::audio::{LogSink, SoundTrigger};
use orbit_runner::consts::SIM_DT;
use orbit_runner::platform::{FileStorage, LogLeaderboard, LogSceneRouter};
use orbit_runner::sim::RoundPhase;
use orbit_runner::{FrameInput, RoundConfig, Runner, Services};

fn main() -> Result<()> {
    env_logger::init();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    log::info!("orbit-runner starting with seed {}", seed);

    let services = Services {
        storage: Box::new(FileStorage::open("orbit_runner_store.json")),
        sounds: SoundTrigger::new(Box::new(LogSink)),
        leaderboard: Box::new(LogLeaderboard),
        scene: Box::new(LogSceneRouter),
    };
    let mut runner = Runner::new(RoundConfig::default(), seed, services)?;

    println!("{}", runner.hud().best_text);

    // Tap to play
    runner.on_frame(
        &FrameInput {
            primary_pressed: true,
            ..Default::default()
        },
        SIM_DT,
    );

    // Demo loop: a lane change roughly every 0.8 seconds, 60 second cutoff
    let mut last_score = u32::MAX;
    let max_frames = (60.0 / SIM_DT) as u32;
    for frame_index in 0..max_frames {
        let input = FrameInput {
            primary_pressed: frame_index % 96 == 0,
            ..Default::default()
        };
        runner.on_frame(&input, SIM_DT);

        let hud = runner.hud();
        if runner.state.score != last_score {
            last_score = runner.state.score;
            println!("score: {}", hud.score_text);
        }
        if runner.state.phase == RoundPhase::Ended {
            println!("round over - {} / {}", hud.score_text, hud.best_text);
            break;
        }
    }

    runner.return_to_menu();
    Ok(())
}
