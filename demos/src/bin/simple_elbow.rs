//! Elbow arm tracking a waypoint loop, run headlessly.
//!
//! Samples the scene trajectory once per frame, solves the elbow IK, and
//! prints the end-effector position so it can be compared with the target.
//!
//! Run: `cargo run -p robotarm-demos --bin simple_elbow -- --mode linear`

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use robotarm_core::config::{ElbowPreference, InterpolationMode, SceneConfig};
use robotarm_core::ArmError;
use robotarm_demos::{parse_scene, SIMPLE_ELBOW_SCENE};
use robotarm_room::Room;
use robotarm_trajectory::Trajectory;

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Linear,
    Spline,
}

#[derive(Clone, Copy, ValueEnum)]
enum Elbow {
    Up,
    Down,
}

/// Elbow arm following a smooth path through five waypoints.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Scene TOML file (defaults to the built-in elbow loop).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate, overriding the scene.
    #[arg(short, long)]
    frames: Option<usize>,

    /// Interpolation mode, overriding the scene.
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Elbow configuration, overriding the scene.
    #[arg(short, long, value_enum)]
    elbow: Option<Elbow>,
}

fn load_scene(cli: &Cli) -> Result<SceneConfig, ArmError> {
    let mut scene = match &cli.config {
        Some(path) => SceneConfig::from_file(path)?,
        None => parse_scene(SIMPLE_ELBOW_SCENE)?,
    };
    if let Some(frames) = cli.frames {
        scene.frames.count = frames;
    }
    if let Some(mode) = cli.mode {
        scene.trajectory.mode = match mode {
            Mode::Linear => InterpolationMode::Linear,
            Mode::Spline => InterpolationMode::Spline,
        };
    }
    if let Some(elbow) = cli.elbow {
        scene.elbow = match elbow {
            Elbow::Up => ElbowPreference::Up,
            Elbow::Down => ElbowPreference::Down,
        };
    }
    scene.validate()?;
    Ok(scene)
}

fn main() -> Result<(), ArmError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let scene = load_scene(&cli)?;

    println!("=== Simple Elbow ===\n");

    let trajectory = Trajectory::from_config(&scene.trajectory)?;
    let mut room = Room::from_config(&scene)?;
    let times = Room::frames(scene.frames.start, scene.frames.end, scene.frames.count);
    let ticks = room.run(&times);

    for tick in &ticks {
        for frame in &tick.frames {
            let ee = frame.end_effector();
            let target = trajectory.position_at(frame.time);
            println!(
                "  t={:05.2}  {:<12} ee [{:+.3}, {:+.3}, {:+.3}]  err={:.2e}",
                frame.time,
                frame.name,
                ee.x,
                ee.y,
                ee.z,
                (target - ee).norm(),
            );
        }
    }

    let complete = ticks.iter().filter(|tick| tick.is_complete()).count();
    info!(complete, total = ticks.len(), "simulation finished");
    for name in room.names() {
        if let Some(path) = room.trace(name) {
            let length: f64 = path.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
            info!(robot = name, points = path.len(), length, "traced path");
        }
    }
    Ok(())
}
