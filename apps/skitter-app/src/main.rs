//! Headless CLI driver for the skitter kinematics core.
//!
//! Provides three modes of operation:
//! - `walk`: tick the coordinator N times and print leg tips
//! - `retarget`: run the on-demand 3D solver for one leg
//! - `info`: print the effective configuration

use clap::{Parser, Subcommand};
use nalgebra::Point3;

use skitter_body::Body;
use skitter_core::config::SkitterConfig;
use skitter_core::error::SkitterError;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Spider leg kinematics, headless.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the body forward and print leg tips each tick.
    Walk {
        /// Number of simulation ticks.
        #[arg(short = 'n', long, default_value_t = 60)]
        ticks: u32,

        /// Tick duration in seconds.
        #[arg(short, long, default_value_t = 0.05)]
        dt: f32,

        /// Drive the idle oscillator gait instead of ground-following.
        #[arg(long)]
        idle: bool,
    },

    /// Retarget one leg's tip to an explicit world point.
    Retarget {
        /// Leg slot (0-based, interleaved left/right front-to-back).
        #[arg(short, long)]
        leg: usize,

        /// Target world coordinates.
        x: f32,
        y: f32,
        z: f32,
    },

    /// Print the effective configuration.
    Info,
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), SkitterError> {
    let config = match &cli.config {
        Some(path) => SkitterConfig::from_file(path)?,
        None => SkitterConfig::default(),
    };

    match cli.command {
        Commands::Walk { ticks, dt, idle } => walk(config, ticks, dt, idle),
        Commands::Retarget { leg, x, y, z } => retarget(config, leg, Point3::new(x, y, z)),
        Commands::Info => {
            println!("{config:#?}");
            Ok(())
        }
    }
}

fn walk(config: SkitterConfig, ticks: u32, dt: f32, idle: bool) -> Result<(), SkitterError> {
    let mut body = Body::new(config, body_surface())?;
    body.set_idle(idle);

    println!("initial leg tip ground contacts:");
    for (slot, tip) in body.initial_tip_contacts().iter().enumerate() {
        println!("  leg {slot}: ({:.3}, {:.3}, {:.3})", tip.x, tip.y, tip.z);
    }

    body.start_walking_forward();
    for tick in 0..ticks {
        body.update(dt).map_err(SkitterError::Kinematics)?;
        if tick % 10 == 0 {
            let pose = body.pose();
            log::info!(
                "tick {tick}: body at ({:.3}, {:.3}, {:.3}), yaw {:.1} deg",
                pose.position.x,
                pose.position.y,
                pose.position.z,
                pose.yaw_deg
            );
        }
    }

    println!("after {ticks} ticks:");
    for (slot, tip) in body.leg_tips().iter().enumerate() {
        println!("  leg {slot}: ({:.3}, {:.3}, {:.3})", tip.x, tip.y, tip.z);
    }
    if !body.last_reports().is_empty() {
        let worst = body
            .last_reports()
            .iter()
            .map(|r| r.residual)
            .fold(0.0f32, f32::max);
        println!("worst residual this tick: {worst:.4}");
    }
    Ok(())
}

fn retarget(config: SkitterConfig, leg: usize, target: Point3<f32>) -> Result<(), SkitterError> {
    let mut body = Body::new(config, body_surface())?;
    let report = body
        .retarget_leg(leg, target)
        .map_err(SkitterError::Kinematics)?;

    let tip = body.leg_tips()[leg];
    println!(
        "leg {leg} -> ({:.3}, {:.3}, {:.3}): converged={}, iterations={}, residual={:.4}",
        tip.x, tip.y, tip.z, report.converged, report.iterations, report.residual
    );
    Ok(())
}

/// Stand-in for the mesh collaborator: an ellipsoid vertex cloud with the
/// reference body proportions.
fn body_surface() -> Vec<Point3<f32>> {
    let (rx, ry, rz) = (1.2, 0.8, 1.28);
    let (stacks, slices) = (24, 24);
    let mut vertices = Vec::with_capacity((stacks + 1) * (slices + 1));
    for i in 0..=stacks {
        let phi = std::f32::consts::PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = std::f32::consts::TAU * j as f32 / slices as f32;
            vertices.push(Point3::new(
                rx * phi.sin() * theta.cos(),
                ry * phi.cos(),
                rz * phi.sin() * theta.sin(),
            ));
        }
    }
    vertices
}
