//! Pitch Sim entry point
//!
//! Headless runner: places both teams in a kickoff formation and drives every
//! agent with seeded random actions, so runs are reproducible.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use pitch_sim::consts::*;
use pitch_sim::sim::{ACTION_COUNT, MatchEvent, Team};
use pitch_sim::{FootballEnv, MatchSettings};

#[derive(Parser)]
#[command(name = "pitch-sim")]
#[command(about = "Run a headless football match with random agents", long_about = None)]
struct Cli {
    /// Number of ticks to simulate (15 ticks per second)
    #[arg(long, default_value_t = 900)]
    ticks: u64,

    /// Seed for the action stream
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Pitch surface (e.g. "wet-grass"); unknown keys fall back to the default
    #[arg(long)]
    surface: Option<String>,

    /// JSON file overriding match settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print every step as a JSON line
    #[arg(long)]
    json: bool,
}

/// Home side in a 4-4-2, mirrored for the away side
fn kickoff_formation(agents_per_team: usize) -> Vec<Vec2> {
    const SHAPE: [(f32, f32); 11] = [
        (5.0, 40.5),
        (20.0, 15.0),
        (20.0, 32.0),
        (20.0, 49.0),
        (20.0, 66.0),
        (35.0, 15.0),
        (35.0, 32.0),
        (35.0, 49.0),
        (35.0, 66.0),
        (47.0, 33.0),
        (47.0, 48.0),
    ];
    let total_width = FIELD_WIDTH + 2.0 * OUTER_MARGIN;
    let home: Vec<Vec2> = SHAPE
        .iter()
        .cycle()
        .take(agents_per_team)
        .map(|&(x, y)| Vec2::new(x, y))
        .collect();
    let away: Vec<Vec2> = home
        .iter()
        .map(|p| Vec2::new(total_width - p.x, p.y))
        .collect();
    home.into_iter().chain(away).collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => MatchSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => MatchSettings::default(),
    };
    let surface = cli
        .surface
        .clone()
        .unwrap_or_else(|| settings.surface.key().to_string());

    let mut env = FootballEnv::new(settings)?;
    let positions = kickoff_formation(env.settings().agents_per_team);
    let mut snapshot = env.reset(&surface, &positions)?;

    let mut rng = Pcg32::seed_from_u64(cli.seed);
    let num_agents = env.num_agents();
    let mut goals = 0u32;

    for _ in 0..cli.ticks {
        let actions: Vec<usize> = (0..num_agents)
            .map(|_| rng.random_range(0..ACTION_COUNT))
            .collect();
        let outcome = env.step(&actions)?;

        if cli.json {
            println!("{}", serde_json::to_string(&outcome)?);
        }
        for event in &outcome.events {
            match event {
                MatchEvent::Goal { .. } => goals += 1,
                MatchEvent::OutOfBounds { .. } | MatchEvent::Turnover { .. } => {
                    log::debug!("tick {}: {event:?}", outcome.snapshot.tick)
                }
                _ => {}
            }
        }
        snapshot = outcome.snapshot;
    }

    let home = snapshot.team(Team::Home);
    let away = snapshot.team(Team::Away);
    log::info!("{} goals in {} ticks", goals, snapshot.tick);
    println!(
        "Home {} - {} Away | shots {}/{} ({} on target / {} on target) | passes {}/{}",
        home.score,
        away.score,
        home.shots_taken,
        away.shots_taken,
        home.shots_on_target,
        away.shots_on_target,
        home.passes_completed,
        away.passes_completed,
    );

    Ok(())
}
