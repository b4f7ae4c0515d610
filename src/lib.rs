//! Pitch Sim - a deterministic 2D football match engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (possession, actions, physics, events, stats)
//! - `env`: Reset/step surface consumed by controllers
//! - `settings`: Data-driven tuning loaded from JSON
//! - `error`: Setup and input errors

pub mod env;
pub mod error;
pub mod settings;
pub mod sim;

pub use env::{FootballEnv, StepOutcome};
pub use error::{Result, SimError};
pub use settings::MatchSettings;

use glam::Vec2;

/// Match configuration constants
pub mod consts {
    /// Fixed simulation timestep (15 Hz)
    pub const SIM_DT: f32 = 1.0 / 15.0;

    /// Field dimensions (meters)
    pub const FIELD_WIDTH: f32 = 100.0;
    pub const FIELD_HEIGHT: f32 = 75.0;
    pub const OUTER_MARGIN: f32 = 3.0;
    /// Goal mouth length, independent of field size
    pub const GOAL_WIDTH: f32 = 7.32;

    /// Ball radius (meters)
    pub const BALL_RADIUS: f32 = 0.11;
    /// Agent body radius used for agent-agent separation
    pub const AGENT_RADIUS: f32 = 0.4;

    /// Teams per match
    pub const NUM_TEAMS: usize = 2;
    /// Default squad size
    pub const AGENTS_PER_TEAM: usize = 11;
}

/// Unit vector toward `to`, or zero when the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Snap small vectors to zero so friction decay terminates
#[inline]
pub fn snap_to_zero(v: Vec2, epsilon: f32) -> Vec2 {
    if v.length_squared() < epsilon * epsilon {
        Vec2::ZERO
    } else {
        v
    }
}
