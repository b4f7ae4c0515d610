//! Match tuning
//!
//! Everything that is a tuning knob rather than a physical constant lives here
//! and can be overridden from a JSON file. Missing keys keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::AGENTS_PER_TEAM;
use crate::error::{Result, SimError};
use crate::sim::Surface;

/// Tunable match parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Pitch surface used when the caller does not name one
    pub surface: Surface,
    /// Agents per team (two teams)
    pub agents_per_team: usize,

    // === Agent motion (m/s) ===
    pub move_speed: f32,
    pub sprint_speed: f32,
    pub dribble_speed: f32,
    /// Per-tick velocity retention for agents that are not moving
    pub agent_stop_decay: f32,

    // === Possession (meters) ===
    pub capture_radius: f32,
    pub steal_radius: f32,
    pub pressure_radius: f32,
    /// Possession radius multiplier for an agent that dribbled last tick
    pub dribble_tolerance: f32,
    /// Distance of a controlled ball in front of its controller
    pub dribble_offset: f32,
    /// Ticks a releasing agent must wait before regaining the ball
    pub recapture_cooldown_ticks: u32,

    // === Releases (m/s) ===
    pub pass_short_speed: f32,
    pub pass_through_speed: f32,
    pub lob_pass_speed: f32,
    pub shoot_power_speed: f32,
    pub shoot_placed_speed: f32,
    pub max_ball_speed: f32,
    /// Lead distance ahead of a through-pass receiver
    pub through_lead: f32,
    /// Distance inside the far post for placed shots
    pub placed_post_inset: f32,
    /// Ticks a lobbed ball stays out of reach
    pub lob_airborne_ticks: u32,

    /// Speeds below this snap to zero
    pub speed_epsilon: f32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            surface: Surface::default(),
            agents_per_team: AGENTS_PER_TEAM,

            move_speed: 5.0,
            sprint_speed: 8.0,
            dribble_speed: 4.0,
            agent_stop_decay: 0.5,

            capture_radius: 2.5,
            steal_radius: 1.0,
            pressure_radius: 5.0,
            dribble_tolerance: 1.5,
            dribble_offset: 0.5,
            recapture_cooldown_ticks: 8,

            pass_short_speed: 12.0,
            pass_through_speed: 16.0,
            lob_pass_speed: 20.0,
            shoot_power_speed: 30.0,
            shoot_placed_speed: 22.0,
            max_ball_speed: 35.0,
            through_lead: 5.0,
            placed_post_inset: 1.0,
            lob_airborne_ticks: 12,

            speed_epsilon: 0.05,
        }
    }
}

impl MatchSettings {
    /// Parse settings from a JSON document and validate them
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SimError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded match settings from {}", path.display());
        Ok(settings)
    }

    /// Total number of agents on the pitch
    pub fn num_agents(&self) -> usize {
        self.agents_per_team * 2
    }

    /// Reject settings that would make the simulation meaningless
    pub fn validate(&self) -> Result<()> {
        if self.agents_per_team == 0 {
            return Err(SimError::InvalidSettings(
                "agents_per_team must be at least 1".into(),
            ));
        }

        let positive = [
            ("move_speed", self.move_speed),
            ("sprint_speed", self.sprint_speed),
            ("dribble_speed", self.dribble_speed),
            ("capture_radius", self.capture_radius),
            ("steal_radius", self.steal_radius),
            ("pressure_radius", self.pressure_radius),
            ("dribble_tolerance", self.dribble_tolerance),
            ("pass_short_speed", self.pass_short_speed),
            ("pass_through_speed", self.pass_through_speed),
            ("lob_pass_speed", self.lob_pass_speed),
            ("shoot_power_speed", self.shoot_power_speed),
            ("shoot_placed_speed", self.shoot_placed_speed),
            ("max_ball_speed", self.max_ball_speed),
            ("speed_epsilon", self.speed_epsilon),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidSettings(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("dribble_offset", self.dribble_offset),
            ("through_lead", self.through_lead),
            ("placed_post_inset", self.placed_post_inset),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::InvalidSettings(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        if !(self.agent_stop_decay > 0.0 && self.agent_stop_decay < 1.0) {
            return Err(SimError::InvalidSettings(format!(
                "agent_stop_decay must lie in (0, 1), got {}",
                self.agent_stop_decay
            )));
        }

        Ok(())
    }
}
