//! Read-only observation assembly

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::field::{Team, Zone};
use super::state::{MatchState, TeamStats};
use crate::consts::NUM_TEAMS;

/// What one agent sees of itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentObservation {
    pub id: usize,
    pub team: Team,
    pub position: Vec2,
    pub velocity: Vec2,
    pub distance_to_ball: f32,
    pub has_ball: bool,
    pub zone: Zone,
    pub is_pressured: bool,
    pub last_action: Option<Action>,
    pub goals: u32,
    pub assists: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallObservation {
    pub position: Vec2,
    pub velocity: Vec2,
    pub controller: Option<usize>,
}

/// State visible to the caller between ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub agents: Vec<AgentObservation>,
    /// Indexed by `Team::index`
    pub teams: [TeamStats; NUM_TEAMS],
    pub ball: BallObservation,
}

impl Snapshot {
    pub fn team(&self, team: Team) -> &TeamStats {
        &self.teams[team.index()]
    }
}

pub fn build_snapshot(state: &MatchState) -> Snapshot {
    let agents = state
        .agents
        .iter()
        .map(|a| AgentObservation {
            id: a.id,
            team: a.team,
            position: a.pos,
            velocity: a.vel,
            distance_to_ball: a.distance_to_ball,
            has_ball: a.has_ball,
            zone: a.zone,
            is_pressured: a.is_pressured,
            last_action: a.last_action,
            goals: a.goals,
            assists: a.assists,
        })
        .collect();

    Snapshot {
        tick: state.time_ticks,
        agents,
        teams: state.teams,
        ball: BallObservation {
            position: state.ball.pos,
            velocity: state.ball.vel,
            controller: state.ball.controller,
        },
    }
}
