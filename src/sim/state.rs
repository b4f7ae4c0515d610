//! Match state and core simulation types
//!
//! Everything that the tick pipeline mutates lives in [`MatchState`]. It is
//! created at reset, mutated in place once per tick and replaced wholesale on
//! the next reset.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::field::{FieldState, Team, Zone};
use crate::consts::*;
use crate::error::{Result, SimError};

/// The ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Position before the most recent integration (goal-line crossing test)
    pub prev_pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Per-tick velocity retention while uncontrolled
    pub friction: f32,
    /// Agent in possession. Sole source of truth for possession.
    pub controller: Option<usize>,
    /// Remaining ticks of a lob during which nobody can take the ball
    #[serde(default)]
    pub airborne_ticks: u32,
}

impl Ball {
    pub fn at_rest(pos: Vec2, friction: f32) -> Self {
        Self {
            pos,
            prev_pos: pos,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            friction,
            controller: None,
            airborne_ticks: 0,
        }
    }
}

/// One agent on the pitch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: usize,
    pub team: Team,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Unit vector of the last non-zero motion
    pub facing: Vec2,
    pub distance_to_ball: f32,
    /// Derived from `Ball::controller` each tick
    pub has_ball: bool,
    pub zone: Zone,
    pub last_action: Option<Action>,
    pub is_pressured: bool,
    pub goals: u32,
    pub assists: u32,
    /// Ticks before this agent may regain a ball it released
    pub recapture_cooldown: u32,
}

impl Agent {
    pub fn new(id: usize, team: Team, pos: Vec2, field: &FieldState) -> Self {
        Self {
            id,
            team,
            pos,
            vel: Vec2::ZERO,
            facing: team.attack_dir(),
            distance_to_ball: 0.0,
            has_ball: false,
            zone: field.zone_for(team, pos),
            last_action: None,
            is_pressured: false,
            goals: 0,
            assists: 0,
            recapture_cooldown: 0,
        }
    }
}

/// Per-team counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    pub score: u32,
    pub shots_taken: u32,
    pub shots_on_target: u32,
    pub passes_completed: u32,
    /// Times this team lost possession to the opponent
    pub turnovers: u32,
}

/// Ways the ball can be released from a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseKind {
    PassShort,
    PassThrough,
    LobPass,
    ShootPower,
    ShootPlaced,
}

impl ReleaseKind {
    pub fn is_shot(&self) -> bool {
        matches!(self, ReleaseKind::ShootPower | ReleaseKind::ShootPlaced)
    }
}

/// A released ball in transit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub kind: ReleaseKind,
    /// Agent who released the ball
    pub agent: usize,
    pub team: Team,
    /// Intended receiver (passes only)
    pub receiver: Option<usize>,
    /// Passer credited if this shot scores (shots only)
    pub assister: Option<usize>,
    pub on_target: bool,
}

/// A completed pass waiting for the receiver's shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistCredit {
    pub receiver: usize,
    pub passer: usize,
}

/// Complete match state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub field: FieldState,
    pub ball: Ball,
    /// Fixed cardinality, indexed by agent id
    pub agents: Vec<Agent>,
    /// Indexed by `Team::index`
    pub teams: [TeamStats; NUM_TEAMS],
    /// Simulation tick counter
    pub time_ticks: u64,
    pub flight: Option<Flight>,
    pub assist_credit: Option<AssistCredit>,
    /// Last agent to control the ball
    pub last_touch: Option<usize>,
    /// Ball returns to the center at the start of the next tick
    pub pending_kickoff: bool,
}

impl MatchState {
    /// Build a fresh match. The first half of `positions` is the home team.
    pub fn new(field: FieldState, positions: &[Vec2], agents_per_team: usize) -> Result<Self> {
        let expected = agents_per_team * NUM_TEAMS;
        if positions.len() != expected {
            return Err(SimError::InvalidInitialPositions(format!(
                "expected {expected} positions, got {}",
                positions.len()
            )));
        }
        if let Some((id, p)) = positions
            .iter()
            .enumerate()
            .find(|(_, p)| !(p.is_finite() && field.contains(**p)))
        {
            return Err(SimError::InvalidInitialPositions(format!(
                "agent {id} at ({}, {}) lies outside the {} x {} field",
                p.x, p.y, field.total_width, field.total_height
            )));
        }

        let agents = positions
            .iter()
            .enumerate()
            .map(|(id, &pos)| {
                let team = if id < agents_per_team {
                    Team::Home
                } else {
                    Team::Away
                };
                Agent::new(id, team, pos, &field)
            })
            .collect();

        let ball = Ball::at_rest(field.center(), field.friction);
        let mut state = Self {
            field,
            ball,
            agents,
            teams: [TeamStats::default(); NUM_TEAMS],
            time_ticks: 0,
            flight: None,
            assist_credit: None,
            last_touch: None,
            pending_kickoff: false,
        };
        state.refresh_distances();
        Ok(state)
    }

    pub fn controller(&self) -> Option<&Agent> {
        self.ball.controller.and_then(|id| self.agents.get(id))
    }

    pub fn team_stats(&self, team: Team) -> &TeamStats {
        &self.teams[team.index()]
    }

    pub fn team_stats_mut(&mut self, team: Team) -> &mut TeamStats {
        &mut self.teams[team.index()]
    }

    /// Recompute every agent's distance to the ball
    pub fn refresh_distances(&mut self) {
        let ball = self.ball.pos;
        for agent in &mut self.agents {
            let d = agent.pos.distance(ball);
            if d < f32::EPSILON {
                log::trace!("agent {} coincides with the ball", agent.id);
                agent.distance_to_ball = 0.0;
            } else {
                agent.distance_to_ball = d;
            }
        }
    }

    /// Re-derive `has_ball` from the ball's controller
    pub fn sync_possession_flags(&mut self) {
        let controller = self.ball.controller;
        for agent in &mut self.agents {
            agent.has_ball = controller == Some(agent.id);
            // Pressure is only tracked on the controller
            agent.is_pressured &= agent.has_ball;
        }
    }

    /// Place the ball at the center, loose and at rest
    pub fn apply_kickoff(&mut self) {
        let center = self.field.center();
        self.ball = Ball::at_rest(center, self.field.friction);
        self.flight = None;
        self.assist_credit = None;
        self.pending_kickoff = false;
        self.sync_possession_flags();
        log::debug!("kickoff at tick {}", self.time_ticks);
    }

    /// Closest agent of `team` to `p`, ties broken by lower id
    pub fn nearest_of_team(&self, team: Team, p: Vec2) -> Option<usize> {
        self.agents
            .iter()
            .filter(|a| a.team == team)
            .min_by(|a, b| {
                a.pos
                    .distance(p)
                    .total_cmp(&b.pos.distance(p))
                    .then(a.id.cmp(&b.id))
            })
            .map(|a| a.id)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::sim::field::Surface;

    #[test]
    fn test_new_match_state() {
        let state = spread_state();
        assert_eq!(state.agents.len(), 22);
        assert_eq!(state.agents[0].team, Team::Home);
        assert_eq!(state.agents[21].team, Team::Away);
        assert_eq!(state.ball.pos, Vec2::new(53.0, 40.5));
        assert_eq!(state.ball.controller, None);
        assert_eq!(state.ball.friction, 0.985);
        assert!(state.agents.iter().all(|a| !a.has_ball && a.goals == 0));
    }

    #[test]
    fn test_wrong_position_count_is_fatal() {
        let field = FieldState::standard(Surface::default());
        let err = MatchState::new(field, &[Vec2::ZERO; 3], AGENTS_PER_TEAM).unwrap_err();
        assert!(matches!(err, SimError::InvalidInitialPositions(_)));
    }

    #[test]
    fn test_out_of_field_position_is_fatal() {
        let field = FieldState::standard(Surface::default());
        let mut positions = spread_positions(AGENTS_PER_TEAM);
        positions[4] = Vec2::new(200.0, 10.0);
        assert!(MatchState::new(field.clone(), &positions, AGENTS_PER_TEAM).is_err());
        positions[4] = Vec2::new(f32::NAN, 10.0);
        assert!(MatchState::new(field, &positions, AGENTS_PER_TEAM).is_err());
    }

    #[test]
    fn test_nearest_of_team_tie() {
        let mut state = spread_state();
        state.agents[2].pos = Vec2::new(50.0, 40.5);
        state.agents[5].pos = Vec2::new(56.0, 40.5);
        assert_eq!(state.nearest_of_team(Team::Home, state.field.center()), Some(2));
    }
}
