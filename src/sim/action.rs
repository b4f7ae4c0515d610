//! Discrete action catalog and resolution into motion requests
//!
//! Catalog order is part of the external contract: index 0 is idle, 1-9 are
//! moves, 10-18 sprints, then dribble, three passes and two shots.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::field::Team;
use super::state::{MatchState, ReleaseKind};
use crate::direction_to;
use crate::error::{Result, SimError};
use crate::settings::MatchSettings;

/// Number of entries in the action catalog
pub const ACTION_COUNT: usize = 25;

/// Compass directions. `Up` is toward smaller `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl Direction {
    /// Clockwise from `Up`, matching catalog order
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::UpLeft,
    ];

    pub fn unit(&self) -> Vec2 {
        let d = std::f32::consts::FRAC_1_SQRT_2;
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::UpRight => Vec2::new(d, -d),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::DownRight => Vec2::new(d, d),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::DownLeft => Vec2::new(-d, d),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::UpLeft => Vec2::new(-d, -d),
        }
    }
}

/// Where a move or sprint heads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Steering {
    TowardBall,
    Compass(Direction),
}

/// One entry of the action catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Idle,
    Move(Steering),
    Sprint(Steering),
    Dribble,
    PassShort,
    PassThrough,
    LobPass,
    ShootPower,
    ShootPlaced,
}

impl Action {
    pub fn from_index(index: usize) -> Option<Action> {
        let steering = |i: usize| match i {
            0 => Some(Steering::TowardBall),
            1..=8 => Some(Steering::Compass(Direction::ALL[i - 1])),
            _ => None,
        };
        match index {
            0 => Some(Action::Idle),
            1..=9 => steering(index - 1).map(Action::Move),
            10..=18 => steering(index - 10).map(Action::Sprint),
            19 => Some(Action::Dribble),
            20 => Some(Action::PassShort),
            21 => Some(Action::PassThrough),
            22 => Some(Action::LobPass),
            23 => Some(Action::ShootPower),
            24 => Some(Action::ShootPlaced),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        let steering = |s: &Steering| match s {
            Steering::TowardBall => 0,
            Steering::Compass(dir) => {
                1 + Direction::ALL.iter().position(|d| d == dir).unwrap_or_default()
            }
        };
        match self {
            Action::Idle => 0,
            Action::Move(s) => 1 + steering(s),
            Action::Sprint(s) => 10 + steering(s),
            Action::Dribble => 19,
            Action::PassShort => 20,
            Action::PassThrough => 21,
            Action::LobPass => 22,
            Action::ShootPower => 23,
            Action::ShootPlaced => 24,
        }
    }

    /// Release kind for pass/shoot actions
    pub fn release_kind(&self) -> Option<ReleaseKind> {
        match self {
            Action::PassShort => Some(ReleaseKind::PassShort),
            Action::PassThrough => Some(ReleaseKind::PassThrough),
            Action::LobPass => Some(ReleaseKind::LobPass),
            Action::ShootPower => Some(ReleaseKind::ShootPower),
            Action::ShootPlaced => Some(ReleaseKind::ShootPlaced),
            _ => None,
        }
    }

    /// Passes and shots only make sense while holding the ball
    pub fn requires_ball(&self) -> bool {
        self.release_kind().is_some()
    }
}

/// Validate a full action vector before anything is mutated
pub fn parse_actions(indices: &[usize], num_agents: usize) -> Result<Vec<Action>> {
    if indices.len() != num_agents {
        return Err(SimError::ActionCountMismatch {
            expected: num_agents,
            got: indices.len(),
        });
    }
    indices
        .iter()
        .enumerate()
        .map(|(agent, &index)| {
            Action::from_index(index).ok_or(SimError::InvalidAction { agent, index })
        })
        .collect()
}

/// Release parameters for the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseRequest {
    pub kind: ReleaseKind,
    pub target: Vec2,
    pub speed: f32,
    pub receiver: Option<usize>,
}

/// What the integrator should do with one agent this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionRequest {
    /// Decay toward a standstill
    Hold,
    /// Overwrite velocity
    Move { velocity: Vec2 },
    /// Carry the ball forward
    Dribble { velocity: Vec2 },
    /// Detach the ball; the agent itself holds
    Release(ReleaseRequest),
}

/// A pass or shot that was downgraded to idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IllegalAction {
    pub agent: usize,
    pub action: Action,
}

/// Resolve every agent's action in processing order.
///
/// Returns requests indexed by agent id, plus any passes or shots that were
/// requested by agents not holding the ball.
pub fn resolve_actions(
    state: &mut MatchState,
    actions: &[Action],
    order: &[usize],
    settings: &MatchSettings,
) -> (Vec<MotionRequest>, Vec<IllegalAction>) {
    let mut requests = vec![MotionRequest::Hold; state.agents.len()];
    let mut illegal = Vec::new();

    for &id in order {
        let action = actions[id];
        let request = resolve_one(state, id, action, settings);
        if request.is_none() {
            log::debug!("agent {id} requested {action:?} without the ball; treating as idle");
            illegal.push(IllegalAction { agent: id, action });
        }
        requests[id] = request.unwrap_or(MotionRequest::Hold);
        state.agents[id].last_action = Some(action);
    }

    (requests, illegal)
}

/// `None` means the action needs the ball and the agent does not have it
fn resolve_one(
    state: &MatchState,
    id: usize,
    action: Action,
    settings: &MatchSettings,
) -> Option<MotionRequest> {
    let agent = &state.agents[id];
    if action.requires_ball() && state.ball.controller != Some(id) {
        return None;
    }

    let steer = |steering: Steering, speed: f32| {
        let dir = match steering {
            Steering::TowardBall => direction_to(agent.pos, state.ball.pos),
            Steering::Compass(d) => d.unit(),
        };
        MotionRequest::Move {
            velocity: dir * speed,
        }
    };

    let request = match action {
        Action::Idle => MotionRequest::Hold,
        Action::Move(s) => steer(s, settings.move_speed),
        Action::Sprint(s) => steer(s, settings.sprint_speed),
        // Without the ball, a dribble closes in on it at dribbling pace
        Action::Dribble if state.ball.controller != Some(id) => {
            steer(Steering::TowardBall, settings.dribble_speed)
        }
        Action::Dribble => {
            let goal = state.field.goal_attacked_by(agent.team).center();
            let mut dir = direction_to(agent.pos, goal);
            if dir == Vec2::ZERO {
                dir = agent.team.attack_dir();
            }
            MotionRequest::Dribble {
                velocity: dir * settings.dribble_speed,
            }
        }
        _ => {
            let kind = action.release_kind()?;
            MotionRequest::Release(release_request(state, id, kind, settings))
        }
    };
    Some(request)
}

fn release_request(
    state: &MatchState,
    id: usize,
    kind: ReleaseKind,
    settings: &MatchSettings,
) -> ReleaseRequest {
    let agent = &state.agents[id];
    let field = &state.field;
    let fallback = state.ball.pos + agent.team.attack_dir() * 10.0;

    match kind {
        ReleaseKind::PassShort => {
            let receiver = pick_teammate(state, id, |mate| -mate.pos.distance(agent.pos));
            ReleaseRequest {
                kind,
                target: receiver.map_or(fallback, |r| state.agents[r].pos),
                speed: settings.pass_short_speed,
                receiver,
            }
        }
        ReleaseKind::PassThrough => {
            let receiver = pick_teammate(state, id, |mate| field.progress(mate.team, mate.pos));
            let target = receiver.map_or(fallback, |r| {
                state.agents[r].pos + agent.team.attack_dir() * settings.through_lead
            });
            ReleaseRequest {
                kind,
                target: field.clamp(target),
                speed: settings.pass_through_speed,
                receiver,
            }
        }
        ReleaseKind::LobPass => {
            let receiver = pick_teammate(state, id, |mate| mate.pos.distance(agent.pos));
            ReleaseRequest {
                kind,
                target: receiver.map_or(fallback, |r| state.agents[r].pos),
                speed: settings.lob_pass_speed,
                receiver,
            }
        }
        ReleaseKind::ShootPower => ReleaseRequest {
            kind,
            target: field.goal_attacked_by(agent.team).center(),
            speed: settings.shoot_power_speed,
            receiver: None,
        },
        ReleaseKind::ShootPlaced => {
            let goal = field.goal_attacked_by(agent.team);
            // Far post relative to the shooter
            let y = if agent.pos.y < goal.center().y {
                goal.y_bottom - settings.placed_post_inset
            } else {
                goal.y_top + settings.placed_post_inset
            };
            ReleaseRequest {
                kind,
                target: Vec2::new(goal.x, y),
                speed: settings.shoot_placed_speed,
                receiver: None,
            }
        }
    }
}

/// Teammate maximizing `score`, ties broken by lower id
fn pick_teammate(
    state: &MatchState,
    id: usize,
    score: impl Fn(&super::state::Agent) -> f32,
) -> Option<usize> {
    let team: Team = state.agents[id].team;
    state
        .agents
        .iter()
        .filter(|a| a.team == team && a.id != id)
        .max_by(|a, b| score(a).total_cmp(&score(b)).then(b.id.cmp(&a.id)))
        .map(|a| a.id)
}
