//! Tick outcome classification
//!
//! Inspects the state after integration: classifies a fresh release, detects
//! goals and out-of-bounds, and applies the matching restart.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::field::{Boundary, FieldState, Team};
use super::physics::{PhysicsOutcome, ReleaseInfo};
use super::state::{Flight, MatchState, ReleaseKind};
use crate::settings::MatchSettings;

/// Why possession changed sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverCause {
    /// Taken from a controller
    Steal,
    /// Pass or shot caught by the other team
    Interception,
    /// Loose ball collected by the other team
    LooseBall,
}

/// Something the shell may want to log or reward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MatchEvent {
    Goal {
        team: Team,
        scorer: Option<usize>,
        assister: Option<usize>,
    },
    OutOfBounds {
        boundary: Boundary,
        restart_agent: Option<usize>,
    },
    Turnover {
        from: usize,
        to: usize,
        cause: TurnoverCause,
    },
    PassCompleted {
        passer: usize,
        receiver: usize,
        team: Team,
    },
    Release {
        agent: usize,
        team: Team,
        kind: ReleaseKind,
        on_target: bool,
    },
    /// Special action requested without the ball, treated as idle
    IllegalAction { agent: usize, action: Action },
}

/// Classify the tick's release, then goals and out-of-bounds
pub fn detect_events(
    state: &mut MatchState,
    outcome: &PhysicsOutcome,
    settings: &MatchSettings,
    events: &mut Vec<MatchEvent>,
) {
    if let Some(release) = &outcome.release {
        classify_release(state, release, events);
    }

    if detect_goal(state, events) {
        return;
    }

    let boundary = outcome.wall.or_else(|| {
        (!state.field.contains(state.ball.pos)).then(|| exit_boundary(&state.field, state.ball.pos))
    });
    if let Some(boundary) = boundary {
        restart_out_of_bounds(state, boundary, settings, events);
    }
}

/// Distance an uncontrolled ball covers before friction stops it
pub fn terminal_reach(speed: f32, friction: f32, dt: f32, field: &FieldState) -> f32 {
    if friction >= 1.0 {
        return field.diagonal();
    }
    (speed * dt / (1.0 - friction)).min(field.diagonal())
}

/// Does the straight-line trajectory end up crossing either goal mouth?
pub fn trajectory_on_target(field: &FieldState, origin: Vec2, velocity: Vec2, dt: f32) -> bool {
    let speed = velocity.length();
    if speed <= 0.0 {
        return false;
    }
    let terminal = origin + velocity / speed * terminal_reach(speed, field.friction, dt, field);
    field.left_goal.crossed_by(origin, terminal) || field.right_goal.crossed_by(origin, terminal)
}

fn classify_release(state: &mut MatchState, release: &ReleaseInfo, events: &mut Vec<MatchEvent>) {
    let team = state.agents[release.agent].team;
    let on_target =
        trajectory_on_target(&state.field, release.origin, release.velocity, release.dt);

    // A shot consumes the shooter's assist credit; any release voids it
    let assister = state
        .assist_credit
        .take()
        .filter(|c| release.kind.is_shot() && c.receiver == release.agent)
        .map(|c| c.passer);

    state.flight = Some(Flight {
        kind: release.kind,
        agent: release.agent,
        team,
        receiver: release.receiver,
        assister,
        on_target,
    });

    log::debug!(
        "agent {} released a {:?} (on target: {on_target})",
        release.agent,
        release.kind
    );
    events.push(MatchEvent::Release {
        agent: release.agent,
        team,
        kind: release.kind,
        on_target,
    });
}

fn detect_goal(state: &mut MatchState, events: &mut Vec<MatchEvent>) -> bool {
    let from = state.ball.prev_pos;
    let to = state.ball.pos;
    let field = &state.field;

    // Team defending the goal that was crossed
    let conceding = if to.x > from.x && field.right_goal.crossed_by(from, to) {
        Team::Away
    } else if to.x < from.x && field.left_goal.crossed_by(from, to) {
        Team::Home
    } else {
        return false;
    };
    let team = conceding.opponent();

    let (scorer, assister) = match (state.flight, state.ball.controller) {
        (Some(f), _) if f.kind.is_shot() && f.team == team => (Some(f.agent), f.assister),
        (None, Some(c)) if state.agents[c].team == team => (Some(c), None),
        _ => (None, None),
    };

    log::info!(
        "GOAL for {team:?} at tick {} (scorer {scorer:?}, assist {assister:?})",
        state.time_ticks
    );
    events.push(MatchEvent::Goal {
        team,
        scorer,
        assister,
    });

    state.ball.controller = None;
    state.flight = None;
    state.assist_credit = None;
    state.pending_kickoff = true;
    state.sync_possession_flags();
    true
}

fn exit_boundary(field: &FieldState, p: Vec2) -> Boundary {
    if p.x < 0.0 {
        Boundary::Left
    } else if p.x > field.total_width {
        Boundary::Right
    } else if p.y < 0.0 {
        Boundary::Top
    } else {
        Boundary::Bottom
    }
}

/// Award the ball to the nearest agent of the team that did not touch it last
fn restart_out_of_bounds(
    state: &mut MatchState,
    boundary: Boundary,
    settings: &MatchSettings,
    events: &mut Vec<MatchEvent>,
) {
    let exit = state.field.clamp(state.ball.pos);
    let team: Team = match state.last_touch {
        Some(id) => state.agents[id].team.opponent(),
        None => state.field.half_owner(exit),
    };
    let restart_agent = state.nearest_of_team(team, exit);

    state.flight = None;
    state.assist_credit = None;
    state.ball.vel = Vec2::ZERO;
    state.ball.airborne_ticks = 0;
    state.ball.pos = exit;
    state.ball.controller = None;

    if let Some(id) = restart_agent {
        let agent = &state.agents[id];
        state.ball.pos = state.field.clamp(agent.pos + agent.facing * settings.dribble_offset);
        state.ball.controller = Some(id);
        state.last_touch = Some(id);
    }
    state.sync_possession_flags();

    log::debug!("ball out over the {boundary:?} line, restart to {restart_agent:?}");
    events.push(MatchEvent::OutOfBounds {
        boundary,
        restart_agent,
    });
}
