//! Fixed-timestep integration of agents and ball
//!
//! Agents move in processing order so that separation against earlier agents
//! is reproducible. The ball is then released, pinned to its controller, or
//! advanced freely under surface friction.

use glam::Vec2;

use super::action::{MotionRequest, ReleaseRequest};
use super::collision::{ball_wall_contacts, reflect_velocity, separate_bodies};
use super::field::{Boundary, FieldState};
use super::state::{Ball, MatchState, ReleaseKind};
use crate::consts::AGENT_RADIUS;
use crate::settings::MatchSettings;
use crate::{direction_to, snap_to_zero};

/// A ball that left its controller this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseInfo {
    pub agent: usize,
    pub kind: ReleaseKind,
    pub receiver: Option<usize>,
    /// Ball position at the moment of release
    pub origin: Vec2,
    /// Launch velocity, before friction
    pub velocity: Vec2,
    pub dt: f32,
}

/// What the integrator hands to event detection
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicsOutcome {
    pub release: Option<ReleaseInfo>,
    /// Wall the loose ball bounced off
    pub wall: Option<Boundary>,
}

/// Advance every entity by `dt`
pub fn integrate(
    state: &mut MatchState,
    requests: &[MotionRequest],
    order: &[usize],
    settings: &MatchSettings,
    dt: f32,
) -> PhysicsOutcome {
    let mut outcome = PhysicsOutcome::default();
    let mut release: Option<(usize, ReleaseRequest)> = None;

    for (placed, &id) in order.iter().enumerate() {
        let request = requests[id];
        move_agent(state, id, request, &order[..placed], settings, dt);
        if let MotionRequest::Release(r) = request {
            release = Some((id, r));
        }
    }

    state.ball.prev_pos = state.ball.pos;

    if let Some((id, request)) = release {
        outcome.release = Some(release_ball(state, id, request, settings, dt));
    }

    match state.ball.controller {
        Some(id) => pin_ball(state, id, settings),
        None => {
            outcome.wall =
                advance_free_ball(&mut state.ball, &state.field, settings.speed_epsilon, dt);
        }
    }

    outcome
}

fn move_agent(
    state: &mut MatchState,
    id: usize,
    request: MotionRequest,
    already_moved: &[usize],
    settings: &MatchSettings,
    dt: f32,
) {
    let current = state.agents[id].vel;
    let vel = match request {
        MotionRequest::Move { velocity } | MotionRequest::Dribble { velocity } => {
            velocity.clamp_length_max(settings.sprint_speed)
        }
        MotionRequest::Hold | MotionRequest::Release(_) => current * settings.agent_stop_decay,
    };
    let vel = snap_to_zero(vel, settings.speed_epsilon);

    let mut pos = state.agents[id].pos + vel * dt;
    for &other in already_moved {
        if let Some(pushed) = separate_bodies(pos, state.agents[other].pos, 2.0 * AGENT_RADIUS) {
            pos = pushed;
        }
    }
    let pos = state.field.clamp(pos);
    let zone = state.field.zone_for(state.agents[id].team, pos);

    let agent = &mut state.agents[id];
    agent.vel = vel;
    agent.pos = pos;
    agent.zone = zone;
    if vel != Vec2::ZERO {
        agent.facing = vel.normalize();
    }
}

fn release_ball(
    state: &mut MatchState,
    id: usize,
    request: ReleaseRequest,
    settings: &MatchSettings,
    dt: f32,
) -> ReleaseInfo {
    let origin = state.ball.pos;
    let mut dir = direction_to(origin, request.target);
    if dir == Vec2::ZERO {
        log::trace!("release target coincides with the ball; using agent {id}'s facing");
        dir = state.agents[id].facing;
    }
    let velocity = (dir * request.speed).clamp_length_max(settings.max_ball_speed);

    state.ball.vel = velocity;
    state.ball.controller = None;
    state.ball.airborne_ticks = if request.kind == ReleaseKind::LobPass {
        settings.lob_airborne_ticks
    } else {
        0
    };
    state.agents[id].recapture_cooldown = settings.recapture_cooldown_ticks;

    ReleaseInfo {
        agent: id,
        kind: request.kind,
        receiver: request.receiver,
        origin,
        velocity,
        dt,
    }
}

/// Keep a controlled ball just in front of its controller
fn pin_ball(state: &mut MatchState, id: usize, settings: &MatchSettings) {
    let agent = &state.agents[id];
    state.ball.pos = state.field.clamp(agent.pos + agent.facing * settings.dribble_offset);
    state.ball.vel = agent.vel;
}

/// Advance an uncontrolled ball: move, decay, then bounce off the walls.
///
/// Returns the last wall hit, if any.
pub fn advance_free_ball(
    ball: &mut Ball,
    field: &FieldState,
    epsilon: f32,
    dt: f32,
) -> Option<Boundary> {
    ball.pos += ball.vel * dt;
    ball.vel = snap_to_zero(ball.vel * ball.friction, epsilon);

    let mut hit = None;
    for contact in ball_wall_contacts(ball.pos, field).into_iter().flatten() {
        ball.vel = reflect_velocity(ball.vel, contact.normal);
        match contact.boundary {
            Boundary::Left | Boundary::Right => ball.pos.x = contact.clamped.x,
            Boundary::Top | Boundary::Bottom => ball.pos.y = contact.clamped.y,
        }
        hit = Some(contact.boundary);
    }
    hit
}
