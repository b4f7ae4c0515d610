//! Possession resolution
//!
//! Runs first in every tick. Decides who controls the ball, resolves any
//! pass or shot in flight when somebody takes the ball, and fixes the
//! processing order used by the rest of the pipeline.

use super::action::Action;
use super::events::{MatchEvent, TurnoverCause};
use super::state::{Agent, AssistCredit, MatchState};
use crate::settings::MatchSettings;

/// Update controller, `has_ball`, `is_pressured` and distances
pub fn update_possession(
    state: &mut MatchState,
    settings: &MatchSettings,
    events: &mut Vec<MatchEvent>,
) {
    state.refresh_distances();

    if let Some(holder_id) = state.ball.controller {
        let holder = &state.agents[holder_id];
        let retention = possession_radius(holder, settings);

        if holder.distance_to_ball > retention {
            log::debug!(
                "agent {holder_id} lost touch of the ball ({:.2} m)",
                holder.distance_to_ball
            );
            state.ball.controller = None;
        } else {
            let team = holder.team;
            let holder_dist = holder.distance_to_ball;
            let thief = closest_agent(state, |a| {
                a.team != team
                    && a.distance_to_ball < holder_dist
                    && a.distance_to_ball <= settings.steal_radius
            });
            if let Some(thief) = thief {
                log::debug!("agent {thief} stole the ball from agent {holder_id}");
                events.push(MatchEvent::Turnover {
                    from: holder_id,
                    to: thief,
                    cause: TurnoverCause::Steal,
                });
                take_control(state, thief);
            }
        }
    }

    if state.ball.controller.is_none() && state.ball.airborne_ticks == 0 {
        if let Some(id) = closest_agent(state, |a| {
            a.recapture_cooldown == 0 && a.distance_to_ball <= possession_radius(a, settings)
        }) {
            gain_loose_ball(state, id, events);
        }
    }

    state.sync_possession_flags();
    update_pressure(state, settings);
}

/// Reach for taking or keeping the ball, wider for an agent that dribbled last tick
fn possession_radius(agent: &Agent, settings: &MatchSettings) -> f32 {
    if agent.last_action == Some(Action::Dribble) {
        settings.capture_radius * settings.dribble_tolerance
    } else {
        settings.capture_radius
    }
}

/// Controller first, then ascending distance to the ball, then agent id
pub fn processing_order(state: &MatchState) -> Vec<usize> {
    let controller = state.ball.controller;
    let mut order: Vec<usize> = (0..state.agents.len()).collect();
    order.sort_by(|&a, &b| {
        let not_ctrl_a = controller != Some(a);
        let not_ctrl_b = controller != Some(b);
        not_ctrl_a
            .cmp(&not_ctrl_b)
            .then(
                state.agents[a]
                    .distance_to_ball
                    .total_cmp(&state.agents[b].distance_to_ball),
            )
            .then(a.cmp(&b))
    });
    order
}

/// Agent with the smallest distance to the ball among those passing `filter`
fn closest_agent(
    state: &MatchState,
    filter: impl Fn(&Agent) -> bool,
) -> Option<usize> {
    state
        .agents
        .iter()
        .filter(|a| filter(a))
        .min_by(|a, b| {
            a.distance_to_ball
                .total_cmp(&b.distance_to_ball)
                .then(a.id.cmp(&b.id))
        })
        .map(|a| a.id)
}

/// Hand a loose ball to `id`, settling whatever was in flight
fn gain_loose_ball(state: &mut MatchState, id: usize, events: &mut Vec<MatchEvent>) {
    let team = state.agents[id].team;

    match state.flight.take() {
        Some(flight) if flight.team != team => {
            log::debug!("agent {id} intercepted a {:?} from agent {}", flight.kind, flight.agent);
            events.push(MatchEvent::Turnover {
                from: flight.agent,
                to: id,
                cause: TurnoverCause::Interception,
            });
        }
        Some(flight) if flight.receiver == Some(id) => {
            log::debug!("pass from agent {} completed to agent {id}", flight.agent);
            events.push(MatchEvent::PassCompleted {
                passer: flight.agent,
                receiver: id,
                team,
            });
            state.assist_credit = Some(AssistCredit {
                receiver: id,
                passer: flight.agent,
            });
        }
        Some(_) => {}
        None => {
            if let Some(prev) = state.last_touch {
                if state.agents[prev].team != team {
                    events.push(MatchEvent::Turnover {
                        from: prev,
                        to: id,
                        cause: TurnoverCause::LooseBall,
                    });
                }
            }
        }
    }

    take_control(state, id);
}

fn take_control(state: &mut MatchState, id: usize) {
    if state.assist_credit.is_some_and(|c| c.receiver != id) {
        state.assist_credit = None;
    }
    state.ball.controller = Some(id);
    state.ball.airborne_ticks = 0;
    state.last_touch = Some(id);
}

/// Flag the controller when an opponent is within the pressure radius
pub fn update_pressure(state: &mut MatchState, settings: &MatchSettings) {
    let holder = state
        .controller()
        .map(|h| (h.id, h.team, h.pos));

    for agent in &mut state.agents {
        agent.is_pressured = false;
    }

    if let Some((id, team, pos)) = holder {
        let pressured = state
            .agents
            .iter()
            .any(|a| a.team != team && a.pos.distance(pos) <= settings.pressure_radius);
        state.agents[id].is_pressured = pressured;
    }
}
