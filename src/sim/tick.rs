//! Fixed timestep simulation tick
//!
//! Core match loop that advances the simulation deterministically:
//! possession, action resolution, integration, events, stats.

use super::action::parse_actions;
use super::events::{MatchEvent, detect_events};
use super::physics::integrate;
use super::possession::{processing_order, update_possession, update_pressure};
use super::resolve_actions;
use super::state::MatchState;
use super::stats::apply_events;
use crate::error::Result;
use crate::settings::MatchSettings;

/// Advance the match by one fixed timestep.
///
/// `actions` holds one catalog index per agent. The whole vector is validated
/// before any state is touched.
pub fn tick(
    state: &mut MatchState,
    actions: &[usize],
    settings: &MatchSettings,
    dt: f32,
) -> Result<Vec<MatchEvent>> {
    let actions = parse_actions(actions, state.agents.len())?;
    let mut events = Vec::new();

    if state.pending_kickoff {
        state.apply_kickoff();
    }

    state.time_ticks += 1;
    for agent in &mut state.agents {
        agent.recapture_cooldown = agent.recapture_cooldown.saturating_sub(1);
    }
    state.ball.airborne_ticks = state.ball.airborne_ticks.saturating_sub(1);

    update_possession(state, settings, &mut events);
    let order = processing_order(state);

    let (requests, illegal) = resolve_actions(state, &actions, &order, settings);
    events.extend(illegal.into_iter().map(|i| MatchEvent::IllegalAction {
        agent: i.agent,
        action: i.action,
    }));

    let outcome = integrate(state, &requests, &order, settings, dt);
    detect_events(state, &outcome, settings, &mut events);
    apply_events(state, &events);

    // Releases, restarts and movement all happen after possession ran
    state.sync_possession_flags();
    state.refresh_distances();
    update_pressure(state, settings);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::error::SimError;
    use crate::sim::state::test_support::spread_state;
    use glam::Vec2;

    #[test]
    fn test_invalid_action_leaves_state_untouched() {
        let mut state = spread_state();
        let before = state.clone();
        let mut actions = vec![0; 22];
        actions[21] = 99;

        let err = tick(&mut state, &actions, &MatchSettings::default(), SIM_DT).unwrap_err();
        assert!(matches!(err, SimError::InvalidAction { agent: 21, index: 99 }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_kickoff_after_goal() {
        let mut state = spread_state();
        state.pending_kickoff = true;
        state.ball.pos = Vec2::new(104.0, 40.0);
        state.ball.vel = Vec2::new(20.0, 0.0);

        tick(&mut state, &[0; 22], &MatchSettings::default(), SIM_DT).unwrap();
        assert!(!state.pending_kickoff);
        assert_eq!(state.ball.pos, state.field.center());
        assert_eq!(state.ball.vel, Vec2::ZERO);
    }

    #[test]
    fn test_release_cooldown_counts_down() {
        let mut state = spread_state();
        state.agents[0].recapture_cooldown = 2;
        state.ball.airborne_ticks = 1;
        let settings = MatchSettings::default();

        tick(&mut state, &[0; 22], &settings, SIM_DT).unwrap();
        assert_eq!(state.agents[0].recapture_cooldown, 1);
        assert_eq!(state.ball.airborne_ticks, 0);
        tick(&mut state, &[0; 22], &settings, SIM_DT).unwrap();
        assert_eq!(state.agents[0].recapture_cooldown, 0);
        assert_eq!(state.time_ticks, 2);
    }

    #[test]
    fn test_pressure_reflects_positions_after_movement() {
        let mut state = spread_state();
        let settings = MatchSettings::default();
        state.ball.controller = Some(0);
        state.agents[0].pos = Vec2::new(52.5, 40.5);
        state.agents[11].pos = Vec2::new(57.9, 40.5);

        // Opponent starts 5.4 m away and sprints left (catalog index 17)
        let mut actions = vec![0; 22];
        actions[11] = 17;
        tick(&mut state, &actions, &settings, SIM_DT).unwrap();

        assert!(state.agents[0].pos.distance(state.agents[11].pos) < settings.pressure_radius);
        assert_eq!(state.ball.controller, Some(0));
        assert!(state.agents[0].is_pressured);
        assert!(!state.agents[11].is_pressured);
    }

    #[test]
    fn test_out_of_bounds_restart_sets_pressure() {
        let mut state = spread_state();
        let settings = MatchSettings::default();
        state.last_touch = Some(13);
        state.ball.pos = Vec2::new(31.0, 1.0);
        state.ball.vel = Vec2::new(0.0, -30.0);
        // Away agent 12 lurks next to home agent 7, who takes the restart
        state.agents[12].pos = Vec2::new(34.0, 8.0);

        let events = tick(&mut state, &[0; 22], &settings, SIM_DT).unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            crate::sim::MatchEvent::OutOfBounds {
                restart_agent: Some(7),
                ..
            }
        )));
        assert!(state.agents[7].has_ball);
        assert!(state.agents[7].is_pressured);
    }

    #[test]
    fn test_determinism() {
        // Two identical states fed identical inputs must stay bit-identical
        let mut state1 = spread_state();
        let mut state2 = spread_state();
        let settings = MatchSettings::default();

        let inputs: Vec<Vec<usize>> = (0..40)
            .map(|t| (0..22).map(|i| (i * 7 + t * 3) % 25).collect())
            .collect();

        for input in &inputs {
            let e1 = tick(&mut state1, input, &settings, SIM_DT).unwrap();
            let e2 = tick(&mut state2, input, &settings, SIM_DT).unwrap();
            assert_eq!(e1, e2);
        }
        assert_eq!(state1, state2);
    }
}
