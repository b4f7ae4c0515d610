//! Reset/step surface for controllers
//!
//! Owns the match state between ticks and only ever hands out snapshots.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;
use crate::error::{Result, SimError};
use crate::settings::MatchSettings;
use crate::sim::{FieldState, MatchEvent, MatchState, Snapshot, Surface, build_snapshot, tick};

/// Result of one `step`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub snapshot: Snapshot,
    pub events: Vec<MatchEvent>,
}

/// A single match environment
#[derive(Debug, Clone)]
pub struct FootballEnv {
    settings: MatchSettings,
    state: Option<MatchState>,
}

impl FootballEnv {
    pub fn new(settings: MatchSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            state: None,
        })
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn num_agents(&self) -> usize {
        self.settings.num_agents()
    }

    /// Current match state, if reset has been called
    pub fn state(&self) -> Option<&MatchState> {
        self.state.as_ref()
    }

    /// Start a new match on the standard pitch.
    ///
    /// Unknown surface keys fall back to the default surface. The first half
    /// of `positions` belongs to the home team.
    pub fn reset(&mut self, surface: &str, positions: &[Vec2]) -> Result<Snapshot> {
        let surface = Surface::from_key_or_default(surface);
        let field = FieldState::standard(surface);
        let state = MatchState::new(field, positions, self.settings.agents_per_team)?;
        log::info!(
            "match reset: {} agents on {} (friction {})",
            state.agents.len(),
            surface,
            state.field.friction
        );
        let snapshot = build_snapshot(&state);
        self.state = Some(state);
        Ok(snapshot)
    }

    /// Run exactly one tick
    pub fn step(&mut self, actions: &[usize]) -> Result<StepOutcome> {
        let state = self.state.as_mut().ok_or(SimError::NotReset)?;
        let events = tick(state, actions, &self.settings, SIM_DT)?;
        Ok(StepOutcome {
            snapshot: build_snapshot(state),
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::AGENTS_PER_TEAM;
    use crate::sim::field::Boundary;
    use crate::sim::state::test_support::spread_positions;
    use crate::sim::{Action, Team};
    use proptest::prelude::*;

    const SHOOT_POWER: usize = 23;

    fn env_with_spread() -> FootballEnv {
        let mut env = FootballEnv::new(MatchSettings::default()).unwrap();
        env.reset("dry-grass-standard", &spread_positions(AGENTS_PER_TEAM))
            .unwrap();
        env
    }

    fn state_mut(env: &mut FootballEnv) -> &mut MatchState {
        env.state.as_mut().unwrap()
    }

    #[test]
    fn test_reset_round_trip() {
        let mut env = FootballEnv::new(MatchSettings::default()).unwrap();
        let snapshot = env
            .reset("dry-grass-standard", &spread_positions(AGENTS_PER_TEAM))
            .unwrap();

        assert_eq!(snapshot.tick, 0);
        for team in [Team::Home, Team::Away] {
            let stats = snapshot.team(team);
            assert_eq!(stats.score, 0);
            assert_eq!(stats.shots_taken, 0);
            assert_eq!(stats.shots_on_target, 0);
            assert_eq!(stats.passes_completed, 0);
        }
        for agent in &snapshot.agents {
            assert!(!agent.has_ball);
            assert_eq!(agent.goals, 0);
            assert_eq!(agent.assists, 0);
            assert_eq!(agent.last_action, None);
        }
        assert_eq!(snapshot.ball.position, Vec2::new(53.0, 40.5));
        assert_eq!(snapshot.ball.controller, None);
    }

    #[test]
    fn test_step_before_reset() {
        let mut env = FootballEnv::new(MatchSettings::default()).unwrap();
        assert!(matches!(env.step(&[0; 22]), Err(SimError::NotReset)));
    }

    #[test]
    fn test_unknown_surface_falls_back() {
        let mut env = FootballEnv::new(MatchSettings::default()).unwrap();
        env.reset("mud-bath", &spread_positions(AGENTS_PER_TEAM)).unwrap();
        assert_eq!(env.state().unwrap().field.surface, Surface::DryGrassStandard);
        assert_eq!(env.state().unwrap().ball.friction, 0.985);
    }

    #[test]
    fn test_malformed_positions_are_fatal() {
        let mut env = FootballEnv::new(MatchSettings::default()).unwrap();
        let err = env.reset("synthetic", &[Vec2::ZERO; 5]).unwrap_err();
        assert!(matches!(err, SimError::InvalidInitialPositions(_)));
    }

    #[test]
    fn test_rejected_actions_do_not_advance() {
        let mut env = env_with_spread();
        assert!(matches!(
            env.step(&[25; 22]),
            Err(SimError::InvalidAction { agent: 0, index: 25 })
        ));
        assert!(matches!(
            env.step(&[0; 21]),
            Err(SimError::ActionCountMismatch { .. })
        ));
        assert_eq!(env.state().unwrap().time_ticks, 0);
    }

    #[test]
    fn test_friction_scenario() {
        let mut env = env_with_spread();
        state_mut(&mut env).ball.vel = Vec2::new(10.0, 0.0);

        let outcome = env.step(&[0; 22]).unwrap();
        let ball = outcome.snapshot.ball;
        assert_eq!(ball.controller, None);
        assert!((ball.position.x - 53.667).abs() < 1e-3);
        assert!((ball.position.y - 40.5).abs() < 1e-6);
        assert!((ball.velocity.x - 9.85).abs() < 1e-4);
        assert_eq!(ball.velocity.y, 0.0);
    }

    #[test]
    fn test_power_shot_scores() {
        let mut env = env_with_spread();
        let state = state_mut(&mut env);
        state.agents[0].pos = Vec2::new(95.0, 40.5);
        state.ball.pos = Vec2::new(95.5, 40.5);

        // First tick: agent 0 collects the loose ball
        let outcome = env.step(&[0; 22]).unwrap();
        assert_eq!(outcome.snapshot.ball.controller, Some(0));
        assert!(outcome.snapshot.agents[0].has_ball);

        let mut actions = vec![0; 22];
        actions[0] = SHOOT_POWER;
        let outcome = env.step(&actions).unwrap();
        assert!(outcome.events.contains(&MatchEvent::Release {
            agent: 0,
            team: Team::Home,
            kind: crate::sim::ReleaseKind::ShootPower,
            on_target: true,
        }));
        assert_eq!(outcome.snapshot.agents[0].last_action, Some(Action::ShootPower));

        let mut goal = None;
        for _ in 0..20 {
            let outcome = env.step(&[0; 22]).unwrap();
            if let Some(event) = outcome
                .events
                .iter()
                .find(|e| matches!(e, MatchEvent::Goal { .. }))
            {
                goal = Some((*event, outcome.snapshot));
                break;
            }
        }

        let (event, snapshot) = goal.expect("shot should have scored");
        assert_eq!(
            event,
            MatchEvent::Goal {
                team: Team::Home,
                scorer: Some(0),
                assister: None
            }
        );
        assert_eq!(snapshot.team(Team::Home).score, 1);
        assert_eq!(snapshot.team(Team::Home).shots_taken, 1);
        assert_eq!(snapshot.team(Team::Home).shots_on_target, 1);
        assert_eq!(snapshot.team(Team::Away).score, 0);
        assert_eq!(snapshot.agents[0].goals, 1);
        // The goal tick may show the ball past the line
        assert!(snapshot.ball.position.x > 103.0);

        // Play resumes from the center
        let outcome = env.step(&[0; 22]).unwrap();
        assert_eq!(outcome.snapshot.ball.position, Vec2::new(53.0, 40.5));
    }

    #[test]
    fn test_pass_then_shot_credits_assist() {
        let mut env = env_with_spread();
        let state = state_mut(&mut env);
        state.agents[0].pos = Vec2::new(80.0, 40.5);
        state.agents[1].pos = Vec2::new(90.0, 40.5);
        state.ball.pos = Vec2::new(80.5, 40.5);

        env.step(&[0; 22]).unwrap();
        let mut actions = vec![0; 22];
        actions[0] = 20; // pass-short to the nearest teammate
        env.step(&actions).unwrap();

        let mut completed = false;
        for _ in 0..30 {
            let outcome = env.step(&[0; 22]).unwrap();
            if outcome.events.contains(&MatchEvent::PassCompleted {
                passer: 0,
                receiver: 1,
                team: Team::Home,
            }) {
                completed = true;
                break;
            }
        }
        assert!(completed, "pass should reach agent 1");
        assert_eq!(env.state().unwrap().ball.controller, Some(1));

        let mut actions = vec![0; 22];
        actions[1] = SHOOT_POWER;
        env.step(&actions).unwrap();

        let mut scored = None;
        for _ in 0..20 {
            let outcome = env.step(&[0; 22]).unwrap();
            if outcome.events.iter().any(|e| matches!(e, MatchEvent::Goal { .. })) {
                scored = Some(outcome.snapshot);
                break;
            }
        }
        let snapshot = scored.expect("shot should have scored");
        assert_eq!(snapshot.team(Team::Home).passes_completed, 1);
        assert_eq!(snapshot.agents[1].goals, 1);
        assert_eq!(snapshot.agents[0].assists, 1);
    }

    #[test]
    fn test_touchline_exit_is_out_of_bounds() {
        let mut env = env_with_spread();
        let state = state_mut(&mut env);
        state.ball.pos = Vec2::new(53.0, 2.0);
        state.ball.vel = Vec2::new(0.0, -20.0);

        let mut out = None;
        for _ in 0..3 {
            let outcome = env.step(&[0; 22]).unwrap();
            if let Some(event) = outcome
                .events
                .iter()
                .find(|e| matches!(e, MatchEvent::OutOfBounds { .. }))
            {
                out = Some((*event, outcome.snapshot));
                break;
            }
        }

        let (event, snapshot) = out.expect("ball should leave the field");
        assert!(matches!(
            event,
            MatchEvent::OutOfBounds {
                boundary: Boundary::Top,
                restart_agent: Some(_)
            }
        ));
        assert_eq!(snapshot.team(Team::Home).score, 0);
        assert_eq!(snapshot.team(Team::Away).score, 0);
        assert!(snapshot.ball.controller.is_some());
        assert!(snapshot.ball.position.y >= 0.0);
    }

    #[test]
    fn test_goal_line_wide_of_mouth_is_out_of_bounds() {
        let mut env = env_with_spread();
        let state = state_mut(&mut env);
        state.ball.pos = Vec2::new(101.0, 10.0);
        state.ball.vel = Vec2::new(40.0, 0.0);

        let mut out = None;
        for _ in 0..3 {
            let outcome = env.step(&[0; 22]).unwrap();
            assert!(
                !outcome.events.iter().any(|e| matches!(e, MatchEvent::Goal { .. })),
                "crossing wide of the posts must not score"
            );
            if let Some(event) = outcome
                .events
                .iter()
                .find(|e| matches!(e, MatchEvent::OutOfBounds { .. }))
            {
                out = Some((*event, outcome.snapshot));
                break;
            }
        }

        let (event, snapshot) = out.expect("ball should leave over the goal line");
        // Nobody touched it, so the away side owning that half restarts
        assert_eq!(
            event,
            MatchEvent::OutOfBounds {
                boundary: Boundary::Right,
                restart_agent: Some(21)
            }
        );
        assert_eq!(snapshot.team(Team::Home).score, 0);
        assert_eq!(snapshot.team(Team::Away).score, 0);
        assert_eq!(snapshot.ball.controller, Some(21));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_possession_and_bounds_invariants(
            ticks in prop::collection::vec(
                prop::collection::vec(0usize..crate::sim::ACTION_COUNT, 22),
                1..80,
            ),
        ) {
            let mut env = FootballEnv::new(MatchSettings::default()).unwrap();
            let positions: Vec<Vec2> = (0..22)
                .map(|i| Vec2::new(30.0 + (i % 11) as f32 * 4.0, 30.0 + (i / 11) as f32 * 20.0))
                .collect();
            env.reset("synthetic", &positions).unwrap();

            for actions in &ticks {
                let outcome = env.step(actions).unwrap();
                let snapshot = &outcome.snapshot;

                let holders: Vec<usize> = snapshot
                    .agents
                    .iter()
                    .filter(|a| a.has_ball)
                    .map(|a| a.id)
                    .collect();
                prop_assert!(holders.len() <= 1);
                prop_assert_eq!(holders.first().copied(), snapshot.ball.controller);

                let goal = outcome.events.iter().any(|e| matches!(e, MatchEvent::Goal { .. }));
                if !goal {
                    let p = snapshot.ball.position;
                    prop_assert!((0.0..=106.0).contains(&p.x), "ball x {}", p.x);
                    prop_assert!((0.0..=81.0).contains(&p.y), "ball y {}", p.y);
                }
            }
        }
    }
}
