//! Counter bookkeeping from detected events

use super::events::MatchEvent;
use super::state::MatchState;

/// Fold the tick's events into team and agent counters
pub fn apply_events(state: &mut MatchState, events: &[MatchEvent]) {
    for event in events {
        match *event {
            MatchEvent::Release {
                team,
                kind,
                on_target,
                ..
            } if kind.is_shot() => {
                let stats = state.team_stats_mut(team);
                stats.shots_taken += 1;
                if on_target {
                    stats.shots_on_target += 1;
                }
            }
            MatchEvent::PassCompleted { team, .. } => {
                state.team_stats_mut(team).passes_completed += 1;
            }
            MatchEvent::Goal {
                team,
                scorer,
                assister,
            } => {
                state.team_stats_mut(team).score += 1;
                if let Some(id) = scorer {
                    state.agents[id].goals += 1;
                }
                if let Some(id) = assister {
                    state.agents[id].assists += 1;
                }
            }
            MatchEvent::Turnover { from, .. } => {
                let team = state.agents[from].team;
                state.team_stats_mut(team).turnovers += 1;
            }
            _ => {}
        }
    }
}
