//! Deterministic match simulation
//!
//! Fixed timestep, pure functions over a single owned [`MatchState`].

pub mod action;
pub mod collision;
pub mod events;
pub mod field;
pub mod physics;
pub mod possession;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod tick;

pub use action::{ACTION_COUNT, Action, Direction, MotionRequest, Steering, resolve_actions};
pub use events::{MatchEvent, TurnoverCause};
pub use field::{Boundary, FieldState, GoalMouth, Surface, Team, Zone};
pub use snapshot::{AgentObservation, BallObservation, Snapshot, build_snapshot};
pub use state::{Agent, Ball, MatchState, ReleaseKind, TeamStats};
pub use tick::tick;
