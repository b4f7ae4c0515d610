//! Error types for the match engine.
//!
//! Only setup failures and malformed step inputs surface as [`SimError`].
//! Problems that arise inside a tick are recovered in place.

use std::path::PathBuf;

/// Errors returned by the environment surface.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An action index lies outside the action catalog.
    #[error("action index {index} for agent {agent} is outside the action catalog")]
    InvalidAction {
        /// Offending agent.
        agent: usize,
        /// Index that was supplied.
        index: usize,
    },

    /// The number of actions does not match the number of agents.
    #[error("expected {expected} actions, got {got}")]
    ActionCountMismatch {
        /// Agents in the match.
        expected: usize,
        /// Actions supplied.
        got: usize,
    },

    /// Unknown surface key.
    #[error("unknown surface condition: {0:?}")]
    InvalidSurfaceCondition(String),

    /// Initial placement does not describe a valid match.
    #[error("invalid initial positions: {0}")]
    InvalidInitialPositions(String),

    /// Settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// `step` was called before the first `reset`.
    #[error("environment has not been reset")]
    NotReset,

    /// Settings file could not be read.
    #[error("failed to read settings from {path}")]
    SettingsIo {
        /// File that was requested.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Settings JSON could not be parsed.
    #[error("malformed settings JSON")]
    SettingsFormat(#[from] serde_json::Error),
}

/// Result alias for engine operations.
pub type Result<T, E = SimError> = std::result::Result<T, E>;
