//! Run State

use std::fmt;

/// Where the current (or last) trial is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No trial started yet
    #[default]
    Idle,
    /// Waiting for the data provider
    Fetching,
    /// Decoding and validating the payload
    Parsing,
    /// Adapter is drawing
    Rendering,
    /// Result merged and appended to the log
    Logged,
    /// Trial aborted; nothing was logged
    Failed,
}

impl RunState {
    /// Whether the trial has finished, successfully or not
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Logged | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Fetching => "fetching",
            RunState::Parsing => "parsing",
            RunState::Rendering => "rendering",
            RunState::Logged => "logged",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}
