//! Execution parameters: dispatch loop control.
//!
//! [`ExecutionParams`] groups the static parameters that bound the dispatch
//! loop run by [`Agent::respond`](crate::agent::Agent::respond).
//! These are application-layer concerns, not domain policy.

use std::time::Duration;

/// Default upper bound on model calls per response.
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Dispatch loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionParams {
    /// Maximum number of model calls in a single `respond`.
    pub max_turns: usize,
    /// Timeout applied to each tool handler. `None` means unbounded.
    pub tool_timeout: Option<Duration>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            tool_timeout: None,
        }
    }
}

impl ExecutionParams {
    pub fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_timeout = timeout;
        self
    }
}
