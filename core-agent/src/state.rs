//! Agent lifecycle state machine.

use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the agent.
///
/// ```text
/// Parsed ─install─> Installing ─ok─> Installed ─activate─> Activating ─> Active
///                        └─failure─> Redundant
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AgentState {
    #[default]
    Parsed,
    Installing,
    Installed,
    Activating,
    Active,
    /// Terminal; the host discards the agent
    Redundant,
}

impl AgentState {
    /// Fetch events are only answered from cache while active.
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, AgentState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentState::Redundant)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: AgentState) -> bool {
        use AgentState::*;
        matches!(
            (self, next),
            (Parsed, Installing)
                | (Installing, Installed)
                | (Installing, Redundant)
                | (Installed, Activating)
                | (Activating, Active)
                | (Activating, Redundant)
        )
    }

    /// Validated transition.
    pub fn transition(self, next: AgentState, operation: &'static str) -> Result<AgentState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AgentError::InvalidState {
                operation,
                state: self.to_string(),
            })
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentState::Parsed => "parsed",
            AgentState::Installing => "installing",
            AgentState::Installed => "installed",
            AgentState::Activating => "activating",
            AgentState::Active => "active",
            AgentState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let state = AgentState::default()
            .transition(AgentState::Installing, "install")
            .and_then(|s| s.transition(AgentState::Installed, "install"))
            .and_then(|s| s.transition(AgentState::Activating, "activate"))
            .and_then(|s| s.transition(AgentState::Active, "activate"))
            .unwrap();

        assert!(state.can_intercept_fetch());
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_install_failure_is_terminal() {
        let state = AgentState::Installing
            .transition(AgentState::Redundant, "install")
            .unwrap();
        assert!(state.is_terminal());
        assert!(!state.can_intercept_fetch());

        let err = state.transition(AgentState::Installing, "install").unwrap_err();
        assert_eq!(err.to_string(), "Cannot install while redundant");
    }

    #[test]
    fn test_activate_requires_install() {
        assert!(!AgentState::Parsed.can_transition_to(AgentState::Activating));
        assert!(!AgentState::Active.can_transition_to(AgentState::Installing));
        assert!(!AgentState::Installed.can_intercept_fetch());
    }
}
