//! Reconciliation phase machine
//!
//! ```text
//! Idle -> Authenticating -> {Failed | Reconciling}
//! Reconciling -> {CreatingProject | Redirecting | Failed}
//! CreatingProject -> {Redirecting | Failed}
//! Redirecting -> {Done | Failed}
//! Done | Failed -> Authenticating   (next attempt)
//! ```

use crate::error::StateError;
use crate::types::AuthMethod;
use serde::{Deserialize, Serialize};

/// Phase of a reconciliation attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// No attempt has started
    #[default]
    Idle,
    /// Waiting on the auth gateway
    Authenticating,
    /// Reading the work store and project directory
    Reconciling,
    /// Waiting on project creation
    CreatingProject,
    /// Route resolved, redirect being issued
    Redirecting,
    /// Attempt completed and redirected
    Done,
    /// Credentials rejected or a collaborator failed
    Failed,
}

impl Phase {
    /// Whether the caller should treat the session as busy
    #[inline]
    #[must_use]
    pub fn is_loading(self) -> bool {
        !matches!(self, Self::Idle | Self::Failed | Self::Done)
    }

    /// Whether the attempt has finished
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Done)
    }
}

/// Validates a phase transition.
pub fn validate_transition(from: Phase, to: Phase) -> Result<(), StateError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StateError::IllegalTransition { from, to })
    }
}

/// Phases reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: Phase) -> Vec<Phase> {
    use Phase::*;
    match from {
        Idle | Done | Failed => vec![Authenticating],
        Authenticating => vec![Reconciling, Failed],
        Reconciling => vec![CreatingProject, Redirecting, Failed],
        CreatingProject => vec![Redirecting, Failed],
        Redirecting => vec![Done, Failed],
    }
}

/// Observable session state, published on the reconciler's watch channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Phase of the most recently advanced attempt
    pub phase: Phase,
    /// Auth call that started that attempt
    pub method: Option<AuthMethod>,
    /// Attempts currently running
    pub in_flight: usize,
    /// Reason the last failed attempt failed
    pub last_error: Option<String>,
}

impl SessionStatus {
    /// True while any attempt is running
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}
