//! Lifecycle of a single crawl target
//!
//! `Pending -> Dispatched -> {Succeeded | Failed}`. A succeeded target has
//! either produced follow-up targets or a finished record.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    // ===== Active States =====
    /// Target was emitted by a stage handler and waits for dispatch
    Pending,

    /// Target holds a dispatch slot and is being fetched or handled
    Dispatched,

    // ===== Terminal States =====
    /// Page was fetched and its stage handler returned an outcome
    Succeeded,

    /// Fetch, extraction, or persistence failed; the subtree is abandoned
    Failed,
}

impl TargetState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Checks whether moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: TargetState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Dispatched)
                | (Self::Dispatched, Self::Succeeded)
                | (Self::Dispatched, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Dispatched => "dispatched",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
