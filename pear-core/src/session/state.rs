//! Review session modes and status transitions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// What a session is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Fetch source and hints, record comments, submit
    Author,
    /// Fetch source and persisted comments, display only
    ReadOnly,
}

impl SessionMode {
    /// Whether comments may be recorded and submitted
    pub fn allows_mutation(&self) -> bool {
        matches!(self, SessionMode::Author)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Author => write!(f, "author"),
            SessionMode::ReadOnly => write!(f, "readonly"),
        }
    }
}

/// Lifecycle of a session
///
/// ```text
/// loading -> ready -> submitting -> submitted
///    |                    |
///    +-----> failed <-----+
///            failed -> submitting (retry after a submit failure)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Fetches in flight
    Loading,
    /// Source and secondary data available
    Ready,
    /// Review sent, awaiting acknowledgment
    Submitting,
    /// Backend acknowledged the review; terminal
    Submitted,
    /// A fetch or submit failed
    Failed,
}

impl SessionStatus {
    /// Check whether moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (*self, next),
            (Loading, Ready)
                | (Loading, Failed)
                | (Ready, Submitting)
                | (Submitting, Submitted)
                | (Submitting, Failed)
                | (Failed, Ready)
                | (Failed, Submitting)
        )
    }

    /// True once no further operation can change the session
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Submitted)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Loading => "loading",
            SessionStatus::Ready => "ready",
            SessionStatus::Submitting => "submitting",
            SessionStatus::Submitted => "submitted",
            SessionStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Where a `failed` status came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Fetching source or secondary data; permanent for the session
    Load,
    /// Sending the review; retryable
    Submit,
}

/// Current status plus the stage that last failed
#[derive(Debug, Clone)]
pub(crate) struct StatusTracker {
    status: SessionStatus,
    failure: Option<FailureStage>,
}

impl StatusTracker {
    pub(crate) fn new() -> Self {
        Self {
            status: SessionStatus::Loading,
            failure: None,
        }
    }

    pub(crate) fn status(&self) -> SessionStatus {
        self.status
    }

    pub(crate) fn failure(&self) -> Option<FailureStage> {
        self.failure
    }

    /// Move to `next`, logging the transition
    pub(crate) fn transition_to(&mut self, next: SessionStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::InvalidSessionState(format!(
                "cannot move from {} to {}",
                self.status, next
            )));
        }

        tracing::info!(from = %self.status, to = %next, "Review session transition");

        self.status = next;
        Ok(())
    }

    /// Move to `failed`, remembering which stage failed
    pub(crate) fn fail(&mut self, stage: FailureStage) -> Result<()> {
        self.transition_to(SessionStatus::Failed)?;
        self.failure = Some(stage);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut tracker = StatusTracker::new();
        assert_eq!(tracker.status(), SessionStatus::Loading);

        tracker.transition_to(SessionStatus::Ready).unwrap();
        tracker.transition_to(SessionStatus::Submitting).unwrap();
        tracker.transition_to(SessionStatus::Submitted).unwrap();
        assert!(tracker.status().is_terminal());
    }

    #[test]
    fn test_submitted_is_terminal() {
        for next in [
            SessionStatus::Loading,
            SessionStatus::Ready,
            SessionStatus::Submitting,
            SessionStatus::Failed,
        ] {
            assert!(!SessionStatus::Submitted.can_transition_to(next));
        }
    }

    #[test]
    fn test_invalid_transition_keeps_status() {
        let mut tracker = StatusTracker::new();
        let result = tracker.transition_to(SessionStatus::Submitted);
        assert!(matches!(result, Err(Error::InvalidSessionState(_))));
        assert_eq!(tracker.status(), SessionStatus::Loading);
    }

    #[test]
    fn test_fail_records_stage() {
        let mut tracker = StatusTracker::new();
        tracker.fail(FailureStage::Load).unwrap();
        assert_eq!(tracker.status(), SessionStatus::Failed);
        assert_eq!(tracker.failure(), Some(FailureStage::Load));
    }

    #[test]
    fn test_retry_after_submit_failure() {
        let mut tracker = StatusTracker::new();
        tracker.transition_to(SessionStatus::Ready).unwrap();
        tracker.transition_to(SessionStatus::Submitting).unwrap();
        tracker.fail(FailureStage::Submit).unwrap();
        assert!(tracker.status().can_transition_to(SessionStatus::Submitting));
        assert!(tracker.status().can_transition_to(SessionStatus::Ready));
    }

    #[test]
    fn test_mode_serde_names() {
        assert_eq!(serde_json::to_string(&SessionMode::ReadOnly).unwrap(), "\"readonly\"");
        assert_eq!(serde_json::to_string(&SessionMode::Author).unwrap(), "\"author\"");
        assert!(SessionMode::Author.allows_mutation());
        assert!(!SessionMode::ReadOnly.allows_mutation());
    }
}
