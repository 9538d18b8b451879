//! Review sessions
//!
//! A [`ReviewSession`] covers one authoring or read-back interaction with a
//! single submission or review. It fetches the source text together with
//! either the LLM hints (author mode) or the persisted comments (read-only
//! mode), collects reviewer comments, and sends them back on submit.
//!
//! Backend failures never escape as `Err`; they move the session to
//! [`SessionStatus::Failed`] and are kept for the presentation layer.

mod backend;
mod state;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::annotation::{Annotation, AnnotationSet, LineKey};
use crate::config::SessionConfig;
use crate::hints::{aggregate_content, AggregatedHints};
use crate::{Error, Result};

pub use backend::ReviewBackend;
pub use state::{FailureStage, SessionMode, SessionStatus};

use state::StatusTracker;

/// Message shown when the source or secondary data could not be fetched
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load review data";

/// Message shown after the backend acknowledged a review
pub const SUBMIT_SUCCESS_MESSAGE: &str = "Review submitted successfully!";

/// Data produced by a successful `start`
enum Loaded {
    Author {
        source: String,
        hints: AggregatedHints,
    },
    ReadOnly {
        source: String,
        annotations: AnnotationSet,
    },
}

/// One authoring or read-back review interaction
pub struct ReviewSession<B: ReviewBackend + ?Sized> {
    backend: Arc<B>,
    id: String,
    mode: SessionMode,
    timeout: Duration,
    cancel: CancellationToken,
    tracker: StatusTracker,
    source_text: Option<String>,
    hints: Option<AggregatedHints>,
    annotations: AnnotationSet,
    error: Option<Error>,
    message: Option<String>,
}

impl<B: ReviewBackend + ?Sized> ReviewSession<B> {
    /// Create a session for a submission id (author) or review id (read-only)
    pub fn new(
        backend: Arc<B>,
        id: impl Into<String>,
        mode: SessionMode,
        config: &SessionConfig,
    ) -> Self {
        Self {
            backend,
            id: id.into(),
            mode,
            timeout: config.timeout,
            cancel: CancellationToken::new(),
            tracker: StatusTracker::new(),
            source_text: None,
            hints: None,
            annotations: AnnotationSet::new(),
            error: None,
            message: None,
        }
    }

    /// Author-mode session for a submission
    pub fn author(backend: Arc<B>, submission_id: impl Into<String>, config: &SessionConfig) -> Self {
        Self::new(backend, submission_id, SessionMode::Author, config)
    }

    /// Read-only session for a persisted review
    pub fn read_only(backend: Arc<B>, review_id: impl Into<String>, config: &SessionConfig) -> Self {
        Self::new(backend, review_id, SessionMode::ReadOnly, config)
    }

    /// Submission id (author) or review id (read-only)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this session authors a review or reads one back
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Current lifecycle status
    pub fn status(&self) -> SessionStatus {
        self.tracker.status()
    }

    /// Stage that caused the current `failed` status
    pub fn failure_stage(&self) -> Option<FailureStage> {
        match self.status() {
            SessionStatus::Failed => self.tracker.failure(),
            _ => None,
        }
    }

    /// Source text, available once the session is ready
    pub fn source_text(&self) -> Option<&str> {
        self.source_text.as_deref()
    }

    /// Number of `\n`-separated lines in the source, 0 before loading
    pub fn line_count(&self) -> usize {
        self.source_text
            .as_deref()
            .map(|s| s.split('\n').count())
            .unwrap_or(0)
    }

    /// Aggregated LLM hints (author mode only)
    pub fn hints(&self) -> Option<&AggregatedHints> {
        self.hints.as_ref()
    }

    /// Comments recorded so far (author) or loaded from the backend (read-only)
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Error behind the last failure
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// User-visible feedback for the last load or submit
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Token that aborts outstanding backend requests when cancelled
    ///
    /// The session cancels it itself when dropped.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetch source text and secondary data concurrently
    ///
    /// Both fetches must succeed for the session to become `ready`. Any
    /// failure, timeout or cancellation leaves it `failed` for good; build a
    /// new session to try again. Only errors for calling this twice are
    /// returned as `Err`.
    pub async fn start(&mut self) -> Result<SessionStatus> {
        if self.status() != SessionStatus::Loading {
            return Err(Error::InvalidSessionState(format!(
                "session already started ({})",
                self.status()
            )));
        }

        info!(id = %self.id, mode = %self.mode, "Starting review session");

        let outcome = guarded(&self.cancel, self.timeout, self.fetch()).await;

        match outcome {
            Ok(loaded) => {
                match loaded {
                    Loaded::Author { source, hints } => {
                        debug!(hints = hints.hint_count(), "Loaded source and hints");
                        self.source_text = Some(source);
                        self.hints = Some(hints);
                    }
                    Loaded::ReadOnly {
                        source,
                        annotations,
                    } => {
                        debug!(comments = annotations.len(), "Loaded source and comments");
                        self.source_text = Some(source);
                        self.annotations = annotations;
                    }
                }
                self.tracker.transition_to(SessionStatus::Ready)?;
            }
            Err(e) => {
                warn!(id = %self.id, error = %e, "Failed to load review session");
                self.tracker.fail(FailureStage::Load)?;
                self.message = Some(LOAD_FAILED_MESSAGE.to_string());
                self.error = Some(e);
            }
        }

        Ok(self.status())
    }

    async fn fetch(&self) -> Result<Loaded> {
        let backend = self.backend.as_ref();
        match self.mode {
            SessionMode::Author => {
                let (source, report) = tokio::try_join!(
                    backend.submission_code(&self.id),
                    backend.hint_report(&self.id)
                )?;
                let hints = aggregate_content(&report)?;
                Ok(Loaded::Author { source, hints })
            }
            SessionMode::ReadOnly => {
                let (source, comments) = tokio::try_join!(
                    backend.review_code(&self.id),
                    backend.review_comments(&self.id)
                )?;
                let annotations = AnnotationSet::from_wire_format(comments)?;
                Ok(Loaded::ReadOnly {
                    source,
                    annotations,
                })
            }
        }
    }

    /// Record a reviewer comment against a 1-based line
    ///
    /// The line is validated before anything else, so a non-positive line
    /// is always [`Error::InvalidLine`]. Allowed in author mode while
    /// `ready`, or `failed` after a rejected submit.
    pub fn record_comment(&mut self, line: i64, text: impl Into<String>) -> Result<()> {
        let line = LineKey::new(line)?;

        if !self.mode.allows_mutation() {
            return Err(Error::InvalidSessionState(
                "comments can only be recorded in author mode".to_string(),
            ));
        }

        match (self.status(), self.failure_stage()) {
            (SessionStatus::Ready, _) | (SessionStatus::Failed, Some(FailureStage::Submit)) => {}
            (status, _) => {
                return Err(Error::InvalidSessionState(format!(
                    "cannot record comments while {}",
                    status
                )));
            }
        }

        let line_count = self.line_count();
        if line.get() as usize > line_count {
            return Err(Error::LineOutOfRange {
                line: line.get(),
                line_count,
            });
        }

        self.annotations.add_annotation(line, text)
    }

    /// Send the recorded comments to the backend
    ///
    /// An empty comment set is refused with [`Error::EmptySubmission`]
    /// before any request is made. Backend rejection moves the session to
    /// `failed` with the backend's message and keeps the comments so the
    /// submit can be retried. Success is terminal and clears the set.
    pub async fn submit(&mut self) -> Result<SessionStatus> {
        if self.annotations.is_empty() {
            return Err(Error::EmptySubmission);
        }

        if !self.mode.allows_mutation() {
            return Err(Error::InvalidSessionState(
                "read-only sessions cannot submit".to_string(),
            ));
        }

        match (self.status(), self.failure_stage()) {
            (SessionStatus::Ready, _) | (SessionStatus::Failed, Some(FailureStage::Submit)) => {}
            (status, _) => {
                return Err(Error::InvalidSessionState(format!(
                    "cannot submit while {}",
                    status
                )));
            }
        }

        let content = self.annotations.to_wire_json()?;
        self.tracker.transition_to(SessionStatus::Submitting)?;

        info!(
            submission_id = %self.id,
            comments = self.annotations.len(),
            "Submitting review"
        );

        let result = guarded(
            &self.cancel,
            self.timeout,
            self.backend.submit_review(&self.id, &content),
        )
        .await;

        match result {
            Ok(()) => {
                self.tracker.transition_to(SessionStatus::Submitted)?;
                self.annotations = AnnotationSet::new();
                self.error = None;
                self.message = Some(SUBMIT_SUCCESS_MESSAGE.to_string());
                info!(submission_id = %self.id, "Review submitted");
            }
            Err(e) => {
                warn!(submission_id = %self.id, error = %e, "Review submit failed");
                self.tracker.fail(FailureStage::Submit)?;
                self.message = Some(e.to_string());
                self.error = Some(e);
            }
        }

        Ok(self.status())
    }

    /// Return to `ready` after a failed submit, clearing the message
    pub fn clear_failure(&mut self) -> Result<()> {
        if self.failure_stage() != Some(FailureStage::Submit) {
            return Err(Error::InvalidSessionState(format!(
                "nothing to retry while {}",
                self.status()
            )));
        }

        self.tracker.transition_to(SessionStatus::Ready)?;
        self.error = None;
        self.message = None;
        Ok(())
    }

    /// Combined view model for the presentation layer
    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            mode: self.mode,
            status: self.status(),
            source_lines: self
                .source_text
                .as_deref()
                .map(|s| s.split('\n').collect())
                .unwrap_or_default(),
            hints: self.hints.as_ref(),
            annotations: self.annotations.annotations(),
            message: self.message.as_deref(),
        }
    }
}

impl<B: ReviewBackend + ?Sized> Drop for ReviewSession<B> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<B: ReviewBackend + ?Sized> std::fmt::Debug for ReviewSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewSession")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("status", &self.status())
            .field("comments", &self.annotations.len())
            .finish_non_exhaustive()
    }
}

/// Everything a view needs to render a session
#[derive(Debug, Clone)]
pub struct SessionView<'a> {
    pub mode: SessionMode,
    pub status: SessionStatus,
    /// Source split on `\n`; index 0 is line 1
    pub source_lines: Vec<&'a str>,
    pub hints: Option<&'a AggregatedHints>,
    /// Comments in ascending line order
    pub annotations: Vec<Annotation>,
    pub message: Option<&'a str>,
}

impl<'a> SessionView<'a> {
    /// `(line number, text)` pairs for the source pane
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.source_lines
            .iter()
            .enumerate()
            .map(|(i, line)| (i + 1, *line))
    }
}

/// Race `fut` against cancellation and the session timeout
async fn guarded<T>(
    cancel: &CancellationToken,
    timeout: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        outcome = tokio::time::timeout(timeout, fut) => match outcome {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(timeout)),
        },
    }
}
