//! Backend collaborator consumed by review sessions

use async_trait::async_trait;

use crate::annotation::WireAnnotations;
use crate::Result;

/// REST endpoints a review session depends on
///
/// Implementations carry their own credentials. Every failure, whether
/// transport or a non-2xx answer, is reported as
/// [`Error::BackendRequest`](crate::Error::BackendRequest).
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    /// Source text of a submission (`GET /api/code_path/{id}`)
    async fn submission_code(&self, submission_id: &str) -> Result<String>;

    /// JSON-encoded LLM hint report for a submission (`GET /api/llm_response/{id}`)
    async fn hint_report(&self, submission_id: &str) -> Result<String>;

    /// Source text the review was written against (`GET /api/review_code/{id}`)
    async fn review_code(&self, review_id: &str) -> Result<String>;

    /// Persisted comments of a review (`GET /api/comments_path/{id}`)
    async fn review_comments(&self, review_id: &str) -> Result<WireAnnotations>;

    /// Persist a review (`POST /api/submit_review`)
    ///
    /// `content` is the serialized annotation mapping as a JSON string.
    async fn submit_review(&self, submission_id: &str, content: &str) -> Result<()>;
}
