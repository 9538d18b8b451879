//! Review endpoints consumed by review sessions

use async_trait::async_trait;
use pear_core::{ReviewBackend, WireAnnotations};
use serde::Serialize;
use tracing::debug;

use crate::{ApiClient, ApiError, Result};

/// Body of `POST /api/submit_review`
#[derive(Debug, Serialize)]
struct SubmitReviewRequest<'a> {
    /// Annotation mapping encoded as a JSON string
    content: &'a str,
    submission_id: &'a str,
}

impl ApiClient {
    /// Source text of a submission
    pub async fn get_submission_code(&self, submission_id: &str) -> Result<String> {
        let code: String = self
            .get_content(&["code_path", submission_id], "Failed to fetch code")
            .await?;
        non_empty_code(code)
    }

    /// Raw LLM response for a submission, still JSON-encoded
    pub async fn get_hint_report(&self, submission_id: &str) -> Result<String> {
        self.get_content(
            &["llm_response", submission_id],
            "Failed to fetch LLM response",
        )
        .await
    }

    /// Source text a review was written against
    pub async fn get_review_code(&self, review_id: &str) -> Result<String> {
        let code: String = self
            .get_content(&["review_code", review_id], "Failed to fetch code")
            .await?;
        non_empty_code(code)
    }

    /// Persisted `{ "<line>": "<comment>" }` mapping of a review
    pub async fn get_review_comments(&self, review_id: &str) -> Result<WireAnnotations> {
        self.get_content(&["comments_path", review_id], "Failed to fetch comments")
            .await
    }

    /// Store a review for a submission
    pub async fn post_review(&self, submission_id: &str, content: &str) -> Result<()> {
        debug!(submission_id, bytes = content.len(), "Posting review");
        self.post_json(
            &["submit_review"],
            &SubmitReviewRequest {
                content,
                submission_id,
            },
        )
        .await
    }
}

/// The backend signals a missing file with an empty `content`
fn non_empty_code(code: String) -> Result<String> {
    if code.is_empty() {
        return Err(ApiError::MissingContent("Failed to fetch code".to_string()));
    }
    Ok(code)
}

#[async_trait]
impl ReviewBackend for ApiClient {
    async fn submission_code(&self, submission_id: &str) -> pear_core::Result<String> {
        Ok(self.get_submission_code(submission_id).await?)
    }

    async fn hint_report(&self, submission_id: &str) -> pear_core::Result<String> {
        Ok(self.get_hint_report(submission_id).await?)
    }

    async fn review_code(&self, review_id: &str) -> pear_core::Result<String> {
        Ok(self.get_review_code(review_id).await?)
    }

    async fn review_comments(&self, review_id: &str) -> pear_core::Result<WireAnnotations> {
        Ok(self.get_review_comments(review_id).await?)
    }

    async fn submit_review(&self, submission_id: &str, content: &str) -> pear_core::Result<()> {
        Ok(self.post_review(submission_id, content).await?)
    }
}
