//! Review and submission listings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ApiClient, Result};

/// A review as listed by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: u64,
    /// HTTP-date string as sent by the backend
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub reviewer_id: Option<u64>,
    #[serde(default)]
    pub reviewee_id: Option<u64>,
    #[serde(default)]
    pub submission_id: Option<u64>,
    /// Only present in per-course listings
    #[serde(default)]
    pub assignment_name: Option<String>,
}

impl ReviewRecord {
    /// When the review was written, if the backend sent a parseable date
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_date)
    }
}

/// A submission as listed by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: u64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub assignment_id: Option<u64>,
    #[serde(default)]
    pub assignment_name: Option<String>,
    #[serde(default)]
    pub creator_id: Option<u64>,
    #[serde(default)]
    pub creator_name: Option<String>,
}

impl SubmissionRecord {
    /// When the code was handed in
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_date)
    }
}

impl ApiClient {
    /// Reviews written by the current user
    pub async fn list_reviews(&self) -> Result<Vec<ReviewRecord>> {
        self.get_json(&["reviews"]).await
    }

    /// Reviews of the current user's submissions in a course
    pub async fn list_reviews_about(&self, course_id: u64) -> Result<Vec<ReviewRecord>> {
        let course_id = course_id.to_string();
        self.get_json(&["reviews_about", course_id.as_str()]).await
    }

    /// Submissions handed in by the current user
    pub async fn list_submissions(&self) -> Result<Vec<SubmissionRecord>> {
        self.get_json(&["submissions"]).await
    }
}

/// Flask serializes datetimes as RFC 2822 (`Wed, 22 May 2024 10:00:00 GMT`)
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
