//! Listing commands - reviews and submissions

use chrono::{DateTime, Utc};
use clap::Args;
use pear_core::Config;

use super::connect;

/// List reviews
#[derive(Args, Debug)]
pub struct ReviewsArgs {
    /// Show reviews of your submissions in this course instead of reviews you wrote
    #[arg(long)]
    pub course: Option<u64>,
}

impl ReviewsArgs {
    /// Execute the reviews command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = connect(config)?;
        let reviews = match self.course {
            Some(course_id) => client.list_reviews_about(course_id).await?,
            None => client.list_reviews().await?,
        };

        if reviews.is_empty() {
            println!("No reviews found.");
            return Ok(());
        }

        for review in &reviews {
            println!(
                "#{:<6} {:<16} submission {:<6} {}",
                review.id,
                format_date(review.date()),
                review
                    .submission_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                review.assignment_name.as_deref().unwrap_or(""),
            );
        }

        Ok(())
    }
}

/// List submissions
#[derive(Args, Debug)]
pub struct SubmissionsArgs {}

impl SubmissionsArgs {
    /// Execute the submissions command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = connect(config)?;
        let submissions = client.list_submissions().await?;

        if submissions.is_empty() {
            println!("No submissions found.");
            return Ok(());
        }

        for submission in &submissions {
            println!(
                "#{:<6} {:<16} {}",
                submission.id,
                format_date(submission.date()),
                submission.assignment_name.as_deref().unwrap_or("(unknown assignment)"),
            );
        }

        Ok(())
    }
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
