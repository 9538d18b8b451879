//! Hints command - Show the LLM advisory view for a submission

use clap::Args;
use pear_core::{aggregate_content, Config};

use super::connect;

/// Arguments for the hints command
#[derive(Args, Debug)]
pub struct HintsArgs {
    /// Submission whose hints to show
    pub submission_id: String,
}

impl HintsArgs {
    /// Execute the hints command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = connect(config)?;
        let report = client.get_hint_report(&self.submission_id).await?;
        let hints = aggregate_content(&report)?;

        tracing::debug!(
            submission_id = %self.submission_id,
            hints = hints.hint_count(),
            "Aggregated hints"
        );

        print!("{}", hints.render());
        Ok(())
    }
}
