//! Show command - Read back a finished review

use clap::Args;
use pear_core::{Config, ReviewSession};

use super::{connect, print_comments, print_source, start_session};

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Review to display
    pub review_id: String,
}

impl ShowArgs {
    /// Execute the show command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = connect(config)?;
        let mut session = ReviewSession::read_only(client, &self.review_id, &config.session);
        start_session(&mut session).await?;

        let view = session.view();
        println!("Code");
        println!("====");
        print_source(&view);
        println!();
        print_comments(&view);

        Ok(())
    }
}
