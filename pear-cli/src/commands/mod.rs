//! CLI command implementations

pub mod hints;
pub mod list;
pub mod review;
pub mod show;

pub use hints::HintsArgs;
pub use list::{ReviewsArgs, SubmissionsArgs};
pub use review::ReviewArgs;
pub use show::ShowArgs;

use std::sync::Arc;

use pear_client::ApiClient;
use pear_core::{Config, ReviewSession, SessionStatus, SessionView};

/// Build an API client from config plus PEAR_TOKEN / secrets file
pub(crate) fn connect(config: &Config) -> anyhow::Result<Arc<ApiClient>> {
    Ok(Arc::new(ApiClient::from_environment(&config.api)?))
}

/// Start a session and turn a failed load into an error
pub(crate) async fn start_session(session: &mut ReviewSession<ApiClient>) -> anyhow::Result<()> {
    if session.start().await? == SessionStatus::Failed {
        let message = session.message().unwrap_or("Failed to load review data");
        match session.error() {
            Some(e) => anyhow::bail!("{}: {}", message, e),
            None => anyhow::bail!("{}", message),
        }
    }
    Ok(())
}

/// Print the source pane with right-aligned line numbers
pub(crate) fn print_source(view: &SessionView<'_>) {
    let width = view.source_lines.len().to_string().len();
    for (number, line) in view.numbered_lines() {
        println!("{:>width$} | {}", number, line, width = width);
    }
}

/// Print the comment pane
pub(crate) fn print_comments(view: &SessionView<'_>) {
    println!("Comments:");
    if view.annotations.is_empty() {
        println!("  (none)");
    }
    for annotation in &view.annotations {
        println!("  {}", annotation);
    }
}
