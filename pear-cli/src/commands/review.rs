//! Review command - Author a review for a submission

use clap::Args;
use pear_core::{Config, ReviewSession, SessionStatus};

use super::{connect, print_comments, print_source, start_session};

/// Arguments for the review command
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Submission to review
    pub submission_id: String,

    /// Comment on a line, as LINE=TEXT (repeatable; later comments on a line win)
    #[arg(short, long = "comment", value_parser = parse_comment, allow_hyphen_values = true)]
    pub comments: Vec<(i64, String)>,

    /// Send the review; without this only the request body is printed
    #[arg(long)]
    pub submit: bool,
}

impl ReviewArgs {
    /// Execute the review command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = connect(config)?;
        let mut session = ReviewSession::author(client, &self.submission_id, &config.session);
        start_session(&mut session).await?;

        for (line, text) in &self.comments {
            session
                .record_comment(*line, text.clone())
                .map_err(|e| anyhow::anyhow!("Comment on line {} rejected: {}", line, e))?;
        }

        let view = session.view();
        println!("Code");
        println!("====");
        print_source(&view);
        println!();
        println!("Hints");
        println!("=====");
        if let Some(hints) = view.hints {
            print!("{}", hints.render());
        }
        println!();
        print_comments(&view);
        println!();

        if !self.submit {
            if session.annotations().is_empty() {
                println!("[Dry run] No comments recorded; nothing to submit");
            } else {
                println!(
                    "[Dry run] Would submit: {}",
                    session.annotations().to_wire_json()?
                );
            }
            return Ok(());
        }

        match session.submit().await? {
            SessionStatus::Submitted => {
                println!("{}", session.message().unwrap_or("Review submitted"));
                Ok(())
            }
            _ => anyhow::bail!(
                "{}",
                session.message().unwrap_or("Failed to submit review.")
            ),
        }
    }
}

/// Parse `LINE=TEXT`
fn parse_comment(raw: &str) -> Result<(i64, String), String> {
    let (line, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LINE=TEXT, got `{}`", raw))?;
    let line = line
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("`{}` is not a line number", line.trim()))?;
    Ok((line, text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ReviewArgs,
    }

    #[test]
    fn test_parse_comment() {
        assert_eq!(
            parse_comment("12=use a constant").unwrap(),
            (12, "use a constant".to_string())
        );
        assert_eq!(
            parse_comment(" 3 =a=b").unwrap(),
            (3, "a=b".to_string())
        );
    }

    #[test]
    fn test_parse_comment_errors() {
        assert!(parse_comment("no separator").is_err());
        assert!(parse_comment("x=text").is_err());
        // Range and sign are checked by the session, not the parser
        assert_eq!(parse_comment("0=x").unwrap().0, 0);
    }

    #[test]
    fn test_negative_line_reaches_session() {
        let harness = Harness::try_parse_from(["pear", "42", "-c", "-3=x", "--submit"]).unwrap();
        assert_eq!(harness.args.comments, vec![(-3, "x".to_string())]);
        assert!(harness.args.submit);
    }
}
