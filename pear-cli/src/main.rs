//! Pear CLI - Command line interface for Pear to Peer
//!
//! Review submissions line by line and read back finished reviews.

mod commands;

use clap::{Parser, Subcommand};
use pear_core::{Config, SecretsFile};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{HintsArgs, ReviewArgs, ReviewsArgs, ShowArgs, SubmissionsArgs};

/// Pear to Peer: peer code review from the terminal
#[derive(Parser, Debug)]
#[command(name = "pear")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL (overrides config and env)
    #[arg(long, global = true, env = "PEAR_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Review a submission: show code and hints, add comments, submit
    #[command(visible_alias = "r")]
    Review(ReviewArgs),

    /// Show a finished review with its comments
    Show(ShowArgs),

    /// Show the LLM hints for a submission
    Hints(HintsArgs),

    /// List reviews written by you, or about you in a course
    Reviews(ReviewsArgs),

    /// List your submissions
    Submissions(SubmissionsArgs),

    /// Show current configuration
    Config,

    /// Create a secrets file template for the API token
    InitSecrets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let config = Config::load_with_overrides(cli.base_url.clone())?;

    if cli.verbose {
        tracing::info!(
            base_url = %config.api.base_url,
            api_timeout = ?config.api.timeout,
            session_timeout = ?config.session.timeout,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("pear {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Review(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Show(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Hints(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Reviews(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Submissions(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            println!("Pear Configuration");
            println!("==================");
            println!();
            println!("API Settings:");
            println!("  base_url: {}", config.api.base_url);
            println!("  timeout: {:?}", config.api.timeout);
            println!();
            println!("Session Settings:");
            println!("  timeout: {:?}", config.session.timeout);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        Some(Commands::InitSecrets) => {
            let file = SecretsFile::default_location()
                .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
            file.write_template()?;
            println!("Created {}", file.path().display());
            println!("Add the token returned by /api/login, or set PEAR_TOKEN instead.");
        }
        None => {
            println!("Pear to Peer - peer code review from the terminal");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
