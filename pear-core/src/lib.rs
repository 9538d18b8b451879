//! Pear Core - Review model for the Pear to Peer code-review platform
//!
//! This crate holds the line-anchored annotation model, the LLM hint
//! aggregation, and the review session that ties them to a backend. It has
//! no HTTP or UI code; the backend is reached through [`ReviewBackend`].

pub mod annotation;
pub mod config;
pub mod error;
pub mod hints;
pub mod secrets;
pub mod session;

pub use annotation::{Annotation, AnnotationSet, LineKey, WireAnnotations};
pub use config::{ApiConfig, Config, SessionConfig};
pub use error::{Error, Result};
pub use hints::{aggregate, aggregate_content, AggregatedHints, Hint, HintCategory, HintSection};
pub use secrets::{ApiToken, SecretsFile, TokenSource, TOKEN_ENV};
pub use session::{
    FailureStage, ReviewBackend, ReviewSession, SessionMode, SessionStatus, SessionView,
};
