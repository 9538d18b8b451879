//! Pear Client - HTTP access to the Pear to Peer review backend
//!
//! This crate provides the single REST client used by review sessions and
//! the command line. Every call returns [`Result<T, ApiError>`](ApiError).

mod client;
mod error;
mod records;
mod review;

pub use client::{ApiClient, Credentials};
pub use error::{ApiError, Result};
pub use records::{ReviewRecord, SubmissionRecord};
