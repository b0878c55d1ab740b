//! Core types, configuration, and error handling for the Prowl review agent.
//!
//! This crate provides the shared foundation used by the review pipeline
//! and the `prowl` binary:
//! - [`ProwlError`] — unified error type using `thiserror`
//! - [`ProwlConfig`] — configuration loaded from `.prowl.toml`
//! - Shared types: [`PullRequest`], [`ChangedFile`], [`ReviewPrompt`],
//!   [`ReviewResult`]

mod config;
mod error;
mod types;

pub use config::{GitHubConfig, LlmConfig, PollConfig, ProwlConfig};
pub use error::ProwlError;
pub use types::{ChangedFile, PullRequest, PullRequestState, ReviewPrompt, ReviewResult};

/// A convenience `Result` type for Prowl operations.
pub type Result<T> = std::result::Result<T, ProwlError>;
