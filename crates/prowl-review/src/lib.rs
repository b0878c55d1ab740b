//! Pull request review pipeline for the Prowl agent.
//!
//! Provides the pieces the polling loop is built from: the GitHub host
//! client, the completion service client, prompt construction, the review
//! requester, per-pull-request state tracking, and the loop itself.

pub mod github;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod requester;
pub mod state;
