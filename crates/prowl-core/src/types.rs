use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of an open pull request as reported by the host.
///
/// Field names follow the GitHub REST payload so listings deserialize
/// directly; unknown fields are ignored.
///
/// # Examples
///
/// ```
/// use prowl_core::{PullRequest, PullRequestState};
///
/// let json = r#"{
///     "number": 5,
///     "title": "Add tokeniser",
///     "updated_at": "2024-05-01T10:00:00Z",
///     "state": "open"
/// }"#;
/// let pr: PullRequest = serde_json::from_str(json).unwrap();
/// assert_eq!(pr.number, 5);
/// assert_eq!(pr.state, PullRequestState::Open);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number, unique within the repository.
    pub number: u64,
    /// Pull request title.
    #[serde(default)]
    pub title: String,
    /// Last time the host saw an edit, push, or comment.
    pub updated_at: DateTime<Utc>,
    /// Open or closed.
    pub state: PullRequestState,
}

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
}

/// A file touched by a pull request.
///
/// `patch` is absent for binary files and for renames without content
/// changes.
///
/// # Examples
///
/// ```
/// use prowl_core::ChangedFile;
///
/// let file: ChangedFile = serde_json::from_str(
///     r#"{"filename": "logo.png", "status": "added", "additions": 0}"#,
/// ).unwrap();
/// assert_eq!(file.filename, "logo.png");
/// assert!(file.patch.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path of the file relative to the repository root.
    pub filename: String,
    /// Unified-diff text for this file.
    #[serde(default)]
    pub patch: Option<String>,
}

impl ChangedFile {
    /// Build a changed file with a patch.
    pub fn new(filename: impl Into<String>, patch: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            patch: Some(patch.into()),
        }
    }
}

/// The text sent to the completion service for one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPrompt(String);

impl ReviewPrompt {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ReviewPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The model's answer for one pull request, as ordered lines.
///
/// An empty result means there is nothing to post.
///
/// # Examples
///
/// ```
/// use prowl_core::ReviewResult;
///
/// let result = ReviewResult::from_text("A\nB\nC");
/// assert_eq!(result.lines(), ["A", "B", "C"]);
/// assert_eq!(result.body(), "A\nB\nC");
///
/// assert!(ReviewResult::from_text("").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewResult {
    lines: Vec<String>,
}

impl ReviewResult {
    /// Split raw response text on `'\n'`.
    ///
    /// Lines are kept verbatim: no trimming, no deduplication, and a
    /// trailing newline produces a trailing empty line.
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Join the lines back into the single comment body that gets posted.
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }
}
