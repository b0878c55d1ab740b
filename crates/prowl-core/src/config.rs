use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProwlError;

/// Top-level configuration loaded from `.prowl.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
///
/// # Examples
///
/// ```
/// use prowl_core::ProwlConfig;
///
/// let config = ProwlConfig::default();
/// assert_eq!(config.poll.interval_secs, 300);
/// assert_eq!(config.llm.model, "llama3-8b-8192");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProwlConfig {
    /// Repository and GitHub access settings.
    #[serde(default)]
    pub github: GitHubConfig,
    /// Completion service settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Polling loop behavior.
    #[serde(default)]
    pub poll: PollConfig,
}

impl ProwlConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ProwlError::Io`] if the file cannot be read, or
    /// [`ProwlError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use prowl_core::ProwlConfig;
    /// use std::path::Path;
    ///
    /// let config = ProwlConfig::from_file(Path::new(".prowl.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, ProwlError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ProwlError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use prowl_core::ProwlConfig;
    ///
    /// let toml = r#"
    /// [poll]
    /// interval_secs = 60
    /// "#;
    /// let config = ProwlConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.poll.interval_secs, 60);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ProwlError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Return the configured `(owner, repo)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`ProwlError::Config`] if either part is missing or blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use prowl_core::ProwlConfig;
    ///
    /// let mut config = ProwlConfig::default();
    /// assert!(config.repository().is_err());
    ///
    /// config.github.owner = Some("octocat".into());
    /// config.github.repo = Some("hello-world".into());
    /// assert_eq!(config.repository().unwrap(), ("octocat", "hello-world"));
    /// ```
    pub fn repository(&self) -> Result<(&str, &str), ProwlError> {
        let owner = self
            .github
            .owner
            .as_deref()
            .filter(|s| !s.trim().is_empty());
        let repo = self
            .github
            .repo
            .as_deref()
            .filter(|s| !s.trim().is_empty());
        match (owner, repo) {
            (Some(owner), Some(repo)) => Ok((owner, repo)),
            _ => Err(ProwlError::Config(
                "no repository configured. Set [github] owner/repo or pass --repo owner/name"
                    .into(),
            )),
        }
    }
}

/// GitHub access configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Repository owner (user or organisation).
    pub owner: Option<String>,
    /// Repository name.
    pub repo: Option<String>,
    /// Personal access token. Falls back to `GITHUB_TOKEN`.
    pub token: Option<String>,
    /// API root, for GitHub Enterprise. Defaults to `https://api.github.com`.
    pub api_base: Option<String>,
}

/// Completion service configuration.
///
/// # Examples
///
/// ```
/// use prowl_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "llama3-8b-8192");
/// assert!(config.api_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier passed with every completion request.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key. Falls back to `GROQ_API_KEY`, then `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible endpoint.
    pub base_url: Option<String>,
}

fn default_model() -> String {
    "llama3-8b-8192".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
        }
    }
}

/// Polling loop configuration.
///
/// # Examples
///
/// ```
/// use prowl_core::PollConfig;
/// use std::time::Duration;
///
/// let config = PollConfig::default();
/// assert_eq!(config.interval(), Duration::from_secs(300));
/// assert!(config.evict_closed);
/// assert!(!config.dry_run);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between scanning passes, in seconds (default: 300).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Forget pull requests that no longer appear in the open listing.
    #[serde(default = "default_evict_closed")]
    pub evict_closed: bool,
    /// Log generated reviews instead of posting them.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_interval_secs() -> u64 {
    300
}

fn default_evict_closed() -> bool {
    true
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Reject settings the polling loop cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ProwlError::Config`] when `interval_secs` is zero, which
    /// would turn the loop into a busy poll against the host.
    pub fn validate(&self) -> Result<(), ProwlError> {
        if self.interval_secs == 0 {
            return Err(ProwlError::Config(
                "poll interval must be at least 1 second (interval_secs = 0)".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            evict_closed: default_evict_closed(),
            dry_run: false,
        }
    }
}
