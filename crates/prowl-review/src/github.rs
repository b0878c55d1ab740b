use async_trait::async_trait;
use prowl_core::{ChangedFile, GitHubConfig, ProwlError, PullRequest};
use serde::Serialize;

const PER_PAGE: usize = 100;

/// The source-control host the polling loop talks to.
///
/// Implemented by [`GitHubClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Open pull requests, most recently updated first.
    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>, ProwlError>;

    /// Current snapshot of a single pull request, whatever its state.
    async fn pull_request(&self, number: u64) -> Result<PullRequest, ProwlError>;

    /// Files changed by pull request `number`, in the host's order.
    async fn changed_files(&self, number: u64) -> Result<Vec<ChangedFile>, ProwlError>;

    /// Attach `body` to pull request `number` as a non-blocking review.
    async fn post_review_comment(&self, number: u64, body: &str) -> Result<(), ProwlError>;
}

/// GitHub client for one repository, built on octocrab.
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    owner: String,
    repo: String,
}

#[derive(Serialize)]
struct ListPullsParams {
    state: &'static str,
    sort: &'static str,
    direction: &'static str,
    per_page: usize,
    page: u32,
}

#[derive(Serialize)]
struct PageParams {
    per_page: usize,
    page: u32,
}

impl GitHubClient {
    /// Create a client for `owner/repo`.
    ///
    /// The token comes from `config.token` or the `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ProwlError::Config`] if no token is available or the
    /// client cannot be built.
    pub fn new(config: &GitHubConfig, owner: &str, repo: &str) -> Result<Self, ProwlError> {
        let token = match &config.token {
            Some(t) => t.clone(),
            None => std::env::var("GITHUB_TOKEN").map_err(|_| {
                ProwlError::Config(
                    "GITHUB_TOKEN not set. Add [github] token to .prowl.toml or set GITHUB_TOKEN"
                        .into(),
                )
            })?,
        };

        let mut builder = octocrab::Octocrab::builder().personal_token(token);
        if let Some(api_base) = &config.api_base {
            builder = builder
                .base_uri(api_base.as_str())
                .map_err(|e| ProwlError::Config(format!("invalid GitHub API base '{api_base}': {e}")))?;
        }
        let octocrab = builder
            .build()
            .map_err(|e| ProwlError::Config(format!("failed to create GitHub client: {e}")))?;

        Ok(Self {
            octocrab,
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// `owner/repo` slug this client is bound to.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[async_trait]
impl PullRequestHost for GitHubClient {
    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>, ProwlError> {
        let route = format!("/repos/{}/{}/pulls", self.owner, self.repo);
        let mut pulls = Vec::new();
        let mut page = 1;
        loop {
            let params = ListPullsParams {
                state: "open",
                sort: "updated",
                direction: "desc",
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<PullRequest> = self
                .octocrab
                .get(&route, Some(&params))
                .await
                .map_err(|e| ProwlError::Host(format!("failed to list pull requests: {e}")))?;
            let done = batch.len() < PER_PAGE;
            pulls.extend(batch);
            if done {
                return Ok(pulls);
            }
            page += 1;
        }
    }

    async fn pull_request(&self, number: u64) -> Result<PullRequest, ProwlError> {
        let route = format!("/repos/{}/{}/pulls/{number}", self.owner, self.repo);
        self.octocrab
            .get(&route, None::<&()>)
            .await
            .map_err(|e| ProwlError::Host(format!("failed to fetch PR #{number}: {e}")))
    }

    async fn changed_files(&self, number: u64) -> Result<Vec<ChangedFile>, ProwlError> {
        let route = format!("/repos/{}/{}/pulls/{number}/files", self.owner, self.repo);
        let mut files = Vec::new();
        let mut page = 1;
        loop {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<ChangedFile> = self
                .octocrab
                .get(&route, Some(&params))
                .await
                .map_err(|e| {
                    ProwlError::Host(format!("failed to fetch files for PR #{number}: {e}"))
                })?;
            let done = batch.len() < PER_PAGE;
            files.extend(batch);
            if done {
                return Ok(files);
            }
            page += 1;
        }
    }

    async fn post_review_comment(&self, number: u64, body: &str) -> Result<(), ProwlError> {
        let route = format!("/repos/{}/{}/pulls/{number}/reviews", self.owner, self.repo);
        let payload = serde_json::json!({
            "event": "COMMENT",
            "body": body,
        });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&payload))
            .await
            .map_err(|e| ProwlError::Post(format!("PR #{number}: {e}")))?;

        Ok(())
    }
}

/// Parse a repository reference string (`owner/name`).
///
/// # Errors
///
/// Returns [`ProwlError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use prowl_review::github::parse_repo_reference;
///
/// let (owner, repo) = parse_repo_reference("octocat/hello-world").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// ```
pub fn parse_repo_reference(repo_ref: &str) -> Result<(String, String), ProwlError> {
    let invalid = || {
        ProwlError::Config(format!(
            "invalid repository reference '{repo_ref}', expected owner/name"
        ))
    };
    let (owner, repo) = repo_ref.trim().split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }
    Ok((owner.to_string(), repo.to_string()))
}
