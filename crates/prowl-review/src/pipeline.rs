use std::fmt;

use prowl_core::{PollConfig, ProwlError, PullRequest, PullRequestState, ReviewResult};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::github::PullRequestHost;
use crate::llm::CompletionService;
use crate::prompt;
use crate::requester::ReviewRequester;
use crate::state::PullRequestTracker;

/// What happened to one pull request during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewOutcome {
    /// Unchanged since the last review; nothing fetched or posted.
    Skipped,
    /// Review generated and posted as a comment.
    Posted,
    /// The model returned no content, so nothing was posted.
    Empty,
    /// Review generated but only logged (dry run).
    DryRun,
    /// The completion service failed.
    ServiceFailed,
    /// Review generated but posting it failed.
    PostFailed,
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReviewOutcome::Skipped => "skipped",
            ReviewOutcome::Posted => "posted",
            ReviewOutcome::Empty => "empty",
            ReviewOutcome::DryRun => "dry-run",
            ReviewOutcome::ServiceFailed => "service-failed",
            ReviewOutcome::PostFailed => "post-failed",
        };
        f.write_str(label)
    }
}

/// Per-pull-request outcomes of one scanning pass, in listing order.
///
/// # Examples
///
/// ```
/// use prowl_review::pipeline::{PassReport, ReviewOutcome};
///
/// let report = PassReport {
///     outcomes: vec![(9, ReviewOutcome::Posted), (5, ReviewOutcome::Skipped)],
///     evicted: 0,
/// };
/// assert_eq!(report.count(ReviewOutcome::Posted), 1);
/// assert_eq!(report.outcome_for(5), Some(ReviewOutcome::Skipped));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    /// `(pull request number, outcome)` pairs.
    pub outcomes: Vec<(u64, ReviewOutcome)>,
    /// Tracker entries dropped because the host reported their pull requests closed.
    pub evicted: usize,
}

impl PassReport {
    pub fn count(&self, outcome: ReviewOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }

    pub fn outcome_for(&self, number: u64) -> Option<ReviewOutcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, o)| *o)
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Open: {} | Posted: {} | Empty: {} | Skipped: {} | Failed: {}",
            self.outcomes.len(),
            self.count(ReviewOutcome::Posted) + self.count(ReviewOutcome::DryRun),
            self.count(ReviewOutcome::Empty),
            self.count(ReviewOutcome::Skipped),
            self.count(ReviewOutcome::ServiceFailed) + self.count(ReviewOutcome::PostFailed),
        )?;
        for (number, outcome) in &self.outcomes {
            writeln!(f, "  #{number}: {outcome}")?;
        }
        Ok(())
    }
}

/// Drives the review cycle: list, compare, review, post, record, sleep.
///
/// Owns the tracker, so every pass sees the timestamps recorded by the
/// previous ones. Pull requests are handled strictly one at a time.
pub struct PollingLoop<H, C> {
    host: H,
    requester: ReviewRequester<C>,
    tracker: PullRequestTracker,
    config: PollConfig,
}

impl<H, C> PollingLoop<H, C>
where
    H: PullRequestHost,
    C: CompletionService,
{
    pub fn new(host: H, requester: ReviewRequester<C>, config: PollConfig) -> Self {
        Self {
            host,
            requester,
            tracker: PullRequestTracker::new(),
            config,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn requester(&self) -> &ReviewRequester<C> {
        &self.requester
    }

    pub fn tracker(&self) -> &PullRequestTracker {
        &self.tracker
    }

    /// Run passes forever, sleeping the configured interval between them.
    ///
    /// A failed pass is logged and the loop carries on; tracker updates
    /// made before the failure are kept.
    pub async fn run_forever(&mut self) {
        let interval = self.config.interval();
        loop {
            match self.run_pass().await {
                Ok(report) => info!(
                    open = report.outcomes.len(),
                    posted = report.count(ReviewOutcome::Posted),
                    skipped = report.count(ReviewOutcome::Skipped),
                    "pass complete"
                ),
                Err(e) => error!(error = %e, "pass aborted"),
            }
            debug!(secs = interval.as_secs(), "sleeping until next pass");
            tokio::time::sleep(interval).await;
        }
    }

    /// Scan the open pull requests once.
    ///
    /// # Errors
    ///
    /// Returns [`ProwlError::Host`] if listing pull requests or fetching a
    /// pull request's files fails. The remaining pull requests of the pass
    /// are not visited. Completion and posting failures do not abort the
    /// pass; they show up as outcomes in the report.
    pub async fn run_pass(&mut self) -> Result<PassReport, ProwlError> {
        let pulls = self.host.list_open_pull_requests().await?;
        info!(open = pulls.len(), "looking for new or updated pull requests");

        let mut report = PassReport::default();
        for pr in &pulls {
            let outcome = self.review_pull_request(pr).await?;
            report.outcomes.push((pr.number, outcome));
        }

        if self.config.evict_closed {
            report.evicted = self.evict_closed(&pulls).await;
        }

        Ok(report)
    }

    /// Forget tracked pull requests the host confirms are closed.
    ///
    /// Entries that are merely missing from the listing, or whose state
    /// cannot be fetched, are kept.
    async fn evict_closed(&mut self, pulls: &[PullRequest]) -> usize {
        let mut evicted = 0;
        for number in self.tracker.missing_from(pulls.iter().map(|pr| pr.number)) {
            match self.host.pull_request(number).await {
                Ok(pr) if pr.state == PullRequestState::Closed => {
                    if self.tracker.forget(number) {
                        evicted += 1;
                    }
                }
                Ok(_) => debug!(number, "missing from listing but still open, keeping"),
                Err(e) => debug!(number, error = %e, "could not confirm state, keeping"),
            }
        }
        if evicted > 0 {
            debug!(evicted, "forgot closed pull requests");
        }
        evicted
    }

    async fn review_pull_request(&mut self, pr: &PullRequest) -> Result<ReviewOutcome, ProwlError> {
        if !self.tracker.should_review(pr.number, pr.updated_at) {
            debug!(number = pr.number, "unchanged since last review");
            return Ok(ReviewOutcome::Skipped);
        }

        info!(number = pr.number, title = %pr.title, "reviewing pull request");
        let files = self.host.changed_files(pr.number).await?;
        let prompt = prompt::build_prompt(&files);
        debug!(number = pr.number, files = files.len(), chars = prompt.len(), "built review prompt");

        let outcome = match self.requester.request_review(&prompt).await {
            Ok(result) if result.is_empty() => {
                info!(number = pr.number, "no review content returned, nothing to post");
                ReviewOutcome::Empty
            }
            Ok(result) => self.publish(pr, &result).await,
            Err(e) => {
                error!(number = pr.number, error = %e, "review generation failed");
                ReviewOutcome::ServiceFailed
            }
        };

        // recorded even on failure: one attempt per host-side update
        self.tracker.record(pr.number, pr.updated_at);
        Ok(outcome)
    }

    async fn publish(&self, pr: &PullRequest, result: &ReviewResult) -> ReviewOutcome {
        let body = result.body();
        if self.config.dry_run {
            info!(number = pr.number, review = %body, "dry run, review not posted");
            return ReviewOutcome::DryRun;
        }

        match self.host.post_review_comment(pr.number, &body).await {
            Ok(()) => {
                info!(number = pr.number, lines = result.lines().len(), "posted review");
                ReviewOutcome::Posted
            }
            Err(e) => {
                error!(number = pr.number, error = %e, "posting review failed, dropped until the next update");
                ReviewOutcome::PostFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels() {
        assert_eq!(ReviewOutcome::ServiceFailed.to_string(), "service-failed");
        assert_eq!(ReviewOutcome::DryRun.to_string(), "dry-run");
    }

    #[test]
    fn report_summary_counts_outcomes() {
        let report = PassReport {
            outcomes: vec![
                (9, ReviewOutcome::Posted),
                (7, ReviewOutcome::ServiceFailed),
                (5, ReviewOutcome::Skipped),
                (3, ReviewOutcome::PostFailed),
            ],
            evicted: 1,
        };
        let text = report.to_string();
        assert!(text.starts_with("Open: 4 | Posted: 1 | Empty: 0 | Skipped: 1 | Failed: 2"));
        assert!(text.contains("  #7: service-failed"));
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = PassReport {
            outcomes: vec![(1, ReviewOutcome::DryRun)],
            evicted: 0,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0][1], "dryRun");
        assert_eq!(json["evicted"], 0);
    }

    #[test]
    fn missing_number_has_no_outcome() {
        assert_eq!(PassReport::default().outcome_for(42), None);
    }
}
