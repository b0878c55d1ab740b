use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

/// Last-seen update time per pull request number.
///
/// Lives for the lifetime of the process; nothing is written to disk.
/// A pull request is due for review when it has never been seen or when
/// the host reports a strictly newer `updated_at`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use prowl_review::state::PullRequestTracker;
///
/// let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
/// let mut tracker = PullRequestTracker::new();
/// assert!(tracker.should_review(5, t1));
///
/// tracker.record(5, t1);
/// assert!(!tracker.should_review(5, t1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PullRequestTracker {
    last_seen: HashMap<u64, DateTime<Utc>>,
}

impl PullRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_review(&self, number: u64, updated_at: DateTime<Utc>) -> bool {
        match self.last_seen.get(&number) {
            Some(seen) => updated_at > *seen,
            None => true,
        }
    }

    /// Store `updated_at` for `number`, replacing any earlier value.
    pub fn record(&mut self, number: u64, updated_at: DateTime<Utc>) {
        self.last_seen.insert(number, updated_at);
    }

    pub fn last_seen(&self, number: u64) -> Option<DateTime<Utc>> {
        self.last_seen.get(&number).copied()
    }

    /// Tracked numbers that do not appear in `open`, in ascending order.
    ///
    /// Absence from one listing is not proof of closure (pages can shift
    /// while they are fetched), so callers confirm before calling
    /// [`forget`](Self::forget).
    pub fn missing_from(&self, open: impl IntoIterator<Item = u64>) -> Vec<u64> {
        let open: HashSet<u64> = open.into_iter().collect();
        let mut missing: Vec<u64> = self
            .last_seen
            .keys()
            .copied()
            .filter(|number| !open.contains(number))
            .collect();
        missing.sort_unstable();
        missing
    }

    /// Drop the entry for `number`. Returns whether one existed.
    pub fn forget(&mut self, number: u64) -> bool {
        self.last_seen.remove(&number).is_some()
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}
