//! Reconciliation of candidate searches against the persistent store.
//!
//! A reconcile call moves through `checking -> partitioning -> writing` and
//! ends `Done` or `Failed`. Nothing is retried here; callers decide whether
//! to resubmit a failed outcome. Consistency under concurrent calls comes
//! entirely from the store's insert-or-ignore semantics.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use thiserror::Error;

use crate::search::{canonicalize, is_canonical_search_valid};

/// Hard ceiling on searches per existence check, imposed by the store's query API.
pub const MAX_CHECK_CHUNK: usize = 100;
pub const DEFAULT_CHECK_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent set of canonical searches, each flagged used or unused.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Return the subset of `searches` already stored.
    ///
    /// Callers pass at most [`MAX_CHECK_CHUNK`] searches per call.
    async fn exists_any(&self, searches: &[String]) -> Result<HashSet<String>, StoreError>;

    /// Insert `searches`, treating an existing key as a no-op.
    ///
    /// Returns how many rows were actually inserted.
    async fn upsert_ignore_conflict(&self, searches: &[String]) -> Result<u64, StoreError>;

    async fn count_all(&self) -> Result<i64, StoreError>;

    /// Searches not yet consumed by the scraping job.
    async fn count_unused(&self) -> Result<i64, StoreError>;
}

#[async_trait]
impl<T: SearchStore + ?Sized> SearchStore for Arc<T> {
    async fn exists_any(&self, searches: &[String]) -> Result<HashSet<String>, StoreError> {
        (**self).exists_any(searches).await
    }

    async fn upsert_ignore_conflict(&self, searches: &[String]) -> Result<u64, StoreError> {
        (**self).upsert_ignore_conflict(searches).await
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        (**self).count_all().await
    }

    async fn count_unused(&self) -> Result<i64, StoreError> {
        (**self).count_unused().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStatus {
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum FailureReason {
    /// The search failed the length or character rule and was never sent to the store.
    InvalidFormat,
    /// The store call covering this search failed.
    StoreUnavailable(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::InvalidFormat => write!(f, "invalid-format"),
            FailureReason::StoreUnavailable(message) => write!(f, "store-unavailable: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileFailure {
    /// Canonical form of the submitted search.
    pub input: String,
    pub reason: FailureReason,
}

/// Result of one [`Reconciler::reconcile`] call.
///
/// `new_count + existing_count + failures.len()` always equals the number of
/// distinct canonical searches submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub status: ReconcileStatus,
    pub new_count: u64,
    pub existing_count: u64,
    pub failures: Vec<ReconcileFailure>,
}

impl ReconcileOutcome {
    fn empty() -> Self {
        Self {
            status: ReconcileStatus::Done,
            new_count: 0,
            existing_count: 0,
            failures: Vec::new(),
        }
    }

    /// Number of distinct searches this outcome accounts for.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.new_count + self.existing_count + self.failures.len() as u64
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == ReconcileStatus::Failed
    }
}

/// Diffs candidate searches against a [`SearchStore`] and writes the new ones.
pub struct Reconciler<S> {
    store: S,
    chunk_size: usize,
    concurrency: usize,
}

impl<S: SearchStore> Reconciler<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            chunk_size: MAX_CHECK_CHUNK,
            concurrency: DEFAULT_CHECK_CONCURRENCY,
        }
    }

    /// Searches per existence check, clamped into `1..=100`.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_CHECK_CHUNK);
        self
    }

    /// Existence checks allowed in flight at once; at least one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert every candidate the store does not already hold.
    ///
    /// Candidates are canonicalized and de-duplicated first (first occurrence
    /// wins the position). Malformed candidates are reported as
    /// [`FailureReason::InvalidFormat`] without touching the store. A store
    /// failure marks every search that was not confirmed as existing with
    /// [`FailureReason::StoreUnavailable`] and reports `new_count = 0`.
    pub async fn reconcile<I, T>(&self, candidates: I) -> ReconcileOutcome
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut outcome = ReconcileOutcome::empty();

        let mut seen: HashSet<String> = HashSet::new();
        let mut valid: Vec<String> = Vec::new();
        for candidate in candidates {
            let canonical = canonicalize(candidate.as_ref());
            if !seen.insert(canonical.clone()) {
                continue;
            }
            if is_canonical_search_valid(&canonical) {
                valid.push(canonical);
            } else {
                outcome.failures.push(ReconcileFailure {
                    input: canonical,
                    reason: FailureReason::InvalidFormat,
                });
            }
        }

        if valid.is_empty() {
            return outcome;
        }

        tracing::debug!(
            phase = "checking",
            candidates = valid.len(),
            chunk_size = self.chunk_size,
            "checking existing searches"
        );
        let existing = match self.existing(&valid).await {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!(error = %e, candidates = valid.len(), "existence check failed");
                fail_all(&mut outcome, valid, &e);
                return outcome;
            }
        };

        tracing::debug!(phase = "partitioning", existing = existing.len());
        let (present, to_write): (Vec<String>, Vec<String>) =
            valid.into_iter().partition(|s| existing.contains(s));
        outcome.existing_count = present.len() as u64;

        if to_write.is_empty() {
            tracing::info!(
                new = 0,
                existing = outcome.existing_count,
                invalid = outcome.failures.len(),
                "reconciled searches"
            );
            return outcome;
        }

        tracing::debug!(phase = "writing", count = to_write.len());
        match self.store.upsert_ignore_conflict(&to_write).await {
            Ok(written) => {
                let attempted = to_write.len() as u64;
                let written = written.min(attempted);
                // Rows skipped on conflict were inserted by a concurrent writer.
                outcome.new_count = written;
                outcome.existing_count += attempted - written;
                tracing::info!(
                    new = outcome.new_count,
                    existing = outcome.existing_count,
                    invalid = outcome.failures.len(),
                    "reconciled searches"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, attempted = to_write.len(), "search write failed");
                fail_all(&mut outcome, to_write, &e);
            }
        }

        outcome
    }

    /// Total stored searches; 0 if the store cannot be read.
    pub async fn count_all(&self) -> i64 {
        self.store.count_all().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "count of all searches unavailable; reporting 0");
            0
        })
    }

    /// Stored searches not yet used; 0 if the store cannot be read.
    pub async fn count_unused(&self) -> i64 {
        self.store.count_unused().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "count of unused searches unavailable; reporting 0");
            0
        })
    }

    async fn existing(&self, searches: &[String]) -> Result<HashSet<String>, StoreError> {
        // Futures are built up front so the stream type carries no closure;
        // otherwise the reconcile future loses its `Send` bound.
        let checks: Vec<_> = searches
            .chunks(self.chunk_size)
            .map(|chunk| self.store.exists_any(chunk))
            .collect();
        stream::iter(checks)
            .buffered(self.concurrency)
            .try_fold(HashSet::new(), |mut acc, found| async move {
                acc.extend(found);
                Ok::<_, StoreError>(acc)
            })
            .await
    }
}

fn fail_all(outcome: &mut ReconcileOutcome, searches: Vec<String>, error: &StoreError) {
    let message = match error {
        StoreError::Unavailable(message) => message.clone(),
    };
    outcome.status = ReconcileStatus::Failed;
    outcome.new_count = 0;
    outcome
        .failures
        .extend(searches.into_iter().map(|input| ReconcileFailure {
            input,
            reason: FailureReason::StoreUnavailable(message.clone()),
        }));
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
