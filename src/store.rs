//! `ReportStore` (C9): the abstract persistence interface, plus an
//! in-memory implementation used locally and by the adapter's own tests.
//!
//! The reference deployment is a cloud partitioned table service (see
//! spec.md §6); wiring one up behind this trait is the deploying
//! operator's job and is deliberately not done here (§1, out of scope:
//! persistence is an external collaborator).

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::finding::Summary;

/// Errors a [`ReportStore`] can surface.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum StoreError {
    /// The store could not be constructed or reached.
    #[display(fmt = "report store unavailable")]
    Unavailable,
    /// A duplicate-key write. Callers treat this as success (§7); it is
    /// exposed here only so an implementation can report it honestly.
    #[display(fmt = "conflicting write for row {_0}")]
    Conflict(#[error(not(source))] String),
}

/// The full persisted field layout (spec.md §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    /// Partition key: the repository identifier.
    pub repo: String,
    /// Row key: the opaque report id.
    pub id: String,
    /// Free-form source label supplied by the caller (e.g. a CI job name).
    pub source: Option<String>,
    /// ISO-8601 UTC creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Finding counts by severity.
    pub summary: Summary,
    /// Rendered Markdown, possibly truncated.
    pub markdown: String,
    /// Whether `markdown` was truncated to the configured bound.
    pub markdown_truncated: bool,
    /// The findings, JSON-encoded, possibly truncated.
    pub items_json: String,
    /// Whether `items_json` was truncated to the configured bound.
    pub items_truncated: bool,
}

/// The subset of [`StoredReport`] returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStub {
    /// Partition key: the repository identifier.
    pub repo: String,
    /// Row key: the opaque report id.
    pub id: String,
    /// Free-form source label supplied by the caller.
    pub source: Option<String>,
    /// ISO-8601 UTC creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Finding counts by severity.
    pub summary: Summary,
}

impl From<&StoredReport> for ReportStub {
    fn from(report: &StoredReport) -> Self {
        Self {
            repo: report.repo.clone(),
            id: report.id.clone(),
            source: report.source.clone(),
            created_at: report.created_at,
            summary: report.summary,
        }
    }
}

/// An opaque pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationToken(pub String);

/// One page of [`ReportStub`]s plus the cursor for the next page, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPage {
    /// The stubs in this page, newest first.
    pub items: Vec<ReportStub>,
    /// Present iff there are more results after this page.
    pub next_token: Option<ContinuationToken>,
}

/// Abstract persistence for rendered reports.
///
/// Implemented by any partitioned key/value store. `put` is idempotent on
/// conflict: a [`StoreError::Conflict`] is the caller's cue to treat the
/// write as already-successful, not an error to propagate.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persists `report`, keyed by `(report.repo, report.id)`.
    async fn put(&self, report: StoredReport) -> Result<(), StoreError>;

    /// Returns a page of stubs for `repo`, newest first.
    async fn list_page(
        &self,
        repo: &str,
        page_size: u32,
        continuation: Option<ContinuationToken>,
    ) -> Result<ReportPage, StoreError>;

    /// Looks up a report by id (row key), regardless of partition.
    async fn get_by_id(&self, id: &str) -> Result<Option<StoredReport>, StoreError>;
}

/// An in-memory [`ReportStore`], suitable for local runs and tests.
///
/// Backed by a `Mutex`-guarded map keyed by `(repo, id)`; `list_page`
/// orders by `created_at` descending (ties broken by id) to approximate a
/// table store whose row keys are time-ordered.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    reports: Mutex<BTreeMap<(String, String), StoredReport>>,
}

impl InMemoryReportStore {
    /// Builds an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn put(&self, report: StoredReport) -> Result<(), StoreError> {
        let mut reports = self.reports.lock().map_err(|_| StoreError::Unavailable)?;
        // idempotent on conflict: overwriting an existing id for the same
        // repo is treated the same as a fresh insert by the caller.
        reports.insert((report.repo.clone(), report.id.clone()), report);
        Ok(())
    }

    async fn list_page(
        &self,
        repo: &str,
        page_size: u32,
        continuation: Option<ContinuationToken>,
    ) -> Result<ReportPage, StoreError> {
        let reports = self.reports.lock().map_err(|_| StoreError::Unavailable)?;

        let mut matching: Vec<&StoredReport> = reports
            .values()
            .filter(|report| report.repo == repo)
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let start = continuation
            .as_ref()
            .and_then(|token| matching.iter().position(|report| report.id == token.0))
            .map(|pos| pos + 1)
            .unwrap_or(0);

        let page_size = page_size.max(1) as usize;
        let items: Vec<ReportStub> = matching
            .iter()
            .skip(start)
            .take(page_size)
            .map(|report| ReportStub::from(*report))
            .collect();

        let next_token = if start + items.len() < matching.len() {
            items.last().map(|stub| ContinuationToken(stub.id.clone()))
        } else {
            None
        };

        Ok(ReportPage { items, next_token })
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredReport>, StoreError> {
        let reports = self.reports.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(reports.values().find(|report| report.id == id).cloned())
    }
}
