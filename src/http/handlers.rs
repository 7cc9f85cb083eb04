//! Framework-agnostic handler bodies for the three `/reports` routes.
//!
//! Each function takes already-extracted inputs (never an `axum` request
//! type) and returns a plain response struct, so the core logic is
//! unit-testable without standing up a listener. [`super::router`] wires
//! these into an `axum::Router`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{AppConfig, TRUNCATION_BOUND};
use crate::doc::load_spec;
use crate::engine::diff;
use crate::finding::{Finding, Summary};
use crate::render::render_markdown;
use crate::store::{ContinuationToken, ReportPage, ReportStore, StoredReport};

use super::error::AdapterError;

/// Either an embedded document tree or raw JSON/YAML text, as accepted in
/// the `base`/`head` fields of a [`PostReportsRequest`].
///
/// Deserialized as a plain JSON value rather than as a tagged enum: a JSON
/// string value is ambiguous with an embedded document only at the type
/// level, never at the value level, so the distinction is made here by
/// inspecting the decoded [`crate::doc::SpecDoc`] rather than in `serde`.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct SpecInput(crate::doc::SpecDoc);

impl From<SpecInput> for crate::doc::LoadInput {
    fn from(input: SpecInput) -> Self {
        match input.0 {
            serde_json::Value::String(text) => text.into(),
            value => value.into(),
        }
    }
}

/// Body of `POST /reports`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostReportsRequest {
    /// The base (old) revision.
    pub base: SpecInput,
    /// The head (new) revision.
    pub head: SpecInput,
    /// The repository this report belongs to. Defaults to `"default"` when
    /// absent, since partitioning is an adapter concern the caller may not
    /// care about.
    #[serde(default)]
    pub repo: Option<String>,
    /// Free-form label for where this report came from, e.g. a CI job name.
    #[serde(default)]
    pub source: Option<String>,
}

/// Response of `POST /reports`.
///
/// Serialized in `camelCase` to match the documented wire contract
/// (`{ reportId, repo, summary, markdown, items }`), not the Rust struct's
/// own `snake_case` field names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReportsResponse {
    /// The fresh id assigned to this report.
    pub report_id: String,
    /// The repository this report was filed under.
    pub repo: String,
    /// Finding counts by severity.
    pub summary: Summary,
    /// The rendered Markdown, possibly truncated.
    pub markdown: String,
    /// The findings, possibly truncated to an empty tail marker.
    pub items: Vec<Finding>,
}

fn truncate(mut text: String) -> (String, bool) {
    if text.len() <= TRUNCATION_BOUND {
        return (text, false);
    }
    let mut cut = TRUNCATION_BOUND;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str("...");
    (text, true)
}

/// Handles `POST /reports`: loads both documents, diffs them, renders and
/// persists the report, and returns it.
pub async fn post_reports(
    config: &AppConfig,
    store: &Arc<dyn ReportStore>,
    token: Option<&str>,
    request: PostReportsRequest,
) -> Result<PostReportsResponse, AdapterError> {
    if !config.ingest_authorized(token) {
        return Err(AdapterError::Unauthorized);
    }

    let base = load_spec(request.base)?.ok_or(crate::EngineError::InputInvalid)?;
    let head = load_spec(request.head)?.ok_or(crate::EngineError::InputInvalid)?;

    let report = diff(&base, &head)?;
    let markdown = render_markdown(&report);
    let items_json = serde_json::to_string(&report.items)
        .map_err(|err| AdapterError::Unexpected(err.to_string()))?;

    let (markdown, markdown_truncated) = truncate(markdown);
    let (items_json, items_truncated) = truncate(items_json);

    let repo = request.repo.unwrap_or_else(|| "default".to_owned());
    let report_id = Uuid::new_v4().to_string();

    let stored = StoredReport {
        repo: repo.clone(),
        id: report_id.clone(),
        source: request.source,
        created_at: chrono::Utc::now(),
        summary: report.summary,
        markdown: markdown.clone(),
        markdown_truncated,
        items_json: items_json.clone(),
        items_truncated,
    };
    store.put(stored).await?;

    Ok(PostReportsResponse {
        report_id,
        repo,
        summary: report.summary,
        markdown,
        items: report.items,
    })
}

/// Query parameters for `GET /reports`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListReportsQuery {
    /// The repository to list reports for.
    pub repo: String,
    /// Client-requested page size; clamped server-side.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Opaque continuation cursor from a previous page.
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Handles `GET /reports`.
pub async fn list_reports(
    config: &AppConfig,
    store: &Arc<dyn ReportStore>,
    token: Option<&str>,
    query: ListReportsQuery,
) -> Result<ReportPage, AdapterError> {
    if !config.admin_authorized(token) {
        return Err(AdapterError::Unauthorized);
    }

    let page_size = config.clamp_page_size(query.limit);
    let continuation = query.next_token.map(ContinuationToken);
    let page = store.list_page(&query.repo, page_size, continuation).await?;
    Ok(page)
}

/// Handles `GET /reports/:id`.
pub async fn get_report(
    config: &AppConfig,
    store: &Arc<dyn ReportStore>,
    token: Option<&str>,
    id: &str,
) -> Result<StoredReport, AdapterError> {
    if !config.admin_authorized(token) {
        return Err(AdapterError::Unauthorized);
    }

    store.get_by_id(id).await?.ok_or(AdapterError::NotFound)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::store::InMemoryReportStore;

    fn config() -> AppConfig {
        AppConfig {
            table_name: "reports".into(),
            storage_connection_string: None,
            admin_token: Some("admin-secret".into()),
            ingest_token: Some("ingest-secret".into()),
            debug: false,
        }
    }

    fn sample_request() -> PostReportsRequest {
        PostReportsRequest {
            base: SpecInput(json!({"paths": {"/pets": {"get": {}}}})),
            head: SpecInput(json!({"paths": {}})),
            repo: Some("acme/api".into()),
            source: Some("ci".into()),
        }
    }

    #[tokio::test]
    async fn post_reports_rejects_bad_token() {
        let store: Arc<dyn ReportStore> = Arc::new(InMemoryReportStore::new());
        let err = post_reports(&config(), &store, Some("wrong"), sample_request())
            .await
            .unwrap_err();
        assert_matches!(err, AdapterError::Unauthorized);
    }

    #[tokio::test]
    async fn post_reports_persists_and_returns_a_report() {
        let store: Arc<dyn ReportStore> = Arc::new(InMemoryReportStore::new());
        let response = post_reports(&config(), &store, Some("ingest-secret"), sample_request())
            .await
            .unwrap();

        assert_eq!(response.repo, "acme/api");
        assert_eq!(response.summary.breaking, 1);
        assert!(response.markdown.contains("## TrueSpec Summary"));
        assert_eq!(response.items.len(), 1);

        let stored = store.get_by_id(&response.report_id).await.unwrap().unwrap();
        assert_eq!(stored.repo, "acme/api");
        assert_eq!(stored.source.as_deref(), Some("ci"));
    }

    #[tokio::test]
    async fn post_reports_response_serializes_with_camel_case_keys() {
        let store: Arc<dyn ReportStore> = Arc::new(InMemoryReportStore::new());
        let response = post_reports(&config(), &store, Some("ingest-secret"), sample_request())
            .await
            .unwrap();

        let value = serde_json::to_value(&response).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("reportId"), "expected a reportId key, got {value}");
        assert!(!object.contains_key("report_id"));
        assert!(object.contains_key("repo"));
        assert!(object.contains_key("summary"));
        assert!(object.contains_key("markdown"));
        assert!(object.contains_key("items"));
    }

    #[tokio::test]
    async fn post_reports_rejects_unparseable_document() {
        let store: Arc<dyn ReportStore> = Arc::new(InMemoryReportStore::new());
        let mut request = sample_request();
        request.base = SpecInput(json!("not: [valid"));
        let err = post_reports(&config(), &store, Some("ingest-secret"), request)
            .await
            .unwrap_err();
        assert_matches!(err, AdapterError::Engine(_));
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_reports_requires_admin_token() {
        let store: Arc<dyn ReportStore> = Arc::new(InMemoryReportStore::new());
        let query = ListReportsQuery {
            repo: "acme/api".into(),
            limit: None,
            next_token: None,
        };
        let err = list_reports(&config(), &store, None, query).await.unwrap_err();
        assert_matches!(err, AdapterError::Unauthorized);
    }

    #[tokio::test]
    async fn get_report_returns_not_found_for_unknown_id() {
        let store: Arc<dyn ReportStore> = Arc::new(InMemoryReportStore::new());
        let err = get_report(&config(), &store, Some("admin-secret"), "missing")
            .await
            .unwrap_err();
        assert_matches!(err, AdapterError::NotFound);
    }

    #[test]
    fn truncate_adds_ellipsis_only_past_the_bound() {
        let (short, truncated) = truncate("hello".repeat(10));
        assert!(!truncated);
        assert_eq!(short, "hello".repeat(10));

        let long_text = "x".repeat(TRUNCATION_BOUND + 100);
        let (clipped, truncated) = truncate(long_text);
        assert!(truncated);
        assert!(clipped.ends_with("..."));
        assert_eq!(clipped.len(), TRUNCATION_BOUND + 3);
    }
}
