//! The CI-facing reports HTTP adapter (C10).
//!
//! [`handlers`] holds the framework-agnostic request logic; this module
//! wires it to a concrete [`axum::Router`]. Token extraction supports both
//! `X-Report-Token: <token>` and `Authorization: Bearer <token>`.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::config::AppConfig;
use crate::store::ReportStore;

use error::AdapterError;
use handlers::{ListReportsQuery, PostReportsRequest};

/// Shared state threaded through every handler.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide configuration.
    pub config: Arc<AppConfig>,
    /// The persistence backend.
    pub store: Arc<dyn ReportStore>,
}

/// Builds the `/reports` router.
///
/// The caller is responsible for serving this with a real listener (see
/// the `truespec-server` binary) and for any surrounding middleware such
/// as request tracing; this function only wires routes and auth.
pub fn router(config: AppConfig, store: Arc<dyn ReportStore>) -> Router {
    let state = AppState {
        config: Arc::new(config),
        store,
    };

    Router::new()
        .route("/reports", post(handle_post_reports).get(handle_list_reports))
        .route("/reports/{id}", get(handle_get_report))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("x-report-token") {
        return value.to_str().ok().map(str::to_owned);
    }
    let auth = headers.get(axum::http::header::AUTHORIZATION)?;
    let auth = auth.to_str().ok()?;
    auth.strip_prefix("Bearer ").map(str::to_owned)
}

async fn handle_post_reports(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PostReportsRequest>,
) -> Response {
    let token = bearer_token(&headers);
    let result =
        handlers::post_reports(&state.config, &state.store, token.as_deref(), request).await;
    respond(result, StatusCode::OK, state.config.debug)
}

async fn handle_list_reports(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListReportsQuery>,
) -> Response {
    let token = bearer_token(&headers);
    let result = handlers::list_reports(&state.config, &state.store, token.as_deref(), query).await;
    respond(result, StatusCode::OK, state.config.debug)
}

async fn handle_get_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let token = bearer_token(&headers);
    let result = handlers::get_report(&state.config, &state.store, token.as_deref(), &id).await;
    respond(result, StatusCode::OK, state.config.debug)
}

/// Renders `result` into a response, logging and shaping the error body per
/// `debug` (`AppConfig::debug`, set from `REPORTS_DEBUG`): 5xx bodies carry
/// a generic message unless `debug` is true, matching the full cause chain
/// that always goes to the `error` log regardless.
fn respond<T: serde::Serialize>(
    result: Result<T, AdapterError>,
    ok_status: StatusCode,
    debug: bool,
) -> Response {
    match result {
        Ok(body) => (ok_status, Json(body)).into_response(),
        Err(err) => {
            if err.is_server_error() {
                log::error!("request failed: {err}");
            } else {
                log::debug!("request rejected: {err}");
            }
            let status = err.status_code();
            let message = err.response_message(debug);
            (status, Json(ErrorBody { error: message })).into_response()
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::store::InMemoryReportStore;

    fn test_config() -> AppConfig {
        AppConfig {
            table_name: "reports".into(),
            storage_connection_string: None,
            admin_token: Some("admin-secret".into()),
            ingest_token: Some("ingest-secret".into()),
            debug: false,
        }
    }

    fn test_router() -> Router {
        router(test_config(), Arc::new(InMemoryReportStore::new()))
    }

    #[tokio::test]
    async fn post_without_token_is_forbidden() {
        let request = Request::builder()
            .method("POST")
            .uri("/reports")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"base": {"paths": {}}, "head": {"paths": {}}}"#,
            ))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn post_with_valid_token_succeeds() {
        let request = Request::builder()
            .method("POST")
            .uri("/reports")
            .header("content-type", "application/json")
            .header("x-report-token", "ingest-secret")
            .body(Body::from(
                r#"{"base": {"paths": {}}, "head": {"paths": {}}, "repo": "acme/api"}"#,
            ))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(text.contains("\"reportId\""), "expected a reportId key, got {text}");
        assert!(!text.contains("report_id"));
    }

    #[tokio::test]
    async fn get_unknown_report_is_not_found() {
        let request = Request::builder()
            .method("GET")
            .uri("/reports/does-not-exist")
            .header("authorization", "Bearer admin-secret")
            .body(Body::empty())
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_method_on_reports_is_method_not_allowed() {
        let request = Request::builder()
            .method("DELETE")
            .uri("/reports")
            .body(Body::empty())
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn respond_replaces_5xx_body_with_generic_message_unless_debug() {
        let err: Result<(), AdapterError> = Err(AdapterError::Unexpected("db down".into()));
        let response = respond(err, StatusCode::OK, false);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let text = body_text(response).await;
        assert!(text.contains("internal error"));
        assert!(!text.contains("db down"));
    }

    #[tokio::test]
    async fn respond_includes_real_5xx_message_when_debug() {
        let err: Result<(), AdapterError> = Err(AdapterError::Unexpected("db down".into()));
        let response = respond(err, StatusCode::OK, true);
        let text = body_text(response).await;
        assert!(text.contains("db down"));
    }

    #[tokio::test]
    async fn respond_never_hides_4xx_message() {
        let err: Result<(), AdapterError> = Err(AdapterError::NotFound);
        let response = respond(err, StatusCode::OK, false);
        let text = body_text(response).await;
        assert!(text.contains("no such report"));
    }
}
