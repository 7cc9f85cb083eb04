//! The `/reports` HTTP adapter as a standalone server.
//!
//! Wires [`truespec_diff::config::AppConfig`] and an in-memory
//! [`truespec_diff::store::InMemoryReportStore`] into the adapter router and
//! serves it. A production deployment wiring a real `ReportStore` behind a
//! cloud table service would replace just the store construction below.

use std::net::SocketAddr;
use std::sync::Arc;

use truespec_diff::config::AppConfig;
use truespec_diff::store::{InMemoryReportStore, ReportStore};

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let config = AppConfig::from_env();
    let store: Arc<dyn ReportStore> = Arc::new(InMemoryReportStore::new());
    let router = truespec_diff::http::router(config, store);

    let addr: SocketAddr = std::env::var("REPORTS_LISTEN_ADDR")
        .ok()
        .and_then(|addr| addr.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));

    log::info!("truespec-server listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, router).await.expect("server error");
}
