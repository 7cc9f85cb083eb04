//! Process-environment-sourced configuration for the HTTP adapter (C8).

use std::env;

/// Default page size for `GET /reports` when `limit` is not supplied.
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// Maximum page size `GET /reports` will honor, regardless of `limit`.
pub const MAX_PAGE_SIZE: u32 = 200;
/// `markdown` and the serialized `items` JSON string are each truncated to
/// this many characters before being persisted.
pub const TRUNCATION_BOUND: usize = 60_000;

/// Typed view over the environment variables documented in spec.md §6.
///
/// Constructed once at process start via [`AppConfig::from_env`] and
/// passed by reference into the adapter; it is not global mutable state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `REPORTS_TABLE_NAME`, default `"reports"`.
    pub table_name: String,
    /// `REPORTS_STORAGE_CONNECTION_STRING`, falling back to
    /// `AzureWebJobsStorage` when unset. `None` if neither is set.
    pub storage_connection_string: Option<String>,
    /// `REPORTS_ADMIN_TOKEN`. Absent or empty means admin GET endpoints
    /// always respond 403.
    pub admin_token: Option<String>,
    /// `REPORTS_INGEST_TOKEN`. When set, required on `POST /reports`.
    pub ingest_token: Option<String>,
    /// `REPORTS_DEBUG`: truthy means 500 responses include the error message.
    pub debug: bool,
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl AppConfig {
    /// Reads configuration from the process environment, applying the
    /// defaults and fallbacks documented in spec.md §6.
    pub fn from_env() -> Self {
        Self {
            table_name: env_var("REPORTS_TABLE_NAME").unwrap_or_else(|| "reports".to_owned()),
            storage_connection_string: env_var("REPORTS_STORAGE_CONNECTION_STRING")
                .or_else(|| env_var("AzureWebJobsStorage")),
            admin_token: env_var("REPORTS_ADMIN_TOKEN"),
            ingest_token: env_var("REPORTS_INGEST_TOKEN"),
            debug: env::var("REPORTS_DEBUG").map(|v| truthy(&v)).unwrap_or(false),
        }
    }

    /// Whether `token` matches the configured ingest token. When no ingest
    /// token is configured, every request is authorized.
    pub fn ingest_authorized(&self, token: Option<&str>) -> bool {
        match &self.ingest_token {
            None => true,
            Some(expected) => token == Some(expected.as_str()),
        }
    }

    /// Whether `token` matches the configured admin token. An absent or
    /// empty admin token means GET endpoints are never authorized.
    pub fn admin_authorized(&self, token: Option<&str>) -> bool {
        match &self.admin_token {
            None => false,
            Some(expected) => token == Some(expected.as_str()),
        }
    }

    /// Clamps a client-supplied `limit` into `[1, MAX_PAGE_SIZE]`,
    /// defaulting to [`DEFAULT_PAGE_SIZE`] when absent.
    pub fn clamp_page_size(&self, limit: Option<u32>) -> u32 {
        limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    // Environment variables are process-global, so these tests mutate and
    // restore them rather than running in parallel with each other.
    #[test]
    #[serial]
    fn falls_back_to_defaults() {
        for key in [
            "REPORTS_TABLE_NAME",
            "REPORTS_STORAGE_CONNECTION_STRING",
            "AzureWebJobsStorage",
            "REPORTS_ADMIN_TOKEN",
            "REPORTS_INGEST_TOKEN",
            "REPORTS_DEBUG",
        ] {
            env::remove_var(key);
        }

        let config = AppConfig::from_env();
        assert_eq!(config.table_name, "reports");
        assert_eq!(config.storage_connection_string, None);
        assert!(!config.debug);
        assert!(config.ingest_authorized(Some("anything")));
        assert!(!config.admin_authorized(Some("anything")));
    }

    #[test]
    fn connection_string_falls_back_to_azure_web_jobs_storage() {
        let config = AppConfig {
            table_name: "reports".into(),
            storage_connection_string: Some("conn".into()),
            admin_token: None,
            ingest_token: None,
            debug: false,
        };
        assert_eq!(config.storage_connection_string.as_deref(), Some("conn"));
    }

    #[test]
    fn clamps_page_size() {
        let config = AppConfig {
            table_name: "reports".into(),
            storage_connection_string: None,
            admin_token: None,
            ingest_token: None,
            debug: false,
        };
        assert_eq!(config.clamp_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(config.clamp_page_size(Some(1)), 1);
        assert_eq!(config.clamp_page_size(Some(10_000)), MAX_PAGE_SIZE);
        assert_eq!(config.clamp_page_size(Some(0)), 1);
    }

    #[test]
    fn token_checks() {
        let config = AppConfig {
            table_name: "reports".into(),
            storage_connection_string: None,
            admin_token: Some("admin-secret".into()),
            ingest_token: Some("ingest-secret".into()),
            debug: false,
        };
        assert!(config.ingest_authorized(Some("ingest-secret")));
        assert!(!config.ingest_authorized(Some("wrong")));
        assert!(!config.ingest_authorized(None));
        assert!(config.admin_authorized(Some("admin-secret")));
        assert!(!config.admin_authorized(None));
    }
}
