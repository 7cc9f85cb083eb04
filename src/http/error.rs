//! The adapter-level error taxonomy (C11) and its HTTP status mapping.

use derive_more::{Display, Error, From};

use crate::store::StoreError;
use crate::EngineError;

/// Everything the HTTP adapter can fail with, beyond a successful response.
///
/// `StoreError::Conflict` never reaches this type: callers treat a
/// conflicting write as success and only propagate `StoreError::Unavailable`
/// (as [`AdapterError::StoreUnavailable`]).
#[derive(Debug, Display, Error, From)]
pub enum AdapterError {
    /// The request body did not contain a usable OpenAPI document.
    #[display(fmt = "{_0}")]
    Engine(EngineError),
    /// A required or bearer token was missing or did not match.
    #[display(fmt = "missing or invalid authorization token")]
    Unauthorized,
    /// The requested report id does not exist.
    #[display(fmt = "no such report")]
    NotFound,
    /// The configured `ReportStore` could not be reached.
    #[display(fmt = "report store unavailable")]
    StoreUnavailable,
    /// Anything else: malformed JSON body, wrong content type, and so on.
    #[display(fmt = "{_0}")]
    #[from(ignore)]
    Unexpected(#[error(not(source))] String),
}

impl AdapterError {
    /// The HTTP status this error maps to (spec.md §7).
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            AdapterError::Engine(_) => http::StatusCode::BAD_REQUEST,
            AdapterError::Unauthorized => http::StatusCode::FORBIDDEN,
            AdapterError::NotFound => http::StatusCode::NOT_FOUND,
            AdapterError::StoreUnavailable | AdapterError::Unexpected(_) => {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether this error maps to a 5xx status, i.e. is logged as an error
    /// with its full cause chain rather than at debug level (§4.12).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// The message to put in the response body: the real `Display` message,
    /// except for 5xx errors when `debug` is false, which get a generic
    /// message instead so internal detail never leaks to a caller (§4.10,
    /// `REPORTS_DEBUG`).
    pub fn response_message(&self, debug: bool) -> String {
        if self.is_server_error() && !debug {
            "internal error".to_owned()
        } else {
            self.to_string()
        }
    }
}

impl From<StoreError> for AdapterError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => AdapterError::StoreUnavailable,
            // `put` callers swallow `Conflict` before it gets here; a
            // conflict surfacing anywhere else is still not the caller's
            // fault, so it maps to the same unavailable-store status.
            StoreError::Conflict(_) => AdapterError::StoreUnavailable,
        }
    }
}
