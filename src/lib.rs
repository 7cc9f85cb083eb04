//! A structural differencing engine for OpenAPI documents.
//!
//! Given a *base* and a *head* revision of an OpenAPI document, [`diff`]
//! computes a [`Report`] describing how the head deviates from the base:
//! operations added or removed, responses and parameters that changed,
//! and a recursive structural comparison of every request/response schema
//! reachable from an operation. Findings are classified by [`Severity`]
//! and carry a stable, closed-set [`FindingCode`].
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let base = truespec_diff::load_spec(std::fs::read_to_string("base.yaml")?)?
//!     .ok_or("base.yaml is not a usable OpenAPI document")?;
//! let head = truespec_diff::load_spec(std::fs::read_to_string("head.yaml")?)?
//!     .ok_or("head.yaml is not a usable OpenAPI document")?;
//! let report = truespec_diff::diff(&base, &head)?;
//! println!("{}", truespec_diff::render_markdown(&report));
//! # Ok(())
//! # }
//! ```
//!
//! The engine itself is synchronous and allocation-light; see [`doc`] for
//! the generic value tree it walks, [`schema`] for the recursive
//! comparator that dominates its implementation, and [`engine`] for the
//! top-level façade. The optional `http-adapter` feature (on by default)
//! adds [`store`] and [`http`], a small CI-facing reports service built on
//! top of the engine.

mod compare;
pub mod doc;
mod engine;
mod error;
mod finding;
mod operation;
mod parameter;
mod path;
mod render;
pub mod schema;

#[cfg(feature = "http-adapter")]
pub mod config;
#[cfg(feature = "http-adapter")]
pub mod http;
#[cfg(feature = "http-adapter")]
pub mod store;

pub use doc::{load_spec, SpecDoc};
pub use engine::diff;
pub use error::EngineError;
pub use finding::{Finding, FindingCode, Report, Severity, Summary};
pub use operation::{OperationKey, OperationView};
pub use render::render_markdown;
pub use schema::SchemaContext;

/// Convenience alias for engine-level results.
pub type Result<T> = std::result::Result<T, EngineError>;
