//! Findings, severities, and the aggregate [`Report`] (§3, §4.5).

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// How much downstream impact a [`Finding`] indicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A client-visible, backward-incompatible change.
    #[display(fmt = "breaking")]
    Breaking,
    /// A likely-incompatible tightening.
    #[display(fmt = "warning")]
    Warning,
    /// A non-breaking addition.
    #[display(fmt = "info")]
    Info,
}

impl Severity {
    /// The fixed rendering order used throughout the engine: breaking,
    /// then warning, then info.
    pub const ORDER: [Severity; 3] = [Severity::Breaking, Severity::Warning, Severity::Info];

    /// Title-cased label, as used in Markdown section headers.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Breaking => "Breaking",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }
}

/// The closed set of stable finding codes (§4.5, authoritative).
///
/// Every finding emitted anywhere in the engine carries one of these. The
/// set is closed: implementations must not invent new codes, and callers
/// may match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCode {
    #[display(fmt = "operation-removed")]
    OperationRemoved,
    #[display(fmt = "operation-added")]
    OperationAdded,
    #[display(fmt = "response-removed")]
    ResponseRemoved,
    #[display(fmt = "response-added")]
    ResponseAdded,
    #[display(fmt = "required-param-added")]
    RequiredParamAdded,
    #[display(fmt = "request-body-required")]
    RequestBodyRequired,
    #[display(fmt = "schema-type-changed")]
    SchemaTypeChanged,
    #[display(fmt = "schema-nullable-removed")]
    SchemaNullableRemoved,
    #[display(fmt = "schema-nullable-added")]
    SchemaNullableAdded,
    #[display(fmt = "schema-union-removed")]
    SchemaUnionRemoved,
    #[display(fmt = "schema-union-added")]
    SchemaUnionAdded,
    #[display(fmt = "schema-enum-changed")]
    SchemaEnumChanged,
    #[display(fmt = "schema-field-removed")]
    SchemaFieldRemoved,
    #[display(fmt = "schema-field-added")]
    SchemaFieldAdded,
    #[display(fmt = "schema-required-added")]
    SchemaRequiredAdded,
}

impl FindingCode {
    /// The severity this code always carries, except
    /// [`FindingCode::SchemaRequiredAdded`] whose severity depends on
    /// [`crate::SchemaContext`] (warning for request, info otherwise) —
    /// callers of that code pick the severity directly instead of using
    /// this method.
    pub fn fixed_severity(self) -> Option<Severity> {
        use FindingCode::*;
        match self {
            OperationRemoved | ResponseRemoved | SchemaTypeChanged | SchemaNullableRemoved
            | SchemaUnionRemoved | SchemaEnumChanged | SchemaFieldRemoved => {
                Some(Severity::Breaking)
            }
            RequiredParamAdded | RequestBodyRequired => Some(Severity::Warning),
            OperationAdded | ResponseAdded | SchemaNullableAdded | SchemaUnionAdded
            | SchemaFieldAdded => Some(Severity::Info),
            SchemaRequiredAdded => None,
        }
    }
}

/// The operation a [`Finding`] is attached to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRef {
    /// The request path template, e.g. `/pets/{id}`.
    pub path: String,
    /// The HTTP method, uppercased.
    pub method: String,
}

/// A single observation about the delta between base and head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// How severe this finding is.
    pub severity: Severity,
    /// The stable code identifying this kind of finding.
    pub code: FindingCode,
    /// Human-readable text of the form `"<verb> <path-fragment>[ (<detail>)]"`.
    pub message: String,
    /// The operation this finding was produced for, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationRef>,
}

impl Finding {
    /// Builds a finding not attached to any particular operation.
    pub fn new(severity: Severity, code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            operation: None,
        }
    }

    /// Attaches an operation reference to this finding.
    pub fn with_operation(mut self, method: &str, path: &str) -> Self {
        self.operation = Some(OperationRef {
            path: path.to_owned(),
            method: method.to_owned(),
        });
        self
    }
}

/// Counts of findings by severity, always consistent with `items.len()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of breaking findings.
    pub breaking: usize,
    /// Number of warning findings.
    pub warning: usize,
    /// Number of info findings.
    pub info: usize,
    /// Total number of findings (`breaking + warning + info`).
    pub total: usize,
}

/// The result of a [`crate::diff`] invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Counts of `items` by severity, recomputed rather than tracked
    /// incrementally so the invariant `summary.total == items.len()` is
    /// always trivially true.
    pub summary: Summary,
    /// The findings themselves, in the order they were produced.
    pub items: Vec<Finding>,
}

impl Report {
    /// Builds a report from an append-order finding list, computing `summary`.
    pub fn from_items(items: Vec<Finding>) -> Self {
        let mut summary = Summary::default();
        for item in &items {
            match item.severity {
                Severity::Breaking => summary.breaking += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary.total = items.len();
        Self { summary, items }
    }
}
