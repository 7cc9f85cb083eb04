//! The schema comparator (C4): a recursive structural diff between two
//! schema trees. Dominates the engine's implementation by design — every
//! request and response body ultimately funnels through
//! [`compare_schema`].

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::doc::SpecDoc;
use crate::finding::{Finding, FindingCode, Severity};
use crate::operation::OperationKey;
use crate::path::SchemaPath;

/// Where, within an operation, a schema lives. Carried as an explicit
/// parameter through the recursion rather than derived from the string
/// prefix of the schema path (see spec Design Notes) — request and
/// response bodies have opposite polarity for additions and removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaContext {
    /// A request body or a schema reached only through one.
    Request,
    /// A response body or a schema reached only through one.
    Response,
    /// Neither — e.g. a parameter schema, which this engine does not
    /// currently recurse into.
    Other,
}

/// Per-root-call cycle guard: identity sets of schema nodes already
/// entered, one per side. Re-entering a node aborts just that subtree,
/// emitting no finding for it, rather than aborting the whole comparison.
#[derive(Debug, Default)]
pub struct VisitGuard {
    base: HashSet<usize>,
    head: HashSet<usize>,
}

impl VisitGuard {
    /// A fresh, empty guard — one must be created per root `compare_schema`
    /// invocation from the operation comparator (C5).
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to enter `(base, head)`. Returns `false` (abort the
    /// subtree) if either side has already been entered on this root call.
    fn enter(&mut self, base: &SpecDoc, head: &SpecDoc) -> bool {
        let base_id = base as *const SpecDoc as usize;
        let head_id = head as *const SpecDoc as usize;

        if self.base.contains(&base_id) || self.head.contains(&head_id) {
            return false;
        }

        self.base.insert(base_id);
        self.head.insert(head_id);
        true
    }
}

fn raw_types(schema: &SpecDoc) -> Vec<String> {
    match schema.get("type") {
        Some(serde_json::Value::String(s)) => vec![s.clone()],
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}

fn is_nullable(schema: &SpecDoc, types: &[String]) -> bool {
    schema.get("nullable").and_then(|v| v.as_bool()) == Some(true)
        || types.iter().any(|t| t == "null")
}

/// The non-null types, sorted lexicographically and joined with `|`
/// (empty string if none).
fn type_signature(types: &[String]) -> String {
    let mut non_null: Vec<&str> = types
        .iter()
        .filter(|t| t.as_str() != "null")
        .map(String::as_str)
        .collect();
    non_null.sort_unstable();
    non_null.join("|")
}

/// A schema's signature for union-alternative comparison (§4.4).
fn schema_signature(schema: &SpecDoc) -> String {
    if let Some(reference) = schema.get("$ref").and_then(|v| v.as_str()) {
        return format!("ref:{reference}");
    }

    let types = raw_types(schema);
    let sig = type_signature(&types);
    let sig = if sig.is_empty() { "unknown".to_owned() } else { sig };

    let mut out = format!("type:{sig}");

    if is_nullable(schema, &types) {
        out.push_str("|nullable");
    }
    if let Some(format) = schema.get("format").and_then(|v| v.as_str()) {
        out.push_str(&format!("|format:{format}"));
    }
    if let Some(title) = schema.get("title").and_then(|v| v.as_str()) {
        out.push_str(&format!("|title:{title}"));
    }

    out
}

/// Gathers `oneOf ∪ anyOf`, map-typed entries only.
fn union_alternatives(schema: &SpecDoc) -> Vec<&SpecDoc> {
    ["oneOf", "anyOf"]
        .into_iter()
        .filter_map(|key| schema.get(key).and_then(|v| v.as_array()))
        .flatten()
        .filter(|v| v.is_object())
        .collect()
}

/// Canonical string set of an `enum` array's values, each JSON-serialized
/// for stable equality and stable, quoted display in messages.
fn enum_value_set(schema: &SpecDoc) -> Option<BTreeSet<String>> {
    let values = schema.get("enum")?.as_array()?;
    Some(
        values
            .iter()
            .map(|v| serde_json::to_string(v).unwrap_or_default())
            .collect(),
    )
}

/// Recursively merges `allOf` member property maps (without diffing them),
/// then overlays this schema's own `properties`.
fn collect_properties(schema: &SpecDoc) -> BTreeMap<String, &SpecDoc> {
    let mut props = BTreeMap::new();

    if let Some(all_of) = schema.get("allOf").and_then(|v| v.as_array()) {
        for member in all_of {
            if member.is_object() {
                props.extend(collect_properties(member));
            }
        }
    }

    if let Some(own) = schema.get("properties").and_then(|v| v.as_object()) {
        for (key, value) in own {
            props.insert(key.clone(), value);
        }
    }

    props
}

fn required_set(schema: &SpecDoc) -> BTreeSet<String> {
    schema
        .get("required")
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str().map(str::to_owned))
        .collect()
}

fn has_array_shape(schema: &SpecDoc) -> bool {
    raw_types(schema).iter().any(|t| t == "array") || schema.get("items").is_some_and(|v| v.is_object())
}

/// Recursively compares two schema trees, appending [`Finding`]s to `sink`
/// in the order described by §4.4. Must be given a fresh [`VisitGuard`] per
/// root invocation from the operation comparator.
#[allow(clippy::too_many_arguments)]
pub fn compare_schema(
    base: &SpecDoc,
    head: &SpecDoc,
    schema_path: &SchemaPath,
    context: SchemaContext,
    op: &OperationKey,
    guard: &mut VisitGuard,
    sink: &mut Vec<Finding>,
) {
    if !guard.enter(base, head) {
        return;
    }

    let base_types = raw_types(base);
    let head_types = raw_types(head);
    let base_nullable = is_nullable(base, &base_types);
    let head_nullable = is_nullable(head, &head_types);

    // 1. Nullability
    if base_nullable && !head_nullable {
        sink.push(
            Finding::new(
                Severity::Breaking,
                FindingCode::SchemaNullableRemoved,
                format!("Nullable removed at {schema_path}"),
            )
            .with_operation(&op.method, &op.path),
        );
    } else if !base_nullable && head_nullable {
        sink.push(
            Finding::new(
                Severity::Info,
                FindingCode::SchemaNullableAdded,
                format!("Nullable added at {schema_path}"),
            )
            .with_operation(&op.method, &op.path),
        );
    }

    // 2. Type signature
    let base_sig = type_signature(&base_types);
    let head_sig = type_signature(&head_types);
    if !base_sig.is_empty() && !head_sig.is_empty() && base_sig != head_sig {
        sink.push(
            Finding::new(
                Severity::Breaking,
                FindingCode::SchemaTypeChanged,
                format!("Type changed at {schema_path} ({base_sig} -> {head_sig})"),
            )
            .with_operation(&op.method, &op.path),
        );
        return;
    }

    // 3. Union alternatives
    let base_union: BTreeSet<String> = union_alternatives(base).iter().map(|s| schema_signature(s)).collect();
    let head_union: BTreeSet<String> = union_alternatives(head).iter().map(|s| schema_signature(s)).collect();
    for removed in base_union.difference(&head_union) {
        sink.push(
            Finding::new(
                Severity::Breaking,
                FindingCode::SchemaUnionRemoved,
                format!("Union alternative removed at {schema_path} ({removed})"),
            )
            .with_operation(&op.method, &op.path),
        );
    }
    for added in head_union.difference(&base_union) {
        sink.push(
            Finding::new(
                Severity::Info,
                FindingCode::SchemaUnionAdded,
                format!("Union alternative added at {schema_path} ({added})"),
            )
            .with_operation(&op.method, &op.path),
        );
    }

    // 4. Enums
    let base_enum_declared = enum_value_set(base);
    let head_enum_declared = enum_value_set(head);
    if base_enum_declared.is_some() || head_enum_declared.is_some() {
        let base_enum = base_enum_declared.unwrap_or_default();
        let head_enum = head_enum_declared.unwrap_or_default();
        let removed: Vec<&String> = base_enum.difference(&head_enum).collect();
        let added: Vec<&String> = head_enum.difference(&base_enum).collect();
        if !removed.is_empty() || !added.is_empty() {
            let mut detail = Vec::new();
            if !removed.is_empty() {
                detail.push(format!(
                    "removed: {}",
                    removed.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(",")
                ));
            }
            if !added.is_empty() {
                detail.push(format!(
                    "added: {}",
                    added.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(",")
                ));
            }
            sink.push(
                Finding::new(
                    Severity::Breaking,
                    FindingCode::SchemaEnumChanged,
                    format!("Enum changed at {schema_path} ({})", detail.join("; ")),
                )
                .with_operation(&op.method, &op.path),
            );
        }
    }

    // 5. Arrays
    if (has_array_shape(base) || has_array_shape(head)) && base.get("items").is_some() && head.get("items").is_some()
    {
        if let (Some(base_items), Some(head_items)) = (base.get("items"), head.get("items")) {
            if base_items.is_object() && head_items.is_object() {
                compare_schema(base_items, head_items, &schema_path.array(), context, op, guard, sink);
            }
        }
    }

    // 6. Object shape
    let base_props = collect_properties(base);
    let head_props = collect_properties(head);

    if !base_props.is_empty() || !head_props.is_empty() {
        let base_required = required_set(base);
        let head_required = required_set(head);

        // Required-added
        for name in head_required.difference(&base_required) {
            let severity = match context {
                SchemaContext::Request => Severity::Warning,
                _ => Severity::Info,
            };
            sink.push(
                Finding::new(
                    severity,
                    FindingCode::SchemaRequiredAdded,
                    format!("Field {name} became required at {schema_path}"),
                )
                .with_operation(&op.method, &op.path),
            );
        }

        // Field removed
        for (name, _) in base_props.iter().filter(|(name, _)| !head_props.contains_key(*name)) {
            sink.push(
                Finding::new(
                    Severity::Breaking,
                    FindingCode::SchemaFieldRemoved,
                    format!("Removed field {}", schema_path.field(name)),
                )
                .with_operation(&op.method, &op.path),
            );
        }

        // Recurse into shared keys
        for (name, base_child) in &base_props {
            if let Some(head_child) = head_props.get(name) {
                compare_schema(base_child, head_child, &schema_path.field(name), context, op, guard, sink);
            }
        }

        // Field added
        if context == SchemaContext::Response {
            for (name, _) in head_props.iter().filter(|(name, _)| !base_props.contains_key(*name)) {
                sink.push(
                    Finding::new(
                        Severity::Info,
                        FindingCode::SchemaFieldAdded,
                        format!("Added field {}", schema_path.field(name)),
                    )
                    .with_operation(&op.method, &op.path),
                );
            }
        }
    }
}
