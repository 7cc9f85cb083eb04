//! Parameter and request-body analysis (C3).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::doc::SpecDoc;
use crate::operation::OperationView;

/// `"<in>:<name>"`, identifying one declared parameter.
///
/// Path parameters are always required regardless of the declared
/// `required` flag (§3).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParameterId(pub String);

impl ParameterId {
    fn new(location: &str, name: &str) -> Self {
        Self(format!("{location}:{name}"))
    }
}

impl std::fmt::Display for ParameterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Concatenates `pathItem.parameters` then `operation.parameters` (both
/// treated as empty if absent or not a sequence) and returns the set of
/// `ParameterId`s that are required — `required === true` OR
/// `in === "path"`. Duplicates coalesce into the returned set.
pub fn required_parameters(view: &OperationView<'_>) -> BTreeSet<ParameterId> {
    let mut required = BTreeSet::new();

    for param in parameter_sequence(view.path_item_node).chain(parameter_sequence(view.operation_node)) {
        let Some(name) = param.get("name").and_then(|v| v.as_str()) else {
            continue;
        };
        let Some(location) = param.get("in").and_then(|v| v.as_str()) else {
            continue;
        };

        let is_required = location == "path" || param.get("required").and_then(|v| v.as_bool()) == Some(true);

        if is_required {
            required.insert(ParameterId::new(location, name));
        }
    }

    required
}

fn parameter_sequence(node: &SpecDoc) -> impl Iterator<Item = &SpecDoc> {
    node.get("parameters")
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
}

/// `requestBody.required === true`; missing `requestBody` is `false`.
pub fn request_body_required(operation_node: &SpecDoc) -> bool {
    operation_node
        .get("requestBody")
        .and_then(|rb| rb.get("required"))
        .and_then(|v| v.as_bool())
        == Some(true)
}

/// The media type key chosen for a `content` map, preferring
/// `application/json`, then the first key containing `json` or ending
/// `+json`, then the first entry at all.
fn pick_media_type(content: &serde_json::Map<String, SpecDoc>) -> Option<&str> {
    if content.contains_key("application/json") {
        return Some("application/json");
    }

    if let Some(key) = content
        .keys()
        .find(|key| key.contains("json") || key.ends_with("+json"))
    {
        return Some(key);
    }

    content.keys().next().map(String::as_str)
}

fn schema_from_content(node: &SpecDoc) -> Option<&SpecDoc> {
    let content = node.get("content")?.as_object()?;
    let key = pick_media_type(content)?;
    content.get(key)?.get("schema")
}

/// Extracts the first applicable request-body schema, per [`pick_media_type`].
pub fn request_schema<'a>(operation_node: &'a SpecDoc) -> Option<&'a SpecDoc> {
    schema_from_content(operation_node.get("requestBody")?)
}

/// Extracts the first applicable response schema for each declared status.
///
/// `status` is kept as the literal key string (e.g. `"200"`, `"default"`,
/// `"2XX"`); no status-code matching is performed.
pub fn response_schemas(operation_node: &SpecDoc) -> BTreeMap<String, &SpecDoc> {
    let mut out = BTreeMap::new();

    let Some(responses) = operation_node.get("responses").and_then(|v| v.as_object()) else {
        return out;
    };

    for (status, response_node) in responses {
        if let Some(schema) = schema_from_content(response_node) {
            out.insert(status.clone(), schema);
        }
    }

    out
}

/// The set of status keys a response map declares, ignoring whether a
/// usable schema was found for them (used for response added/removed
/// comparison in C5, which compares declared statuses, not just the ones
/// with a JSON-ish body).
pub fn response_statuses(operation_node: &SpecDoc) -> BTreeSet<String> {
    operation_node
        .get("responses")
        .and_then(|v| v.as_object())
        .into_iter()
        .flat_map(|responses| responses.keys().cloned())
        .collect()
}
