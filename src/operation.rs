//! Operation indexing (C2): walks `paths` into a keyed map of operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::doc::SpecDoc;

/// The fixed, ordered list of HTTP methods the indexer looks for under
/// each path item. Iteration order here is part of the engine's
/// determinism guarantee (§4.2).
pub const HTTP_METHODS: [&str; 8] = [
    "get", "post", "put", "patch", "delete", "options", "head", "trace",
];

/// A `(METHOD, PATH)` pair identifying one operation.
///
/// Two keys are equal iff both components are equal byte-for-byte; `METHOD`
/// is always uppercased by [`index_operations`], `PATH` is kept exactly as
/// it appears under `paths`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationKey {
    /// Uppercased HTTP method, e.g. `"GET"`.
    pub method: String,
    /// The literal path template, e.g. `"/pets/{id}"`.
    pub path: String,
}

impl OperationKey {
    /// Builds a key, uppercasing `method`.
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_owned(),
        }
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// A single indexed operation: the method/path node and its path-item
/// sibling, referenced rather than copied.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationView<'a> {
    /// The key this view was indexed under.
    pub key: OperationKey,
    /// The sub-tree at `paths.<path>.<method>`.
    pub operation_node: &'a SpecDoc,
    /// The sibling of `operation_node`: `paths.<path>`.
    pub path_item_node: &'a SpecDoc,
}

/// Walks `spec.paths`, emitting a keyed, insertion-ordered list of
/// `(OperationKey, OperationView)` pairs.
///
/// Non-map `paths` entries, and non-map values at a known method key, are
/// skipped silently rather than erroring (§4.2, §7). Iteration order
/// follows the input's `paths` insertion order for the outer loop and
/// [`HTTP_METHODS`] for the inner loop, matching the engine's determinism
/// guarantee.
pub fn index_operations(spec: &SpecDoc) -> Vec<(OperationKey, OperationView<'_>)> {
    let mut out = Vec::new();

    let Some(paths) = spec.get("paths").and_then(|p| p.as_object()) else {
        return out;
    };

    for (path, path_item) in paths {
        let Some(path_item_map) = path_item.as_object() else {
            continue;
        };

        for method in HTTP_METHODS {
            let Some(operation_node) = path_item_map.get(method).filter(|v| v.is_object()) else {
                continue;
            };

            let key = OperationKey::new(method, path);
            out.push((
                key.clone(),
                OperationView {
                    key,
                    operation_node,
                    path_item_node: path_item,
                },
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn indexes_operations_in_path_order_then_method_order() {
        let spec = json!({
            "paths": {
                "/pets": {
                    "post": {},
                    "get": {}
                },
                "/pets/{id}": {
                    "get": {},
                    "delete": {}
                }
            }
        });

        let found: Vec<_> = index_operations(&spec)
            .into_iter()
            .map(|(k, _)| k.to_string())
            .collect();

        assert_eq!(
            found,
            vec!["GET /pets", "POST /pets", "GET /pets/{id}", "DELETE /pets/{id}"]
        );
    }

    #[test]
    fn skips_non_map_path_items_and_non_map_methods() {
        let spec = json!({
            "paths": {
                "/broken": "not-an-object",
                "/ok": { "get": "also-not-an-object", "post": {} }
            }
        });

        let found: Vec<_> = index_operations(&spec)
            .into_iter()
            .map(|(k, _)| k.to_string())
            .collect();

        assert_eq!(found, vec!["POST /ok"]);
    }

    #[test]
    fn missing_paths_yields_empty_index() {
        assert!(index_operations(&json!({})).is_empty());
    }
}
