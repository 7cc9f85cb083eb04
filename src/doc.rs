//! Generic document tree and the spec loader (C1).
//!
//! `SpecDoc` is a heterogeneous, string-keyed tree: exactly the shape both
//! JSON and YAML 1.2 core-schema documents decode into. The comparator
//! never assumes an input conforms to OpenAPI beyond the shape it walks —
//! unknown keys are ignored and missing keys behave as absent, never as
//! errors (see [`crate::schema`] and [`crate::operation`]).

use crate::error::EngineError;

/// A generic, string-keyed document tree.
///
/// This is deliberately just [`serde_json::Value`]: it already is the
/// tagged `{Map, Seq, Str, Num, Bool, Null}` variant that both JSON and
/// YAML decode into, and every sub-tree comparator in this crate reads it
/// by exhaustively matching on that shape rather than deserializing into
/// typed structs.
pub type SpecDoc = serde_json::Value;

/// Anything [`load_spec`] can accept: an already-parsed tree, or raw
/// JSON/YAML text or bytes.
#[derive(Debug, Clone)]
pub enum LoadInput {
    /// A tree that is returned verbatim if it is a map.
    Value(SpecDoc),
    /// Raw JSON or YAML text.
    Text(String),
    /// Raw JSON or YAML bytes, decoded as UTF-8 before parsing.
    Bytes(Vec<u8>),
}

impl From<SpecDoc> for LoadInput {
    fn from(value: SpecDoc) -> Self {
        LoadInput::Value(value)
    }
}

impl From<String> for LoadInput {
    fn from(text: String) -> Self {
        LoadInput::Text(text)
    }
}

impl From<&str> for LoadInput {
    fn from(text: &str) -> Self {
        LoadInput::Text(text.to_owned())
    }
}

impl From<Vec<u8>> for LoadInput {
    fn from(bytes: Vec<u8>) -> Self {
        LoadInput::Bytes(bytes)
    }
}

impl From<&[u8]> for LoadInput {
    fn from(bytes: &[u8]) -> Self {
        LoadInput::Bytes(bytes.to_vec())
    }
}

/// Parses `input` as JSON or YAML, yielding a generic tree.
///
/// Returns `Ok(None)` for empty or whitespace-only input, or when the
/// parsed value is not a map (the engine only ever deals in OpenAPI-shaped
/// documents, which are always maps at the top level). Callers should
/// treat `Ok(None)` on either side of a [`crate::diff`] call as an input
/// error.
pub fn load_spec(input: impl Into<LoadInput>) -> Result<Option<SpecDoc>, EngineError> {
    let text = match input.into() {
        LoadInput::Value(value) => {
            return Ok(value.is_object().then_some(value));
        }
        LoadInput::Text(text) => text,
        LoadInput::Bytes(bytes) => {
            String::from_utf8(bytes).map_err(|_| EngineError::InputInvalid)?
        }
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str::<SpecDoc>(trimmed) {
            Ok(value) => value,
            Err(_) => parse_yaml(trimmed)?,
        }
    } else {
        parse_yaml(trimmed)?
    };

    Ok(value.is_object().then_some(value))
}

fn parse_yaml(text: &str) -> Result<SpecDoc, EngineError> {
    serde_yml::from_str(text).map_err(|_| EngineError::InputInvalid)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn passes_through_map_values_verbatim() {
        let doc = json!({"paths": {}});
        assert_eq!(load_spec(doc.clone()).unwrap(), Some(doc));
    }

    #[test]
    fn non_map_values_become_none() {
        assert_eq!(load_spec(json!([1, 2])).unwrap(), None);
        assert_eq!(load_spec(json!("hello")).unwrap(), None);
    }

    #[test]
    fn empty_or_whitespace_text_is_none() {
        assert_eq!(load_spec("").unwrap(), None);
        assert_eq!(load_spec("   \n\t ").unwrap(), None);
    }

    #[test]
    fn parses_json_text() {
        let doc = load_spec(r#"{"openapi": "3.1.0", "paths": {}}"#).unwrap();
        assert_eq!(doc.unwrap()["openapi"], json!("3.1.0"));
    }

    #[test]
    fn parses_yaml_text() {
        let yaml = "openapi: 3.1.0\npaths: {}\n";
        let doc = load_spec(yaml).unwrap();
        assert_eq!(doc.unwrap()["openapi"], json!("3.1.0"));
    }

    #[test]
    fn parses_bytes() {
        let bytes = br#"{"paths": {}}"#.to_vec();
        assert!(load_spec(bytes).unwrap().is_some());
    }

    #[test]
    fn yaml_that_parses_to_a_scalar_is_none() {
        assert_eq!(load_spec("just a string").unwrap(), None);
    }
}
