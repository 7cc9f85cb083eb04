//! The engine façade (C7): the single public entry point downstream code
//! and the HTTP adapter call.

use crate::compare::compare_operations;
use crate::doc::SpecDoc;
use crate::error::EngineError;
use crate::finding::Report;

/// Compares `base` against `head` and returns the structured [`Report`].
///
/// Both documents must already be maps (the shape [`crate::load_spec`]
/// guarantees on success); if either is not, this returns
/// [`EngineError::InputInvalid`] rather than silently producing an empty
/// report. Given byte-equal inputs, repeated calls produce byte-equal
/// reports — every iteration step here derives from the input's own
/// ordered maps and the closed, ordered finding-code set (§4.7).
pub fn diff(base: &SpecDoc, head: &SpecDoc) -> Result<Report, EngineError> {
    if !base.is_object() || !head.is_object() {
        return Err(EngineError::InputInvalid);
    }

    let items = compare_operations(base, head);
    Ok(Report::from_items(items))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::doc::load_spec;

    #[test]
    fn rejects_non_map_inputs() {
        assert_eq!(diff(&json!([1]), &json!({})), Err(EngineError::InputInvalid));
        assert_eq!(diff(&json!({}), &json!("x")), Err(EngineError::InputInvalid));
    }

    #[test]
    fn reflexivity_property_holds_end_to_end() {
        let yaml = "
paths:
  /pets:
    get:
      parameters:
        - name: limit
          in: query
          required: true
      responses:
        '200':
          content:
            application/json:
              schema:
                type: object
                properties:
                  id: { type: string }
";
        let spec = load_spec(yaml).unwrap().unwrap();
        let report = diff(&spec, &spec).unwrap();
        assert!(report.items.is_empty());
        assert_eq!(report.summary.total, 0);
    }

    #[test]
    fn count_invariant_holds() {
        let base = json!({"paths": {"/a": {"get": {}}, "/b": {"get": {}}}});
        let head = json!({"paths": {"/b": {"get": {}}, "/c": {"get": {}}}});
        let report = diff(&base, &head).unwrap();
        assert_eq!(
            report.summary.breaking + report.summary.warning + report.summary.info,
            report.summary.total
        );
        assert_eq!(report.summary.total, report.items.len());
    }
}
