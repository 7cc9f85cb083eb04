//! The operation comparator (C5): drives the parameter/body analyzer and
//! the schema comparator across every shared operation pair, and owns the
//! operation- and response-level finding codes from §4.5's closed set.

use std::collections::BTreeMap;

use crate::doc::SpecDoc;
use crate::finding::{Finding, FindingCode, Severity};
use crate::operation::{index_operations, OperationKey, OperationView};
use crate::parameter::{request_body_required, request_schema, required_parameters, response_schemas, response_statuses};
use crate::path::SchemaPath;
use crate::schema::{compare_schema, SchemaContext, VisitGuard};

/// Runs the full operation comparison: added/removed operations, then for
/// each shared operation, added/removed responses, added required
/// parameters, newly-required request bodies, and recursive schema
/// comparison of the request body and every shared response body.
pub fn compare_operations(base: &SpecDoc, head: &SpecDoc) -> Vec<Finding> {
    let mut sink = Vec::new();

    let base_ops = index_operations(base);
    let head_ops = index_operations(head);

    let base_index: BTreeMap<&OperationKey, &OperationView<'_>> =
        base_ops.iter().map(|(k, v)| (k, v)).collect();
    let head_index: BTreeMap<&OperationKey, &OperationView<'_>> =
        head_ops.iter().map(|(k, v)| (k, v)).collect();

    for (key, _) in &base_ops {
        if !head_index.contains_key(key) {
            sink.push(
                Finding::new(
                    Severity::Breaking,
                    FindingCode::OperationRemoved,
                    format!("Removed operation {key}"),
                )
                .with_operation(&key.method, &key.path),
            );
        }
    }

    for (key, _) in &head_ops {
        if !base_index.contains_key(key) {
            sink.push(
                Finding::new(
                    Severity::Info,
                    FindingCode::OperationAdded,
                    format!("Added operation {key}"),
                )
                .with_operation(&key.method, &key.path),
            );
        }
    }

    for (key, base_view) in &base_ops {
        let Some(head_view) = head_index.get(key) else {
            continue;
        };
        compare_shared_operation(key, base_view, head_view, &mut sink);
    }

    sink
}

fn compare_shared_operation(
    key: &OperationKey,
    base_view: &OperationView<'_>,
    head_view: &OperationView<'_>,
    sink: &mut Vec<Finding>,
) {
    // 3a. Responses
    let base_statuses = response_statuses(base_view.operation_node);
    let head_statuses = response_statuses(head_view.operation_node);

    for status in base_statuses.difference(&head_statuses) {
        sink.push(
            Finding::new(
                Severity::Breaking,
                FindingCode::ResponseRemoved,
                format!("Removed response {status} for {key}"),
            )
            .with_operation(&key.method, &key.path),
        );
    }
    for status in head_statuses.difference(&base_statuses) {
        sink.push(
            Finding::new(
                Severity::Info,
                FindingCode::ResponseAdded,
                format!("Added response {status} for {key}"),
            )
            .with_operation(&key.method, &key.path),
        );
    }

    // 3b. Required parameters
    let base_required = required_parameters(base_view);
    let head_required = required_parameters(head_view);
    for param in head_required.difference(&base_required) {
        sink.push(
            Finding::new(
                Severity::Warning,
                FindingCode::RequiredParamAdded,
                format!("New required parameter {param} for {key}"),
            )
            .with_operation(&key.method, &key.path),
        );
    }

    // 3c. Request body required
    let base_body_required = request_body_required(base_view.operation_node);
    let head_body_required = request_body_required(head_view.operation_node);
    if !base_body_required && head_body_required {
        sink.push(
            Finding::new(
                Severity::Warning,
                FindingCode::RequestBodyRequired,
                format!("Request body became required for {key}"),
            )
            .with_operation(&key.method, &key.path),
        );
    }

    // 3d. Request body schema
    if let (Some(base_schema), Some(head_schema)) = (
        request_schema(base_view.operation_node),
        request_schema(head_view.operation_node),
    ) {
        let mut guard = VisitGuard::new();
        compare_schema(
            base_schema,
            head_schema,
            &SchemaPath::root("request.body"),
            SchemaContext::Request,
            key,
            &mut guard,
            sink,
        );
    }

    // 3e. Response bodies
    let base_schemas = response_schemas(base_view.operation_node);
    let head_schemas = response_schemas(head_view.operation_node);
    for (status, base_schema) in &base_schemas {
        let Some(head_schema) = head_schemas.get(status) else {
            continue;
        };
        let mut guard = VisitGuard::new();
        compare_schema(
            base_schema,
            head_schema,
            &SchemaPath::root(format!("response.{status}.body")),
            SchemaContext::Response,
            key,
            &mut guard,
            sink,
        );
    }
}
