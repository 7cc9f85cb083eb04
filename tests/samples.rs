use pretty_assertions::assert_eq;
use truespec_diff::{diff, load_spec, render_markdown, FindingCode, Severity};

#[test]
fn pet_store_revision_reports_expected_findings() {
    let base = load_spec(include_str!("fixtures/pet-store-base.yaml"))
        .unwrap()
        .unwrap();
    let head = load_spec(include_str!("fixtures/pet-store-head.yaml"))
        .unwrap()
        .unwrap();

    let report = diff(&base, &head).unwrap();

    assert_eq!(report.summary.total, 6);
    assert_eq!(report.summary.breaking, 2);
    assert_eq!(report.summary.warning, 2);
    assert_eq!(report.summary.info, 2);
    assert_eq!(report.summary.total, report.items.len());

    let codes: Vec<FindingCode> = report.items.iter().map(|f| f.code).collect();
    assert!(codes.contains(&FindingCode::OperationAdded));
    assert!(codes.contains(&FindingCode::ResponseRemoved));
    assert!(codes.contains(&FindingCode::RequiredParamAdded));
    assert!(codes.contains(&FindingCode::RequestBodyRequired));
    assert!(codes.contains(&FindingCode::SchemaFieldRemoved));
    assert!(codes.contains(&FindingCode::SchemaFieldAdded));

    // the new `email` field on createPet's request body must never surface:
    // field-added findings only fire in a response context.
    assert!(!report
        .items
        .iter()
        .any(|f| f.message.contains("email")));

    let removed_response = report
        .items
        .iter()
        .find(|f| f.code == FindingCode::ResponseRemoved)
        .unwrap();
    assert_eq!(removed_response.severity, Severity::Breaking);
    assert!(removed_response.message.contains("404"));
    assert_eq!(
        removed_response.operation.as_ref().unwrap().path,
        "/pets/{id}"
    );

    let markdown = render_markdown(&report);
    assert!(markdown.starts_with("## TrueSpec Summary"));
    assert!(markdown.contains("### Breaking (2)"));
    assert!(markdown.contains("### Warning (2)"));
    assert!(markdown.contains("### Info (2)"));
}

#[test]
fn pet_store_reflexivity_holds() {
    let base = load_spec(include_str!("fixtures/pet-store-base.yaml"))
        .unwrap()
        .unwrap();
    let report = diff(&base, &base).unwrap();
    assert!(report.items.is_empty());
    assert_eq!(render_markdown(&report), "## TrueSpec Summary\n\n- Breaking: 0\n- Warning: 0\n- Info: 0\n\nNo differences found.\n");
}
