//! The report renderer (C6): Markdown rendering of a [`Report`].

use crate::finding::{Report, Severity};

/// Renders `report` to the stable Markdown layout described in §4.6.
///
/// Deterministic for a given `report`: the header always lists counts in
/// the order breaking/warning/info, and each non-empty severity section
/// lists its findings in the order they appear in `report.items`.
pub fn render_markdown(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("## TrueSpec Summary\n");
    out.push('\n');
    out.push_str(&format!("- Breaking: {}\n", report.summary.breaking));
    out.push_str(&format!("- Warning: {}\n", report.summary.warning));
    out.push_str(&format!("- Info: {}\n", report.summary.info));

    if report.items.is_empty() {
        out.push('\n');
        out.push_str("No differences found.\n");
        return out;
    }

    for severity in Severity::ORDER {
        let messages: Vec<&str> = report
            .items
            .iter()
            .filter(|f| f.severity == severity)
            .map(|f| f.message.as_str())
            .collect();

        if messages.is_empty() {
            continue;
        }

        out.push('\n');
        out.push_str(&format!("### {} ({})\n", severity.label(), messages.len()));
        for message in messages {
            out.push_str(&format!("- {message}\n"));
        }
    }

    out
}
