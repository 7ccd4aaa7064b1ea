//! Markdown reports written next to the newsletter page.

use crate::models::LinkStatus;

/// `link_report.md` body: totals followed by every unreachable link.
pub fn link_report_markdown(report: &[LinkStatus]) -> String {
    let invalid: Vec<&LinkStatus> = report.iter().filter(|l| !l.ok).collect();
    let mut lines = vec![
        "# Link Validation Report".to_string(),
        format!("Total checked: {}", report.len()),
        format!("Invalid: {}", invalid.len()),
        String::new(),
        "## Invalid Links".to_string(),
    ];
    lines.extend(
        invalid
            .iter()
            .map(|l| format!("- {} status={}", l.url, l.status)),
    );
    lines.join("\n")
}
