use crate::report::report_model::HealingReport;

// ============================================================================
// Console reporter — formatted terminal output
// ============================================================================

/// Format a healing report for terminal output.
///
/// Produces output like:
/// ```text
/// === Healing Report ===
///
/// ✓ HEALED  submit-btn → btn-submit
/// ✗ BROKEN  cancel-btn ("When user clicks Cancel")
///     screenshot: screenshots/failure_20260804_101500.png
///
/// === 12 scenarios: 1 healed, 1 broken ===
/// ```
pub fn format_console_report(report: &HealingReport) -> String {
    let mut out = String::new();

    out.push_str("=== Healing Report ===\n\n");

    if report.healed_elements.is_empty() && report.broken_elements.is_empty() {
        out.push_str(&format!("{}\n", report.message));
        return out;
    }

    for record in &report.healed_elements {
        let new_id = record
            .matched_attributes
            .id
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or("(no id)");
        out.push_str(&format!(
            "\u{2713} HEALED  {} \u{2192} {}\n",
            record.original_element_id, new_id
        ));
    }

    for record in &report.broken_elements {
        out.push_str(&format!(
            "\u{2717} BROKEN  {} (\"{}\")\n",
            record.element_id, record.bdd_step
        ));
        if !record.screenshot_path.is_empty() {
            out.push_str(&format!("    screenshot: {}\n", record.screenshot_path));
        }
    }

    out.push_str(&format!(
        "\n=== {} scenarios: {} healed, {} broken ===\n",
        report.metrics.total_scenarios,
        report.metrics.healed_count,
        report.metrics.broken_count
    ));

    out
}
