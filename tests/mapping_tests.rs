mod common;

use common::{renamed_submit_attrs, row, submit_row};
use locator_healing::mapping::row::{MappingRow, read_rows_from, write_rows};
use locator_healing::mapping::strategy::{StrategyKind, build_strategy_set};
use locator_healing::mapping::table::ElementMapping;

const CSV_HEADER: &str =
    "Step,Page,ID,Class,Name,Value,XPath (Absolute),XPath (Relative),CSS Selector";

// ============================================================================
// 1. CSV loading — consumed columns land in the right fields
// ============================================================================

#[test]
fn read_rows_maps_columns() {
    let csv = format!(
        "{}\n{}",
        CSV_HEADER,
        "When user clicks Submit button,https://app.example.com/login,submit-btn,submit primary,,,//button[@id='submit-btn'],,#submit-btn"
    );
    let rows = read_rows_from(csv.as_bytes()).unwrap();
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.step, "When user clicks Submit button");
    assert_eq!(row.page, "https://app.example.com/login");
    assert_eq!(row.id, "submit-btn");
    assert_eq!(row.class, "submit primary");
    assert_eq!(row.xpath_absolute, "//button[@id='submit-btn']");
    assert_eq!(row.css_selector, "#submit-btn");
    assert_eq!(row.xpath_relative, "");
}

// ============================================================================
// 2. Fields are whitespace-trimmed
// ============================================================================

#[test]
fn read_rows_trims_fields() {
    let csv = format!("{}\n{}", CSV_HEADER, "  step one , , id-1 ,,,,,,");
    let rows = read_rows_from(csv.as_bytes()).unwrap();
    assert_eq!(rows[0].step, "step one");
    assert_eq!(rows[0].id, "id-1");
}

// ============================================================================
// 3. Rows with an empty Step are skipped
// ============================================================================

#[test]
fn mapping_skips_empty_steps() {
    let mapping = ElementMapping::from_rows(vec![
        row("", "", "ghost", "", ""),
        submit_row(),
    ]);
    assert_eq!(mapping.len(), 1);
    assert!(mapping.contains_step("When user clicks Submit button"));
}

// ============================================================================
// 4. Duplicate step text keeps every candidate
// ============================================================================

#[test]
fn mapping_keeps_duplicate_step_candidates() {
    let mapping = ElementMapping::from_rows(vec![
        row("When user clicks Save", "https://a.example.com", "save-a", "", ""),
        row("When user clicks Save", "https://b.example.com", "save-b", "", ""),
    ]);
    assert_eq!(mapping.candidate_count("When user clicks Save"), 2);
}

// ============================================================================
// 5. Duplicate resolution prefers the current page
// ============================================================================

#[test]
fn mapping_resolves_duplicates_by_page() {
    let mapping = ElementMapping::from_rows(vec![
        row("When user clicks Save", "https://a.example.com", "save-a", "", ""),
        row("When user clicks Save", "https://b.example.com", "save-b", "", ""),
    ]);

    let idx = mapping
        .resolve("When user clicks Save", "https://b.example.com")
        .unwrap();
    assert_eq!(mapping.entry(idx).row.id, "save-b");
}

// ============================================================================
// 6. Duplicate resolution falls back to declaration ordinal
// ============================================================================

#[test]
fn mapping_resolves_duplicates_by_ordinal() {
    let mapping = ElementMapping::from_rows(vec![
        row("When user clicks Save", "https://a.example.com", "save-a", "", ""),
        row("When user clicks Save", "https://b.example.com", "save-b", "", ""),
    ]);

    let idx = mapping
        .resolve("When user clicks Save", "https://elsewhere.example.com")
        .unwrap();
    assert_eq!(mapping.entry(idx).row.id, "save-a");
}

// ============================================================================
// 7. Unknown step resolves to nothing
// ============================================================================

#[test]
fn mapping_unknown_step() {
    let mapping = ElementMapping::from_rows(vec![submit_row()]);
    assert!(!mapping.contains_step("When user clicks Cancel"));
    assert_eq!(mapping.resolve("When user clicks Cancel", ""), None);
}

// ============================================================================
// 8. Descriptive attributes derived from the row
// ============================================================================

#[test]
fn entry_descriptive_attributes() {
    let mapping = ElementMapping::from_rows(vec![submit_row()]);
    let idx = mapping.resolve("When user clicks Submit button", "").unwrap();
    let attrs = &mapping.entry(idx).attributes;

    assert_eq!(attrs.id.as_deref(), Some("submit-btn"));
    assert_eq!(attrs.class_name.as_deref(), Some("submit primary"));
    assert_eq!(attrs.xpath.as_deref(), Some("//button[@id='submit-btn']"));
    assert_eq!(attrs.tag, None);
    assert_eq!(attrs.name, None);
}

// ============================================================================
// 9. apply_heal overwrites the row and regenerates strategies
// ============================================================================

#[test]
fn apply_heal_regenerates_strategies() {
    let mut mapping = ElementMapping::from_rows(vec![submit_row()]);
    let idx = mapping.resolve("When user clicks Submit button", "").unwrap();

    let (old, new) = mapping.apply_heal(idx, &renamed_submit_attrs());

    assert_eq!(old.get(StrategyKind::Id), Some("submit-btn"));
    assert_eq!(new.get(StrategyKind::Id), Some("btn-submit"));
    assert_eq!(new.get(StrategyKind::CssSelector), Some("#btn-submit"));
    assert_eq!(
        new.get(StrategyKind::XpathAbsolute),
        Some("/html/body/form/button[1]")
    );

    let entry = mapping.entry(idx);
    assert_eq!(entry.strategies, new);
    // The stable key never follows the live id
    assert_eq!(entry.recorded_id, "submit-btn");
}

// ============================================================================
// 10. Rebuilding from a healed row reproduces the healed set
// ============================================================================

#[test]
fn healed_row_rebuild_is_idempotent() {
    let mut mapping = ElementMapping::from_rows(vec![submit_row()]);
    let idx = mapping.resolve("When user clicks Submit button", "").unwrap();
    let (_, healed) = mapping.apply_heal(idx, &renamed_submit_attrs());

    let rebuilt = build_strategy_set(&mapping.entry(idx).row);
    assert_eq!(rebuilt, healed);
}

// ============================================================================
// 11. Persist round-trips the healed table
// ============================================================================

#[test]
fn persist_roundtrips_healed_rows() {
    let mut mapping = ElementMapping::from_rows(vec![submit_row()]);
    let idx = mapping.resolve("When user clicks Submit button", "").unwrap();
    mapping.apply_heal(idx, &renamed_submit_attrs());

    let path = std::env::temp_dir().join("locator-healing-persist-test.csv");
    mapping.persist(&path).unwrap();

    let reloaded = ElementMapping::load_csv(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(reloaded.len(), 1);
    let entry = reloaded.entry(0);
    assert_eq!(entry.row.id, "btn-submit");
    assert_eq!(entry.strategies, mapping.entry(idx).strategies);
}

// ============================================================================
// 12. write_rows emits the original header
// ============================================================================

#[test]
fn write_rows_emits_header() {
    let path = std::env::temp_dir().join("locator-healing-header-test.csv");
    write_rows(&path, &[submit_row()]).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let header = content.lines().next().unwrap();
    assert_eq!(header, CSV_HEADER);
}

// ============================================================================
// 13. declared_steps preserves table order
// ============================================================================

#[test]
fn declared_steps_in_order() {
    let mapping = ElementMapping::from_rows(vec![
        row("first step click", "https://a.example.com", "a", "", ""),
        row("second step click", "https://b.example.com", "b", "", ""),
    ]);

    let steps: Vec<String> = mapping
        .declared_steps()
        .into_iter()
        .map(|(step, _)| step)
        .collect();
    assert_eq!(steps, vec!["first step click", "second step click"]);
}

// ============================================================================
// 14. MappingRow serde roundtrip through CSV
// ============================================================================

#[test]
fn mapping_row_csv_roundtrip() {
    let path = std::env::temp_dir().join("locator-healing-roundtrip-test.csv");
    let original = submit_row();
    write_rows(&path, std::slice::from_ref(&original)).unwrap();

    let reloaded: Vec<MappingRow> =
        read_rows_from(std::fs::File::open(&path).unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(reloaded, vec![original]);
}
