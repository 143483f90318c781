use std::path::Path;

use serde::{Deserialize, Serialize};

// ============================================================================
// Mapping table input — one row per recorded element
// ============================================================================

/// One row of the recorded mapping table.
///
/// The table carries nine columns as produced by the upstream mapping
/// generator; resolution consumes `Step`, `Page`, `ID`, `CSS Selector` and
/// `XPath (Absolute)`. `Class` and `Name` are kept as descriptive context
/// for healing; the remaining columns are loaded but otherwise unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRow {
    #[serde(rename = "Step")]
    pub step: String,

    #[serde(rename = "Page", default)]
    pub page: String,

    #[serde(rename = "ID", default)]
    pub id: String,

    #[serde(rename = "Class", default)]
    pub class: String,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Value", default)]
    pub value: String,

    #[serde(rename = "XPath (Absolute)", default)]
    pub xpath_absolute: String,

    #[serde(rename = "XPath (Relative)", default)]
    pub xpath_relative: String,

    #[serde(rename = "CSS Selector", default)]
    pub css_selector: String,
}

/// Read all mapping rows from a CSV file.
///
/// Fields are whitespace-trimmed; rows that fail to parse abort the load.
pub fn read_rows(path: &Path) -> Result<Vec<MappingRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: MappingRow = record?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read mapping rows from any reader (used by tests and in-memory tables).
pub fn read_rows_from<R: std::io::Read>(input: R) -> Result<Vec<MappingRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: MappingRow = record?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write mapping rows back out with the original nine-column header.
pub fn write_rows(path: &Path, rows: &[MappingRow]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
