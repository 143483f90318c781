use std::collections::HashMap;
use std::path::Path;

use crate::browser::element::ElementAttributes;
use crate::mapping::row::{self, MappingRow};
use crate::mapping::strategy::{StrategySet, build_strategy_set};

// ============================================================================
// Element mapping — step text to recorded element candidates
// ============================================================================

/// One recorded element: the source row, its derived strategy set, and the
/// descriptive attributes used when healing.
///
/// `recorded_id` is the element id as originally loaded and never changes;
/// healing records stay keyed by it even after the live id drifts.
#[derive(Debug, Clone)]
pub struct ElementEntry {
    pub recorded_id: String,
    pub row: MappingRow,
    pub strategies: StrategySet,
    pub attributes: ElementAttributes,
}

impl ElementEntry {
    pub fn from_row(row: MappingRow) -> Self {
        let strategies = build_strategy_set(&row);
        let attributes = descriptive_attributes(&row);
        ElementEntry {
            recorded_id: row.id.clone(),
            row,
            strategies,
            attributes,
        }
    }
}

/// Descriptive attributes recorded for an element, used as the healing
/// reference. Tag, text and type are not present in the mapping table;
/// class and name columns carry whatever the recorder captured.
fn descriptive_attributes(row: &MappingRow) -> ElementAttributes {
    let non_empty = |s: &str| {
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    };

    ElementAttributes {
        id: non_empty(&row.id),
        tag: None,
        class_name: non_empty(&row.class),
        text: None,
        input_type: None,
        name: non_empty(&row.name),
        xpath: non_empty(&row.xpath_absolute),
    }
}

/// Step text → recorded element candidates, in table declaration order.
///
/// Duplicate step text keeps every candidate rather than overwriting;
/// resolution disambiguates by page URL first, declaration ordinal second.
#[derive(Debug, Clone, Default)]
pub struct ElementMapping {
    entries: Vec<(String, ElementEntry)>,
    by_step: HashMap<String, Vec<usize>>,
}

impl ElementMapping {
    /// Build the mapping from loaded rows. Rows with an empty `Step` are
    /// skipped, matching the recorder's own loader.
    pub fn from_rows(rows: Vec<MappingRow>) -> Self {
        let mut mapping = ElementMapping::default();
        for row in rows {
            if row.step.is_empty() {
                continue;
            }
            let step = row.step.clone();
            let entry = ElementEntry::from_row(row);
            let idx = mapping.entries.len();
            mapping.entries.push((step.clone(), entry));
            mapping.by_step.entry(step).or_default().push(idx);
        }
        mapping
    }

    pub fn load_csv(path: &Path) -> Result<Self, csv::Error> {
        let rows = row::read_rows(path)?;
        Ok(Self::from_rows(rows))
    }

    pub fn contains_step(&self, step: &str) -> bool {
        self.by_step.contains_key(step)
    }

    /// Resolve a step to one candidate entry index.
    ///
    /// A single candidate wins outright. With duplicates, the first
    /// candidate recorded for the current page wins; otherwise the first
    /// declared candidate does.
    pub fn resolve(&self, step: &str, current_page: &str) -> Option<usize> {
        let candidates = self.by_step.get(step)?;
        if candidates.len() > 1 && !current_page.is_empty() {
            for &idx in candidates {
                if self.entries[idx].1.row.page == current_page {
                    return Some(idx);
                }
            }
        }
        candidates.first().copied()
    }

    pub fn candidate_count(&self, step: &str) -> usize {
        self.by_step.get(step).map_or(0, |c| c.len())
    }

    pub fn entry(&self, idx: usize) -> &ElementEntry {
        &self.entries[idx].1
    }

    /// Overwrite an entry's row and strategies from a healed match.
    ///
    /// Returns (old strategy set, new strategy set). The row is mutated in
    /// place: id and xpath take the matched element's values, and the
    /// recorded CSS selector is dropped so the builder re-derives `#<id>`,
    /// so that rebuilding from the row reproduces the healed set. The
    /// descriptive attributes and `recorded_id` stay as originally loaded.
    pub fn apply_heal(
        &mut self,
        idx: usize,
        matched: &ElementAttributes,
    ) -> (StrategySet, StrategySet) {
        let entry = &mut self.entries[idx].1;

        entry.row.id = matched.id.clone().unwrap_or_default();
        entry.row.css_selector = String::new();
        entry.row.xpath_absolute = matched.xpath.clone().unwrap_or_default();

        let old = std::mem::take(&mut entry.strategies);
        let new = build_strategy_set(&entry.row);
        entry.strategies = new.clone();
        (old, new)
    }

    /// All entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ElementEntry)> {
        self.entries.iter().map(|(step, entry)| (step.as_str(), entry))
    }

    /// (step, page) pairs in declaration order, one per recorded element.
    pub fn declared_steps(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(step, entry)| (step.clone(), entry.row.page.clone()))
            .collect()
    }

    /// Current rows, reflecting any heals applied this run.
    pub fn rows(&self) -> Vec<MappingRow> {
        self.entries.iter().map(|(_, e)| e.row.clone()).collect()
    }

    /// Write the current (possibly healed) table back to CSV.
    pub fn persist(&self, path: &Path) -> Result<(), csv::Error> {
        row::write_rows(path, &self.rows())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
