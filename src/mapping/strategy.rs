use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::mapping::row::MappingRow;

// ============================================================================
// Locator strategies — kinds and ordered sets
// ============================================================================

/// A named way of locating an element.
///
/// Wire names match the mapping table columns so that strategy sets
/// serialize the way the upstream tooling expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    Id,
    CssSelector,
    XpathAbsolute,
}

impl StrategyKind {
    /// Every strategy kind, in canonical declaration order.
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Id,
        StrategyKind::CssSelector,
        StrategyKind::XpathAbsolute,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            StrategyKind::Id => "id",
            StrategyKind::CssSelector => "CSS Selector",
            StrategyKind::XpathAbsolute => "XPath (Absolute)",
        }
    }

    pub fn from_wire(name: &str) -> Option<StrategyKind> {
        match name {
            "id" => Some(StrategyKind::Id),
            "CSS Selector" => Some(StrategyKind::CssSelector),
            "XPath (Absolute)" => Some(StrategyKind::XpathAbsolute),
            _ => None,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// An ordered set of (strategy, locator value) pairs for one element.
///
/// Order is declaration order and is preserved through serialization.
/// Values are always non-empty; absent source fields produce no entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategySet {
    entries: Vec<(StrategyKind, String)>,
}

impl StrategySet {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a strategy value. Replaces an existing entry of the same kind
    /// in place; empty values are ignored.
    pub fn insert(&mut self, kind: StrategyKind, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        if let Some(existing) = self.entries.iter_mut().find(|(k, _)| *k == kind) {
            existing.1 = value;
        } else {
            self.entries.push((kind, value));
        }
    }

    pub fn get(&self, kind: StrategyKind) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (StrategyKind, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// The kinds present, in declaration order.
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for StrategySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (kind, value) in &self.entries {
            map.serialize_entry(kind.wire_name(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StrategySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = StrategySet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of strategy names to locator values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut set = StrategySet::new();
                while let Some(key) = map.next_key::<String>()? {
                    match StrategyKind::from_wire(&key) {
                        Some(kind) => {
                            let value: String = map.next_value()?;
                            set.insert(kind, value);
                        }
                        // Unknown strategy names are tolerated and dropped
                        None => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

// ============================================================================
// Strategy set builder
// ============================================================================

/// Derive the strategy set for one mapping row.
///
/// Pure and idempotent: identical rows always produce identical sets, and
/// a row overwritten by a heal reproduces the healed set on rebuild.
/// Rules: `id` when non-empty; `CSS Selector` when non-empty, defaulting to
/// `#<id>` when an id is present and no selector was recorded;
/// `XPath (Absolute)` when non-empty.
pub fn build_strategy_set(row: &MappingRow) -> StrategySet {
    let mut set = StrategySet::new();

    if !row.id.is_empty() {
        set.insert(StrategyKind::Id, row.id.clone());
    }

    if !row.css_selector.is_empty() {
        set.insert(StrategyKind::CssSelector, row.css_selector.clone());
    } else if !row.id.is_empty() {
        set.insert(StrategyKind::CssSelector, format!("#{}", row.id));
    }

    if !row.xpath_absolute.is_empty() {
        set.insert(StrategyKind::XpathAbsolute, row.xpath_absolute.clone());
    }

    set
}
