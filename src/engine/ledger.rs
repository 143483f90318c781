use serde::{Deserialize, Serialize};

use crate::browser::element::ElementAttributes;
use crate::mapping::strategy::StrategySet;

// ============================================================================
// Healing/failure ledger — append-only, per-run
// ============================================================================

/// One successful heal, keyed by the element id as originally recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingRecord {
    pub original_element_id: String,
    pub timestamp: String,
    pub original_strategies: StrategySet,
    pub new_strategies: StrategySet,
    pub matched_attributes: ElementAttributes,
    pub note: String,
}

/// One element that could not be found or healed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokenRecord {
    pub element_id: String,
    pub timestamp: String,
    pub bdd_step: String,
    pub original_strategies: StrategySet,
    pub screenshot_path: String,
    pub note: String,
}

/// Append-only in-memory record of the run's healing and failure events.
/// Records are never mutated or deleted; the ledger lives for one run.
#[derive(Debug, Default)]
pub struct HealingLedger {
    healed: Vec<HealingRecord>,
    broken: Vec<BrokenRecord>,
    scenarios: usize,
}

impl HealingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one attempted resolution toward the run metrics.
    pub fn record_scenario(&mut self) {
        self.scenarios += 1;
    }

    pub fn record_healed(
        &mut self,
        original_element_id: &str,
        original_strategies: StrategySet,
        new_strategies: StrategySet,
        matched_attributes: ElementAttributes,
    ) {
        self.healed.push(HealingRecord {
            original_element_id: original_element_id.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            original_strategies,
            new_strategies,
            matched_attributes,
            note: "Element was healed using semantic matching".to_string(),
        });
    }

    pub fn record_broken(
        &mut self,
        element_id: &str,
        bdd_step: &str,
        original_strategies: StrategySet,
        screenshot_path: &str,
    ) {
        self.broken.push(BrokenRecord {
            element_id: element_id.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            bdd_step: bdd_step.to_string(),
            original_strategies,
            screenshot_path: screenshot_path.to_string(),
            note: "Element could not be found or healed".to_string(),
        });
    }

    pub fn healed(&self) -> &[HealingRecord] {
        &self.healed
    }

    pub fn broken(&self) -> &[BrokenRecord] {
        &self.broken
    }

    pub fn scenario_count(&self) -> usize {
        self.scenarios
    }

    pub fn is_empty(&self) -> bool {
        self.healed.is_empty() && self.broken.is_empty()
    }
}
