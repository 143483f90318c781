use serde::{Deserialize, Serialize};

use crate::engine::ledger::{BrokenRecord, HealingLedger, HealingRecord};

// ============================================================================
// Healing report — the run's structured output
// ============================================================================

pub const NO_CHANGES_MESSAGE: &str =
    "No changes detected. The script ran smoothly without any issues.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealingMetrics {
    pub total_scenarios: usize,
    pub healed_count: usize,
    pub broken_count: usize,
}

/// Aggregated report over the run's healing ledger.
///
/// Built via `from_results` on the ledger. `success` means no element was
/// left broken; healed elements alone still count as a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingReport {
    pub success: bool,
    pub message: String,
    pub healed_elements: Vec<HealingRecord>,
    pub broken_elements: Vec<BrokenRecord>,
    pub metrics: HealingMetrics,
}

impl HealingReport {
    pub fn from_ledger(ledger: &HealingLedger) -> Self {
        let healed = ledger.healed().to_vec();
        let broken = ledger.broken().to_vec();

        let message = if healed.is_empty() && broken.is_empty() {
            NO_CHANGES_MESSAGE.to_string()
        } else {
            format!(
                "{} element(s) healed, {} element(s) broken",
                healed.len(),
                broken.len()
            )
        };

        Self {
            success: broken.is_empty(),
            message,
            metrics: HealingMetrics {
                total_scenarios: ledger.scenario_count(),
                healed_count: healed.len(),
                broken_count: broken.len(),
            },
            healed_elements: healed,
            broken_elements: broken,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
