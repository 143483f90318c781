use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::browser::element::{ElementHandle, ElementSession};
use crate::engine::cancel::CancelToken;
use crate::engine::error::EngineError;
use crate::engine::healer::ElementHealer;
use crate::engine::ledger::HealingLedger;
use crate::engine::locator::race_strategies;
use crate::engine::tracker::{RacePolicy, StrategyTracker};
use crate::mapping::strategy::StrategyKind;
use crate::mapping::table::ElementMapping;
use crate::report::report_model::HealingReport;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

// ============================================================================
// Resolution orchestrator
// ============================================================================

pub const DEFAULT_RETRY_ATTEMPTS: usize = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Engine knobs, resolved from CLI/config before construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub retry_attempts: usize,
    pub backoff: Duration,
    pub screenshots_dir: PathBuf,
    pub race_policy: RacePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            screenshots_dir: PathBuf::from("screenshots"),
            race_policy: RacePolicy::TryAll,
        }
    }
}

/// The stateful resolution-and-healing engine.
///
/// Owns the mapping table, the per-run element cache, the strategy tracker
/// and the ledgers; borrows a session per call rather than owning one.
/// All mutation happens on the caller's thread; the only cross-thread
/// primitive is the cancellation token.
pub struct HealingEngine {
    mapping: ElementMapping,
    healer: ElementHealer,
    tracker: StrategyTracker,
    ledger: HealingLedger,
    cache: HashMap<(String, String), ElementHandle>,
    config: EngineConfig,
    cancel: CancelToken,
    tracer: Option<TraceLogger>,
}

impl HealingEngine {
    pub fn new(mapping: ElementMapping, healer: ElementHealer, config: EngineConfig) -> Self {
        Self {
            mapping,
            healer,
            tracker: StrategyTracker::new(&StrategyKind::ALL),
            ledger: HealingLedger::new(),
            cache: HashMap::new(),
            config,
            cancel: CancelToken::new(),
            tracer: None,
        }
    }

    /// Attach a JSONL trace log for resolution events.
    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Token that aborts the run when cancelled from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn mapping(&self) -> &ElementMapping {
        &self.mapping
    }

    pub fn ledger(&self) -> &HealingLedger {
        &self.ledger
    }

    pub fn tracker(&self) -> &StrategyTracker {
        &self.tracker
    }

    /// Resolve a step to a live element handle.
    ///
    /// Cache hit returns immediately with no session traffic. Otherwise up
    /// to `retry_attempts` rounds of strategy race then healing fallback,
    /// with a fixed backoff between rounds. Exhaustion appends exactly one
    /// BrokenRecord (with a failure screenshot) and fails `ElementNotFound`.
    pub fn find_element(
        &mut self,
        session: &mut dyn ElementSession,
        step: &str,
        timeout: Duration,
    ) -> Result<ElementHandle, EngineError> {
        if !self.mapping.contains_step(step) {
            return Err(EngineError::InvalidBddStep(step.to_string()));
        }
        self.ledger.record_scenario();

        let page = session.last_url().unwrap_or("").to_string();
        let cache_key = (step.to_string(), page.clone());
        if let Some(handle) = self.cache.get(&cache_key) {
            return Ok(handle.clone());
        }

        let Some(idx) = self.mapping.resolve(step, &page) else {
            return Err(EngineError::InvalidBddStep(step.to_string()));
        };

        for attempt in 0..self.config.retry_attempts.max(1) {
            if self.cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            // Strategy race over the entry's current set
            let strategies = self.mapping.entry(idx).strategies.clone();
            let order = self
                .tracker
                .race_order(&strategies.kinds(), self.config.race_policy);

            if let Some(outcome) =
                race_strategies(session, &strategies, &order, timeout, &self.cancel)
            {
                self.tracker.record(outcome.strategy, 1.0);
                self.trace(
                    TraceEvent::now(step, "resolved")
                        .with_strategy(outcome.strategy.wire_name())
                        .with_attempt(attempt),
                );
                self.cache.insert(cache_key, outcome.handle.clone());
                return Ok(outcome.handle);
            }

            // Healing fallback against a fresh snapshot
            if let Some(handle) = self.heal_entry(session, step, idx) {
                self.cache.insert(cache_key, handle.clone());
                return Ok(handle);
            }

            if attempt + 1 < self.config.retry_attempts {
                std::thread::sleep(self.config.backoff);
            }
        }

        self.record_failure(session, step, idx);
        Err(EngineError::ElementNotFound(step.to_string()))
    }

    /// Explicit heal-only entry point: skip the race and go straight to
    /// similarity recovery for a known step.
    pub fn heal_step(
        &mut self,
        session: &mut dyn ElementSession,
        step: &str,
    ) -> Result<ElementHandle, EngineError> {
        if !self.mapping.contains_step(step) {
            return Err(EngineError::InvalidBddStep(step.to_string()));
        }

        let page = session.last_url().unwrap_or("").to_string();
        let Some(idx) = self.mapping.resolve(step, &page) else {
            return Err(EngineError::InvalidBddStep(step.to_string()));
        };

        self.heal_entry(session, step, idx)
            .ok_or_else(|| EngineError::HealingFailed(step.to_string()))
    }

    /// Run one heal attempt for an entry. On success the entry's row and
    /// strategy set are overwritten and a HealingRecord appended, keyed by
    /// the id as originally recorded. Snapshot and healer failures both
    /// normalize to `None`.
    fn heal_entry(
        &mut self,
        session: &mut dyn ElementSession,
        step: &str,
        idx: usize,
    ) -> Option<ElementHandle> {
        let original = self.mapping.entry(idx).attributes.clone();
        // Snapshot is always recaptured; it must reflect post-failure DOM state
        let snapshot = session.snapshot().ok()?;

        let matched = self.healer.heal(&original, &snapshot)?;

        let recorded_id = self.mapping.entry(idx).recorded_id.clone();
        let (old_set, new_set) = self.mapping.apply_heal(idx, &matched.attributes);
        self.ledger
            .record_healed(&recorded_id, old_set, new_set, matched.attributes.clone());
        self.trace(
            TraceEvent::now(step, "healed")
                .with_score(matched.score)
                .with_detail(matched.attributes.id.as_deref().unwrap_or("")),
        );

        Some(matched.handle)
    }

    /// Record a terminal failure: capture a screenshot into the configured
    /// directory and append one BrokenRecord.
    fn record_failure(&mut self, session: &mut dyn ElementSession, step: &str, idx: usize) {
        if let Err(e) = std::fs::create_dir_all(&self.config.screenshots_dir) {
            eprintln!(
                "Warning: could not create screenshots dir '{}': {}",
                self.config.screenshots_dir.display(),
                e
            );
        }

        let filename = format!(
            "failure_{}.png",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.config.screenshots_dir.join(filename);
        let path_str = path.display().to_string();

        if let Err(e) = session.screenshot(&path_str) {
            eprintln!("Warning: failed to capture failure screenshot: {}", e);
        }

        let entry = self.mapping.entry(idx);
        let recorded_id = entry.recorded_id.clone();
        let strategies = entry.strategies.clone();
        self.ledger
            .record_broken(&recorded_id, step, strategies, &path_str);
        self.trace(TraceEvent::now(step, "broken").with_detail(&path_str));
    }

    /// The structured report for everything this run healed or broke.
    pub fn report(&self) -> HealingReport {
        HealingReport::from_ledger(&self.ledger)
    }

    /// Write the current (possibly healed) mapping table back to its CSV
    /// source. Never called implicitly: persisting corrections is the
    /// caller's decision.
    pub fn persist(&self, path: &Path) -> Result<(), csv::Error> {
        self.mapping.persist(path)
    }

    fn trace(&self, event: TraceEvent) {
        if let Some(tracer) = &self.tracer {
            tracer.log(&event);
        }
    }
}
