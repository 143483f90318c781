use std::time::Duration;

use crate::browser::element::ElementSession;
use crate::engine::error::EngineError;
use crate::engine::framework::HealingEngine;
use crate::runner::actions::{determine_action, execute_action};

// ============================================================================
// Step runner — sequential execution of every mapped step
// ============================================================================

/// Outcome tally for one full run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub steps_total: usize,
    pub steps_passed: usize,
    pub steps_failed: usize,
    pub steps_skipped: usize,
    pub cancelled: bool,
}

/// Executes every mapped step in declaration order against one session.
///
/// Strictly sequential: each step settles before the next begins, because
/// UI state depends on the prior action's effect. A broken step is logged
/// and skipped; it never aborts the rest of the run.
pub struct StepRunner {
    pub step_timeout: Duration,
    pub settle_delay: Duration,
    pub verbose: bool,
}

impl Default for StepRunner {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(10),
            settle_delay: Duration::from_millis(1500),
            verbose: false,
        }
    }
}

impl StepRunner {
    pub fn run(
        &self,
        engine: &mut HealingEngine,
        session: &mut dyn ElementSession,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        let cancel = engine.cancel_token();
        let steps = engine.mapping().declared_steps();

        for (step, page) in steps {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            summary.steps_total += 1;

            let Some(action) = determine_action(&step) else {
                eprintln!("Warning: could not determine action for step: {}", step);
                summary.steps_skipped += 1;
                continue;
            };

            // Move to the step's recorded page if the session is elsewhere
            if !page.is_empty() && session.last_url() != Some(page.as_str()) {
                if let Err(e) = session.navigate(&page) {
                    eprintln!("Error navigating to '{}' for step '{}': {}", page, step, e);
                    summary.steps_failed += 1;
                    continue;
                }
                self.settle(session);
            }

            let handle = match engine.find_element(session, &step, self.step_timeout) {
                Ok(handle) => handle,
                Err(EngineError::Cancelled) => {
                    summary.cancelled = true;
                    break;
                }
                Err(e) => {
                    eprintln!("Error executing step '{}': {}", step, e);
                    summary.steps_failed += 1;
                    continue;
                }
            };

            self.settle(session);

            match execute_action(session, &handle, &action, &step) {
                Ok(()) => {
                    if self.verbose {
                        eprintln!("  Executed: {} ({})", step, action.name());
                    }
                    summary.steps_passed += 1;
                }
                Err(e) => {
                    eprintln!("Error executing step '{}': {}", step, e);
                    summary.steps_failed += 1;
                }
            }
        }

        summary
    }

    fn settle(&self, session: &mut dyn ElementSession) {
        if self.settle_delay.is_zero() {
            return;
        }
        // Prefer the session's own idle wait; fall back to a local sleep
        if session.wait_idle(self.settle_delay.as_millis() as u64).is_err() {
            std::thread::sleep(self.settle_delay);
        }
    }
}
