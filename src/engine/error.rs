use std::fmt;

/// Terminal errors surfaced by the resolution engine.
///
/// Locator-level and healer-internal failures are never propagated; they
/// normalize to "not found" / "no match" so the retry machinery stays
/// uniform. What reaches the caller is one of these.
#[derive(Debug)]
pub enum EngineError {
    /// The step has no entry in the mapping table (caller error)
    InvalidBddStep(String),

    /// Every strategy and the healer were exhausted for a known step
    ElementNotFound(String),

    /// An explicit heal attempt found no candidate above threshold
    HealingFailed(String),

    /// A resolved element does not support the requested interaction
    ActionExecutionFailed {
        step: String,
        action: String,
        reason: String,
    },

    /// The run-level cancellation token was triggered
    Cancelled,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidBddStep(step) => {
                write!(f, "BDD step '{}' not found in mappings", step)
            }
            EngineError::ElementNotFound(step) => {
                write!(f, "Could not locate element for step: {}", step)
            }
            EngineError::HealingFailed(step) => {
                write!(f, "Element healing failed for step '{}': no suitable match found", step)
            }
            EngineError::ActionExecutionFailed { step, action, reason } => {
                write!(f, "Failed to execute action '{}' for step '{}': {}", action, step, reason)
            }
            EngineError::Cancelled => {
                write!(f, "Run was cancelled")
            }
        }
    }
}

impl std::error::Error for EngineError {}
