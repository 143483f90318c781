use crate::browser::element::{ElementHandle, ElementSession};
use crate::engine::error::EngineError;

// ============================================================================
// Step actions — inferred from step text, executed against a handle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckboxOp {
    Check,
    Uncheck,
    Toggle,
}

/// The interaction a behavioral step asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    Click,
    Input { value: String },
    Verify,
    Select { option: String },
    Checkbox { op: CheckboxOp },
    Radio,
}

impl StepAction {
    pub fn name(&self) -> &'static str {
        match self {
            StepAction::Click => "click",
            StepAction::Input { .. } => "input",
            StepAction::Verify => "verify",
            StepAction::Select { .. } => "select",
            StepAction::Checkbox { .. } => "checkbox",
            StepAction::Radio => "radio",
        }
    }
}

/// Infer the action (and any payload value) from step text.
///
/// Keyword heuristics, most specific first: an explicit "checkbox" wins
/// over the "check" that would otherwise read as a verify, and "choose"
/// marks a radio group. Returns `None` when no action can be inferred;
/// such steps are skipped by the runner.
pub fn determine_action(step: &str) -> Option<StepAction> {
    let lower = step.to_lowercase();

    if lower.contains("checkbox") {
        let op = if lower.contains("uncheck") {
            CheckboxOp::Uncheck
        } else if lower.contains("check") {
            CheckboxOp::Check
        } else {
            CheckboxOp::Toggle
        };
        return Some(StepAction::Checkbox { op });
    }

    if lower.contains("choose") || lower.contains("radio") {
        return Some(StepAction::Radio);
    }

    if lower.contains("select") {
        return Some(StepAction::Select {
            option: quoted_value(step).unwrap_or_default(),
        });
    }

    if lower.contains("click") {
        return Some(StepAction::Click);
    }

    if lower.contains("enter") || lower.contains("input") {
        return Some(StepAction::Input {
            value: quoted_value(step).unwrap_or_default(),
        });
    }

    if lower.contains("verify") || lower.contains("redirected") {
        return Some(StepAction::Verify);
    }

    None
}

/// Extract the first quoted payload from a step, accepting double or
/// single quotes: `enter "user@example.com" in the email field`.
pub fn quoted_value(step: &str) -> Option<String> {
    for quote in ['"', '\''] {
        let mut parts = step.splitn(3, quote);
        parts.next()?;
        if let (Some(inner), Some(_)) = (parts.next(), parts.next()) {
            return Some(inner.to_string());
        }
    }
    None
}

/// Execute an inferred action against a resolved element.
///
/// Session-level failures and unsupported interactions both surface as
/// `ActionExecutionFailed`; the runner logs and skips the step.
pub fn execute_action(
    session: &mut dyn ElementSession,
    handle: &ElementHandle,
    action: &StepAction,
    step: &str,
) -> Result<(), EngineError> {
    let fail = |reason: String| EngineError::ActionExecutionFailed {
        step: step.to_string(),
        action: action.name().to_string(),
        reason,
    };

    match action {
        StepAction::Click => session.click(handle).map_err(|e| fail(e.to_string())),

        StepAction::Input { value } => session
            .fill(handle, value)
            .map_err(|e| fail(e.to_string())),

        StepAction::Verify => {
            let visible = session
                .is_displayed(handle)
                .map_err(|e| fail(e.to_string()))?;
            if !visible {
                return Err(fail("element is not visible".to_string()));
            }
            Ok(())
        }

        StepAction::Select { option } => {
            let attributes = session.describe(handle).map_err(|e| fail(e.to_string()))?;
            let tag = attributes.tag.as_deref().unwrap_or("");
            if !tag.eq_ignore_ascii_case("select") {
                return Err(fail(format!(
                    "cannot select an option on <{}>",
                    if tag.is_empty() { "unknown" } else { tag }
                )));
            }
            session
                .select_option(handle, option)
                .map_err(|e| fail(e.to_string()))
        }

        StepAction::Checkbox { op } => {
            let current = session
                .is_selected(handle)
                .map_err(|e| fail(e.to_string()))?;
            let desired = match op {
                CheckboxOp::Check => true,
                CheckboxOp::Uncheck => false,
                CheckboxOp::Toggle => !current,
            };
            if current != desired {
                session
                    .set_checked(handle, desired)
                    .map_err(|e| fail(e.to_string()))?;
            }
            Ok(())
        }

        StepAction::Radio => {
            let selected = session
                .is_selected(handle)
                .map_err(|e| fail(e.to_string()))?;
            if !selected {
                session.click(handle).map_err(|e| fail(e.to_string()))?;
            }
            Ok(())
        }
    }
}
