use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// One resolution event, written as a JSONL line.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub step: String,

    /// "resolved", "healed", "broken", "action"
    pub phase: String,

    pub strategy: Option<String>,
    pub attempt: Option<usize>,
    pub score: Option<f32>,
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(step: &str, phase: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            step: step.to_string(),
            phase: phase.to_string(),
            strategy: None,
            attempt: None,
            score: None,
            detail: None,
        }
    }

    pub fn with_strategy(mut self, strategy: impl ToString) -> Self {
        self.strategy = Some(strategy.to_string());
        self
    }

    pub fn with_attempt(mut self, attempt: usize) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
