use std::time::{Duration, Instant};

use crate::browser::element::{ElementHandle, ElementSession};
use crate::engine::cancel::CancelToken;
use crate::mapping::strategy::{StrategyKind, StrategySet};

// ============================================================================
// Single-strategy location and the strategy race
// ============================================================================

/// Gap between presence probes against the session.
pub const PROBE_INTERVAL: Duration = Duration::from_millis(100);

/// Winning result of a strategy race.
#[derive(Debug, Clone)]
pub struct RaceOutcome {
    pub handle: ElementHandle,
    pub strategy: StrategyKind,
}

/// Probe once for (strategy, value), swallowing session errors.
///
/// A malformed selector, a closed session and a genuinely absent element
/// all answer `None`. The caller cannot tell them apart, which keeps the
/// race symmetric across strategies.
fn probe(
    session: &mut dyn ElementSession,
    strategy: StrategyKind,
    value: &str,
) -> Option<ElementHandle> {
    session.try_locate(strategy, value).ok().flatten()
}

/// Poll for one (strategy, value) pair until found or the timeout elapses.
///
/// Blocks the caller; performs no retries beyond its own polling. Always
/// probes at least once, so a zero timeout still checks current presence.
pub fn locate_with_timeout(
    session: &mut dyn ElementSession,
    strategy: StrategyKind,
    value: &str,
    timeout: Duration,
) -> Option<ElementHandle> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(handle) = probe(session, strategy, value) {
            return Some(handle);
        }

        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        std::thread::sleep(PROBE_INTERVAL.min(deadline - now));
    }
}

/// Race every strategy in the set within one shared time budget.
///
/// Probes are interleaved (one short presence check per strategy per sweep)
/// rather than dispatched from parallel threads: the session's command
/// channel serializes requests, so threads would only contend for it.
/// The first probe that reports presence wins; whichever strategy's element
/// actually exists resolves the race regardless of sweep order. A strategy
/// whose probe errors is dropped from later sweeps.
///
/// `order` selects the probe order within each sweep (the race policy's
/// output); strategies absent from the set are ignored.
pub fn race_strategies(
    session: &mut dyn ElementSession,
    strategies: &StrategySet,
    order: &[StrategyKind],
    timeout: Duration,
    cancel: &CancelToken,
) -> Option<RaceOutcome> {
    let lanes: Vec<(StrategyKind, &str)> = order
        .iter()
        .filter_map(|kind| strategies.get(*kind).map(|value| (*kind, value)))
        .collect();

    if lanes.is_empty() {
        return None;
    }

    if lanes.len() == 1 {
        let (kind, value) = lanes[0];
        return locate_with_timeout(session, kind, value, timeout)
            .map(|handle| RaceOutcome { handle, strategy: kind });
    }

    let deadline = Instant::now() + timeout;
    let mut dead = vec![false; lanes.len()];

    loop {
        for (i, (kind, value)) in lanes.iter().enumerate() {
            if dead[i] {
                continue;
            }
            if cancel.is_cancelled() {
                return None;
            }

            match session.try_locate(*kind, value) {
                Ok(Some(handle)) => {
                    return Some(RaceOutcome {
                        handle,
                        strategy: *kind,
                    });
                }
                Ok(None) => {}
                Err(_) => dead[i] = true,
            }
        }

        if dead.iter().all(|d| *d) {
            return None;
        }

        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        std::thread::sleep(PROBE_INTERVAL.min(deadline - now));
    }
}
