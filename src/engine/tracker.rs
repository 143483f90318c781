use std::time::{SystemTime, UNIX_EPOCH};

use crate::mapping::strategy::StrategyKind;

// ============================================================================
// Strategy-value tracker — which strategy kind tends to win races
// ============================================================================

pub const LEARNING_RATE: f32 = 0.1;
pub const EPSILON: f32 = 0.1;

/// How the tracker participates in the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RacePolicy {
    /// Observational only: every strategy is probed in declaration order.
    #[default]
    TryAll,
    /// The epsilon-greedy preferred strategy is probed first each sweep;
    /// the rest still follow, so no strategy is ever pruned outright.
    TrackerGuided,
}

impl RacePolicy {
    pub fn parse(name: &str) -> Option<RacePolicy> {
        match name {
            "try-all" | "tryall" => Some(RacePolicy::TryAll),
            "tracker-guided" | "guided" => Some(RacePolicy::TrackerGuided),
            _ => None,
        }
    }
}

/// Exploration/exploitation estimator of strategy success.
///
/// One scalar value per strategy kind, nudged toward each observed reward:
/// `value += rate * (reward - value)`. A race win feeds reward 1.0 for the
/// winning kind. `preferred()` answers epsilon-greedy.
#[derive(Debug)]
pub struct StrategyTracker {
    values: Vec<(StrategyKind, f32)>,
    learning_rate: f32,
    epsilon: f32,
    rng_state: u64,
}

impl StrategyTracker {
    pub fn new(kinds: &[StrategyKind]) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9E37_79B9_7F4A_7C15);
        Self::with_seed(kinds, seed)
    }

    /// Deterministic construction for tests.
    pub fn with_seed(kinds: &[StrategyKind], seed: u64) -> Self {
        Self {
            values: kinds.iter().map(|k| (*k, 0.0f32)).collect(),
            learning_rate: LEARNING_RATE,
            epsilon: EPSILON,
            rng_state: seed | 1,
        }
    }

    pub fn value(&self, kind: StrategyKind) -> f32 {
        self.values
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    /// Update the estimate for one strategy from an observed reward.
    pub fn record(&mut self, kind: StrategyKind, reward: f32) {
        if let Some((_, value)) = self.values.iter_mut().find(|(k, _)| *k == kind) {
            *value += self.learning_rate * (reward - *value);
        }
    }

    /// Choose a strategy epsilon-greedily: usually the highest-valued kind,
    /// occasionally a uniformly random one.
    pub fn preferred(&mut self) -> StrategyKind {
        if self.next_f32() < self.epsilon {
            let i = (self.next_u64() as usize) % self.values.len();
            return self.values[i].0;
        }

        self.values
            .iter()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(k, _)| *k)
            .unwrap_or(StrategyKind::Id)
    }

    /// Probe order for one race sweep under the given policy.
    pub fn race_order(&mut self, declared: &[StrategyKind], policy: RacePolicy) -> Vec<StrategyKind> {
        match policy {
            RacePolicy::TryAll => declared.to_vec(),
            RacePolicy::TrackerGuided => {
                let first = self.preferred();
                let mut order = Vec::with_capacity(declared.len());
                if declared.contains(&first) {
                    order.push(first);
                }
                for kind in declared {
                    if *kind != first {
                        order.push(*kind);
                    }
                }
                order
            }
        }
    }

    // xorshift64*: the tracker only needs a seedable coin flip.
    fn next_u64(&mut self) -> u64 {
        let mut x = self.rng_state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.rng_state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}
