use crate::browser::element::{CandidateElement, ElementAttributes, ElementHandle};
use crate::embedding::backend::{EmbeddingBackend, cosine_similarity};

// ============================================================================
// Similarity healer — recover an element when every locator failed
// ============================================================================

/// Minimum combined score a candidate must strictly exceed to be accepted.
pub const SIMILARITY_THRESHOLD: f32 = 0.3;

/// Weight floor so neither signal can be adapted away entirely.
const MIN_SIGNAL_WEIGHT: f32 = 0.2;

/// The candidate the healer settled on.
#[derive(Debug, Clone)]
pub struct HealMatch {
    pub handle: ElementHandle,
    pub attributes: ElementAttributes,
    pub score: f32,
}

/// Blend weights for the semantic and structural scoring signals.
///
/// Starts from fixed weights and drifts toward whichever signal dominates
/// successful heals, with a floor keeping both signals alive.
#[derive(Debug, Clone)]
pub struct HealWeights {
    pub semantic: f32,
    pub structural: f32,
    semantic_wins: u32,
    structural_wins: u32,
}

impl Default for HealWeights {
    fn default() -> Self {
        Self {
            semantic: 0.7,
            structural: 0.3,
            semantic_wins: 0,
            structural_wins: 0,
        }
    }
}

impl HealWeights {
    /// Credit the signal that contributed more to an accepted heal, then
    /// rebalance the weights from the accumulated win ratio.
    pub fn record_heal(&mut self, semantic_part: f32, structural_part: f32) {
        if semantic_part >= structural_part {
            self.semantic_wins += 1;
        } else {
            self.structural_wins += 1;
        }

        let total = (self.semantic_wins + self.structural_wins) as f32;
        let semantic_share = self.semantic_wins as f32 / total;
        self.semantic = MIN_SIGNAL_WEIGHT + (1.0 - 2.0 * MIN_SIGNAL_WEIGHT) * semantic_share;
        self.structural = 1.0 - self.semantic;
    }
}

/// Scores every visible candidate against the target's recorded attributes
/// and returns the best match above threshold, or none.
///
/// All internal failures (embedding errors, empty projections, malformed
/// snapshots) normalize to "no match"; the healer never propagates.
pub struct ElementHealer {
    backend: Box<dyn EmbeddingBackend>,
    threshold: f32,
    weights: Option<HealWeights>,
}

impl ElementHealer {
    /// Pure semantic scoring (cosine similarity only).
    pub fn new(backend: Box<dyn EmbeddingBackend>) -> Self {
        Self {
            backend,
            threshold: SIMILARITY_THRESHOLD,
            weights: None,
        }
    }

    /// Blended scoring: semantic plus structural agreement, with weights
    /// that adapt across heals.
    pub fn blended(backend: Box<dyn EmbeddingBackend>) -> Self {
        Self {
            backend,
            threshold: SIMILARITY_THRESHOLD,
            weights: Some(HealWeights::default()),
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn weights(&self) -> Option<&HealWeights> {
        self.weights.as_ref()
    }

    /// Find the best-scoring candidate for the original attributes, or none.
    ///
    /// Candidates are batch-encoded in a single backend call together with
    /// the original projection: one model round-trip per heal attempt.
    pub fn heal(
        &mut self,
        original: &ElementAttributes,
        candidates: &[CandidateElement],
    ) -> Option<HealMatch> {
        let original_text = original.text_projection();
        if original_text.is_empty() || candidates.is_empty() {
            return None;
        }

        // Candidates with nothing to project cannot be scored
        let scored: Vec<(&CandidateElement, String)> = candidates
            .iter()
            .map(|c| (c, c.attributes.text_projection()))
            .filter(|(_, text)| !text.is_empty())
            .collect();
        if scored.is_empty() {
            return None;
        }

        let mut texts = Vec::with_capacity(scored.len() + 1);
        texts.push(original_text);
        texts.extend(scored.iter().map(|(_, text)| text.clone()));

        let embeddings = match self.backend.embed_batch(&texts) {
            Ok(vectors) => vectors,
            Err(e) => {
                eprintln!("Warning: embedding failed during heal: {}", e);
                return None;
            }
        };
        if embeddings.len() != texts.len() {
            return None;
        }

        let original_embedding = &embeddings[0];
        let mut best: Option<(usize, f32, f32, f32)> = None;

        for (i, (candidate, _)) in scored.iter().enumerate() {
            let semantic = cosine_similarity(original_embedding, &embeddings[i + 1]);
            let (score, structural_part) = match &self.weights {
                Some(w) => {
                    let structural = structural_similarity(original, &candidate.attributes);
                    (w.semantic * semantic + w.structural * structural, w.structural * structural)
                }
                None => (semantic, 0.0),
            };

            let semantic_part = score - structural_part;
            match best {
                Some((_, best_score, _, _)) if score <= best_score => {}
                _ => best = Some((i, score, semantic_part, structural_part)),
            }
        }

        let (idx, score, semantic_part, structural_part) = best?;
        if score <= self.threshold {
            return None;
        }

        if let Some(weights) = &mut self.weights {
            weights.record_heal(semantic_part, structural_part);
        }

        let candidate = scored[idx].0;
        Some(HealMatch {
            handle: candidate.handle.clone(),
            attributes: candidate.attributes.clone(),
            score,
        })
    }
}

/// Structural agreement between the recorded attributes and a candidate:
/// the fraction of matching signals among tag, type and name, counted only
/// where the original recorded the signal at all.
fn structural_similarity(original: &ElementAttributes, candidate: &ElementAttributes) -> f32 {
    let pairs = [
        (&original.tag, &candidate.tag),
        (&original.input_type, &candidate.input_type),
        (&original.name, &candidate.name),
    ];

    let mut considered = 0u32;
    let mut matched = 0u32;
    for (recorded, live) in pairs {
        if let Some(expected) = recorded.as_deref().filter(|v| !v.is_empty()) {
            considered += 1;
            if live.as_deref() == Some(expected) {
                matched += 1;
            }
        }
    }

    if considered == 0 {
        return 0.0;
    }
    matched as f32 / considered as f32
}
