mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{decoy_attrs, renamed_submit_attrs};
use locator_healing::browser::element::{CandidateElement, ElementAttributes, ElementHandle};
use locator_healing::embedding::backend::{
    EmbeddingBackend, HashedEmbedding, cosine_similarity,
};
use locator_healing::engine::healer::{ElementHealer, SIMILARITY_THRESHOLD};

// ============================================================================
// Helper builders
// ============================================================================

/// Backend returning pre-scripted vectors in call order, so tests control
/// every similarity exactly. Also counts batch calls.
struct VecBackend {
    vectors: Vec<Vec<f32>>,
    calls: Rc<Cell<usize>>,
}

impl VecBackend {
    fn new(vectors: Vec<Vec<f32>>) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (
            Self {
                vectors,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl EmbeddingBackend for VecBackend {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, String> {
        self.calls.set(self.calls.get() + 1);
        if texts.len() != self.vectors.len() {
            return Err(format!(
                "scripted backend expected {} texts, got {}",
                self.vectors.len(),
                texts.len()
            ));
        }
        Ok(self.vectors.clone())
    }
}

struct FailingBackend;

impl EmbeddingBackend for FailingBackend {
    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, String> {
        Err("model server unreachable".to_string())
    }
}

fn candidate(token: &str, attributes: ElementAttributes) -> CandidateElement {
    CandidateElement {
        handle: ElementHandle::new(token),
        attributes,
    }
}

fn labeled(token: &str, text: &str) -> CandidateElement {
    candidate(
        token,
        ElementAttributes {
            text: Some(text.to_string()),
            ..Default::default()
        },
    )
}

fn original() -> ElementAttributes {
    ElementAttributes {
        id: Some("submit-btn".to_string()),
        class_name: Some("submit primary".to_string()),
        xpath: Some("//button[@id='submit-btn']".to_string()),
        ..Default::default()
    }
}

// ============================================================================
// 1. Text projection — fixed field order, empty fields skipped
// ============================================================================

#[test]
fn text_projection_order_and_skipping() {
    let attrs = ElementAttributes {
        id: Some("save".to_string()),
        tag: Some("button".to_string()),
        class_name: None,
        text: Some("  Save  ".to_string()),
        input_type: Some("".to_string()),
        name: Some("save-form".to_string()),
        xpath: None,
    };
    assert_eq!(attrs.text_projection(), "save button Save save-form");
}

// ============================================================================
// 2. Cosine similarity basics
// ============================================================================

#[test]
fn cosine_similarity_behavior() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
}

// ============================================================================
// 3. Arg-max candidate wins
// ============================================================================

#[test]
fn heal_picks_argmax() {
    let (backend, _) = VecBackend::new(vec![
        vec![1.0, 0.0], // original
        vec![0.6, 0.8], // cos 0.6
        vec![0.9, 0.43589], // cos 0.9
    ]);
    let mut healer = ElementHealer::new(Box::new(backend));

    let matched = healer
        .heal(
            &original(),
            &[labeled("near", "close match"), labeled("best", "closest match")],
        )
        .unwrap();
    assert_eq!(matched.handle, ElementHandle::new("best"));
    assert!(matched.score > 0.8);
}

// ============================================================================
// 4. Nothing above threshold — no match
// ============================================================================

#[test]
fn heal_rejects_below_threshold() {
    let (backend, _) = VecBackend::new(vec![
        vec![1.0, 0.0],
        vec![0.2, 0.9798], // cos 0.2
        vec![0.0, 1.0],    // cos 0.0
    ]);
    let mut healer = ElementHealer::new(Box::new(backend));

    let matched = healer.heal(
        &original(),
        &[labeled("weak", "vaguely similar"), labeled("off", "unrelated")],
    );
    assert!(matched.is_none());
}

// ============================================================================
// 5. One batch call per heal attempt
// ============================================================================

#[test]
fn heal_embeds_in_one_batch() {
    let (backend, calls) = VecBackend::new(vec![
        vec![1.0, 0.0],
        vec![0.9, 0.43589],
        vec![0.8, 0.6],
        vec![0.7, 0.71414],
    ]);
    let mut healer = ElementHealer::new(Box::new(backend));

    healer
        .heal(
            &original(),
            &[
                labeled("a", "first"),
                labeled("b", "second"),
                labeled("c", "third"),
            ],
        )
        .unwrap();
    assert_eq!(calls.get(), 1);
}

// ============================================================================
// 6. Backend failure normalizes to no match
// ============================================================================

#[test]
fn heal_swallows_backend_errors() {
    let mut healer = ElementHealer::new(Box::new(FailingBackend));
    let matched = healer.heal(&original(), &[labeled("x", "anything")]);
    assert!(matched.is_none());
}

// ============================================================================
// 7. Empty original projection — no match
// ============================================================================

#[test]
fn heal_requires_original_projection() {
    let mut healer = ElementHealer::new(Box::new(HashedEmbedding::default()));
    let matched = healer.heal(&ElementAttributes::default(), &[labeled("x", "anything")]);
    assert!(matched.is_none());
}

// ============================================================================
// 8. Candidates with empty projections are skipped
// ============================================================================

#[test]
fn heal_skips_unprojectable_candidates() {
    let mut healer = ElementHealer::new(Box::new(HashedEmbedding::default()));
    let matched = healer.heal(
        &original(),
        &[candidate("blank", ElementAttributes::default())],
    );
    assert!(matched.is_none());
}

// ============================================================================
// 9. Empty snapshot — no match
// ============================================================================

#[test]
fn heal_empty_snapshot() {
    let mut healer = ElementHealer::new(Box::new(HashedEmbedding::default()));
    assert!(healer.heal(&original(), &[]).is_none());
}

// ============================================================================
// 10. Hashed backend: renamed element beats decoys
// ============================================================================

#[test]
fn hashed_backend_finds_renamed_element() {
    let mut healer = ElementHealer::new(Box::new(HashedEmbedding::default()));

    let matched = healer
        .heal(
            &original(),
            &[
                candidate("decoy", decoy_attrs()),
                candidate("renamed", renamed_submit_attrs()),
            ],
        )
        .unwrap();
    assert_eq!(matched.handle, ElementHandle::new("renamed"));
    assert!(matched.score > SIMILARITY_THRESHOLD);
}

// ============================================================================
// 11. Hashed backend: a page of unrelated elements heals nothing
// ============================================================================

#[test]
fn hashed_backend_rejects_unrelated_page() {
    let mut healer = ElementHealer::new(Box::new(HashedEmbedding::default()));

    let matched = healer.heal(
        &original(),
        &[
            candidate("decoy", decoy_attrs()),
            labeled("copy", "Welcome to your dashboard"),
        ],
    );
    assert!(matched.is_none());
}

// ============================================================================
// 12. Blended scoring: structural agreement breaks a semantic tie
// ============================================================================

#[test]
fn blended_structural_breaks_tie() {
    // Both candidates score identically on semantics; only one matches
    // the recorded tag and type.
    let (backend, _) = VecBackend::new(vec![
        vec![1.0, 0.0],
        vec![0.7, 0.71414],
        vec![0.7, 0.71414],
    ]);
    let mut healer = ElementHealer::blended(Box::new(backend));

    let recorded = ElementAttributes {
        id: Some("submit-btn".to_string()),
        tag: Some("button".to_string()),
        input_type: Some("submit".to_string()),
        ..Default::default()
    };
    let structural_match = ElementAttributes {
        id: Some("btn-submit".to_string()),
        tag: Some("button".to_string()),
        input_type: Some("submit".to_string()),
        ..Default::default()
    };
    let structural_miss = ElementAttributes {
        id: Some("submit-link".to_string()),
        tag: Some("a".to_string()),
        ..Default::default()
    };

    let matched = healer
        .heal(
            &recorded,
            &[
                candidate("miss", structural_miss),
                candidate("hit", structural_match),
            ],
        )
        .unwrap();
    assert_eq!(matched.handle, ElementHandle::new("hit"));
}

// ============================================================================
// 13. Blended weights adapt after a heal
// ============================================================================

#[test]
fn blended_weights_adapt() {
    let (backend, _) = VecBackend::new(vec![vec![1.0, 0.0], vec![0.9, 0.43589]]);
    let mut healer = ElementHealer::blended(Box::new(backend));

    let before = healer.weights().unwrap().semantic;
    healer
        .heal(&original(), &[labeled("close", "almost identical")])
        .unwrap();
    let after = healer.weights().unwrap().semantic;

    // Semantic carried this heal, so its weight grows
    assert!(after > before);
}
