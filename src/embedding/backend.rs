use serde::{Deserialize, Serialize};

// ============================================================================
// Embedding backends — black-box text scoring for the healer
// ============================================================================

/// A pretrained text-embedding model consumed as a scoring function.
///
/// `embed_batch` must return one vector per input text, in input order.
/// The healer batches the original projection and every candidate into a
/// single call, so backends pay one round-trip per heal attempt.
pub trait EmbeddingBackend {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, String>;
}

/// Cosine similarity of two vectors. Zero-magnitude inputs score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

// ============================================================================
// Ollama backend
// ============================================================================

/// Embedding over a local Ollama server's batch endpoint.
pub struct OllamaEmbedding {
    pub endpoint: String,
    pub model: String,
}

impl Default for OllamaEmbedding {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/embed".to_string(),
            model: "nomic-embed-text".to_string(),
        }
    }
}

impl OllamaEmbedding {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl EmbeddingBackend for OllamaEmbedding {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, String> {
        let request = EmbedRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| format!("Embedding request failed: {}", e))?;

        let parsed: EmbedResponse = response
            .json()
            .map_err(|e| format!("Invalid embedding response: {}", e))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(format!(
                "Embedding count mismatch: sent {} texts, got {} vectors",
                texts.len(),
                parsed.embeddings.len()
            ));
        }

        Ok(parsed.embeddings)
    }
}

// ============================================================================
// Hashed backend (offline fallback; no model server required)
// ============================================================================

/// Deterministic bag-of-tokens embedding: each lowercased token hashes into
/// a fixed bucket and bumps its count. Cosine similarity then reflects
/// token overlap. Coarser than a real model but dependency-free, which is
/// what CI and the test suite need.
pub struct HashedEmbedding {
    dims: usize,
}

pub const HASHED_EMBEDDING_DIMS: usize = 256;

impl Default for HashedEmbedding {
    fn default() -> Self {
        Self {
            dims: HASHED_EMBEDDING_DIMS,
        }
    }
}

impl HashedEmbedding {
    pub fn with_dims(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    fn bucket(&self, token: &str) -> usize {
        use sha1::{Digest, Sha1};

        let mut hasher = Sha1::new();
        hasher.update(token.as_bytes());
        let digest = hasher.finalize();
        (u16::from_be_bytes([digest[0], digest[1]]) as usize) % self.dims
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[self.bucket(token)] += 1.0;
        }
        vector
    }
}

impl EmbeddingBackend for HashedEmbedding {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, String> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
