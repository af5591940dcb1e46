//! Text embedders: the local MiniLM model and an offline hashing fallback

use crate::error::EmbeddingError;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::{Mutex, OnceLock};

static HASH_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

/// Text to vector; every vector from one embedder has the same length
pub trait Embedder: Send + Sync {
    /// Stable identifier, part of the embedding cache key
    fn id(&self) -> &str;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// `fastembed` AllMiniLML6V2 (384 dimensions)
pub struct FastEmbedder {
    // embed() takes &mut self
    model: Mutex<fastembed::TextEmbedding>,
}

impl FastEmbedder {
    /// Loads the model, downloading it on first use
    pub fn try_new() -> Result<Self, EmbeddingError> {
        let model = fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(false),
        )
        .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;
        tracing::info!("loaded AllMiniLML6V2 embedding model");
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl Embedder for FastEmbedder {
    fn id(&self) -> &str {
        "fastembed/all-minilm-l6-v2"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Backend("model returned no vectors".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut model = self
            .model
            .lock()
            .map_err(|_| EmbeddingError::Backend("embedding model lock poisoned".to_string()))?;
        let inputs: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        model
            .embed(inputs, None)
            .map_err(|e| EmbeddingError::Backend(e.to_string()))
    }
}

/// Words too common in the snippets to tell them apart
const HASH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "by", "did", "do", "for", "from", "had", "has", "have",
    "how", "in", "is", "it", "me", "of", "on", "or", "show", "tell", "that", "the", "to", "was",
    "were", "what", "which", "who", "with",
];

/// Signed feature hashing over word tokens, L2-normalized.
/// Deterministic and offline; retrieval quality is lexical only.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    id: String,
}

impl HashEmbedder {
    pub const DEFAULT_DIMENSION: usize = 1024;

    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            id: format!("hash/{dimension}"),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSION)
    }
}

/// Words plus amounts such as `3,516,979.54` kept whole
fn hash_tokens(text: &str) -> Vec<String> {
    let re = HASH_TOKEN_RE.get_or_init(|| Regex::new(r"[a-z0-9]+(?:[.,][0-9]+)*").unwrap());
    re.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|t| !HASH_STOP_WORDS.contains(&t.as_str()))
        .collect()
}

impl Embedder for HashEmbedder {
    fn id(&self) -> &str {
        &self.id
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0f32; self.dimension];
        for token in hash_tokens(text) {
            let digest = Sha256::digest(token.as_bytes());
            let bucket = u64::from_le_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6],
                digest[7],
            ]) % self.dimension as u64;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket as usize] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(vector)
    }
}

/// `1 - cos(a, b)`; a zero vector is at distance 1 from everything
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a < 1e-8 || norm_b < 1e-8 {
        1.0
    } else {
        1.0 - dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_distance() {
        let a = vec![1.0, 0.0, 0.0];
        assert!(cosine_distance(&a, &a).abs() < 1e-6);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_distance(&a, &c) - 1.0).abs() < 1e-6);

        let opposite = vec![-1.0, 0.0, 0.0];
        assert!((cosine_distance(&a, &opposite) - 2.0).abs() < 1e-6);

        assert_eq!(cosine_distance(&a, &[0.0, 0.0, 0.0]), 1.0);
    }

    #[test]
    fn test_hash_tokens_keep_amounts_whole() {
        assert_eq!(
            hash_tokens("In 2003, total sales were $3,516,979.54"),
            vec!["2003", "total", "sales", "3,516,979.54"]
        );
    }

    #[test]
    fn test_hash_embedder_is_deterministic_and_normalized() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("sales in France").unwrap();
        let b = embedder.embed("sales in France").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hash_embedder_ranks_shared_words_closer() {
        let embedder = HashEmbedder::default();
        let query = embedder.embed("total sales 2003").unwrap();
        let near = embedder.embed("In 2003, total sales were $10.00").unwrap();
        let far = embedder.embed("Motorcycles shipped to Norway").unwrap();
        assert!(cosine_distance(&query, &near) < cosine_distance(&query, &far));
    }

    #[test]
    fn test_hash_embedder_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(8);
        let v = embedder.embed("the of and").unwrap();
        assert_eq!(v, vec![0.0; 8]);
    }

    #[test]
    fn test_ids_differ_by_dimension() {
        assert_ne!(HashEmbedder::new(8).id(), HashEmbedder::new(16).id());
    }
}
