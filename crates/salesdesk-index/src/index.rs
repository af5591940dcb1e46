//! Exact brute-force vector index over the snippet corpus

use crate::cache::{corpus_fingerprint, EmbeddingCache};
use crate::corpus::Snippet;
use crate::embed::{cosine_distance, Embedder};
use crate::error::{EmbeddingError, IndexError};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Corpus position of the snippet
    pub position: usize,
    pub distance: f32,
    pub snippet: Snippet,
}

/// Immutable after build
#[derive(Debug, Clone)]
pub struct VectorIndex {
    snippets: Vec<Snippet>,
    vectors: Vec<Vec<f32>>,
    dimension: usize,
    embedder_id: String,
}

fn check_dimensions(vectors: &[Vec<f32>]) -> Result<usize, EmbeddingError> {
    let Some(first) = vectors.first() else {
        return Ok(0);
    };
    let expected = first.len();
    for (position, v) in vectors.iter().enumerate() {
        if v.is_empty() || v.len() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                position,
                expected,
                actual: v.len(),
            });
        }
    }
    Ok(expected)
}

impl VectorIndex {
    /// Embed every snippet; all vectors must share one non-zero dimension
    pub fn build(snippets: Vec<Snippet>, embedder: &dyn Embedder) -> Result<Self, EmbeddingError> {
        let texts: Vec<&str> = snippets.iter().map(|s| s.text.as_str()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        let index = Self::from_parts(snippets, vectors, embedder.id())?;
        tracing::info!(
            snippets = index.len(),
            dimension = index.dimension,
            embedder = %index.embedder_id,
            "built vector index"
        );
        Ok(index)
    }

    /// Like [`build`](Self::build) but reuses vectors stored for an identical corpus.
    /// Cache failures are logged and never stop the build.
    pub fn build_cached(
        snippets: Vec<Snippet>,
        embedder: &dyn Embedder,
        cache: &EmbeddingCache,
    ) -> Result<Self, EmbeddingError> {
        let fingerprint = corpus_fingerprint(embedder.id(), &snippets);

        match cache.load(&fingerprint, snippets.len()) {
            Ok(Some(vectors)) => match Self::from_parts(snippets.clone(), vectors, embedder.id()) {
                Ok(index) => {
                    tracing::info!(snippets = index.len(), "reused cached embeddings");
                    return Ok(index);
                }
                Err(e) => tracing::warn!(error = %e, "cached embeddings unusable, rebuilding"),
            },
            Ok(None) => tracing::debug!("embedding cache miss"),
            Err(e) => tracing::warn!(error = %e, "embedding cache unreadable, rebuilding"),
        }

        let index = Self::build(snippets, embedder)?;
        if let Err(e) = cache.store(&fingerprint, embedder.id(), &index.vectors) {
            tracing::warn!(error = %e, "failed to write embedding cache");
        }
        Ok(index)
    }

    fn from_parts(
        snippets: Vec<Snippet>,
        vectors: Vec<Vec<f32>>,
        embedder_id: &str,
    ) -> Result<Self, EmbeddingError> {
        if vectors.len() != snippets.len() {
            return Err(EmbeddingError::Backend(format!(
                "{} vectors for {} snippets",
                vectors.len(),
                snippets.len()
            )));
        }
        let dimension = check_dimensions(&vectors)?;
        Ok(Self {
            snippets,
            vectors,
            dimension,
            embedder_id: embedder_id.to_string(),
        })
    }

    /// `min(k, len)` nearest snippets by cosine distance, ties in corpus order
    pub fn search(
        &self,
        query: &str,
        embedder: &dyn Embedder,
        k: usize,
    ) -> Result<Vec<SearchHit>, IndexError> {
        if k == 0 {
            return Err(IndexError::InvalidArgument("k must be at least 1".to_string()));
        }
        if self.snippets.is_empty() {
            return Ok(Vec::new());
        }

        let q = embedder.embed(query)?;
        if q.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                position: 0,
                expected: self.dimension,
                actual: q.len(),
            }
            .into());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_distance(&q, v)))
            .collect();
        // Stable: equal distances keep corpus order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, distance)| SearchHit {
                position,
                distance,
                snippet: self.snippets[position].clone(),
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn embedder_id(&self) -> &str {
        &self.embedder_id
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SnippetSource;
    use crate::embed::HashEmbedder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn snippet(text: &str, n: usize) -> Snippet {
        Snippet {
            text: text.to_string(),
            source: SnippetSource::Fact {
                key: "test".to_string(),
                index: n,
            },
        }
    }

    fn corpus() -> Vec<Snippet> {
        vec![
            snippet("In 2003, total sales were $3,516,979.54", 0),
            snippet("In 2004, total sales were $4,724,162.60", 1),
            snippet("Sales in France: $1,110,916.52 from 12 customers", 2),
            snippet("Product line Motorcycles generated $1,166,388.34 in sales", 3),
        ]
    }

    /// Fixed vector per known text, zero vector otherwise
    struct FixedEmbedder {
        table: Vec<(&'static str, Vec<f32>)>,
    }

    impl Embedder for FixedEmbedder {
        fn id(&self) -> &str {
            "fixed"
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(self
                .table
                .iter()
                .find(|(t, _)| *t == text)
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| vec![0.0, 0.0]))
        }
    }

    struct CountingEmbedder {
        inner: HashEmbedder,
        calls: AtomicUsize,
    }

    impl Embedder for CountingEmbedder {
        fn id(&self) -> &str {
            self.inner.id()
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed(text)
        }
    }

    #[test]
    fn test_search_finds_matching_year() {
        let embedder = HashEmbedder::default();
        let index = VectorIndex::build(corpus(), &embedder).unwrap();
        let hits = index.search("total sales in 2003", &embedder, 3).unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].position, 0);
        assert!(hits[0].distance < 0.35);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_k_larger_than_corpus() {
        let embedder = HashEmbedder::default();
        let index = VectorIndex::build(corpus(), &embedder).unwrap();
        assert_eq!(index.search("sales", &embedder, 50).unwrap().len(), 4);
    }

    #[test]
    fn test_k_zero_rejected() {
        let embedder = HashEmbedder::default();
        let index = VectorIndex::build(corpus(), &embedder).unwrap();
        assert!(matches!(
            index.search("sales", &embedder, 0),
            Err(IndexError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let embedder = FixedEmbedder {
            table: vec![
                ("a", vec![1.0, 0.0]),
                ("b", vec![0.0, 1.0]),
                ("c", vec![1.0, 0.0]),
                ("q", vec![1.0, 0.0]),
            ],
        };
        let snippets = vec![snippet("a", 0), snippet("b", 1), snippet("c", 2)];
        let index = VectorIndex::build(snippets, &embedder).unwrap();
        let hits = index.search("q", &embedder, 3).unwrap();
        let order: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(order, vec![0, 2, 1]);
    }

    #[test]
    fn test_inconsistent_dimension_rejected() {
        let embedder = FixedEmbedder {
            table: vec![("a", vec![1.0, 0.0]), ("b", vec![1.0, 0.0, 0.0])],
        };
        let err = VectorIndex::build(vec![snippet("a", 0), snippet("b", 1)], &embedder).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                position: 1,
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_empty_vector_rejected() {
        let embedder = FixedEmbedder {
            table: vec![("a", vec![])],
        };
        let err = VectorIndex::build(vec![snippet("a", 0)], &embedder).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch { actual: 0, .. }
        ));
    }

    #[test]
    fn test_empty_corpus_searches_empty() {
        let embedder = HashEmbedder::default();
        let index = VectorIndex::build(Vec::new(), &embedder).unwrap();
        assert!(index.is_empty());
        assert!(index.search("anything", &embedder, 3).unwrap().is_empty());
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = VectorIndex::build(corpus(), &HashEmbedder::new(32)).unwrap();
        let err = index.search("sales", &HashEmbedder::new(16), 1).unwrap_err();
        assert!(matches!(
            err,
            IndexError::Embedding(EmbeddingError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_build_cached_reuses_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::open(dir.path().join("embeddings.db")).unwrap();
        let embedder = CountingEmbedder {
            inner: HashEmbedder::default(),
            calls: AtomicUsize::new(0),
        };

        let first = VectorIndex::build_cached(corpus(), &embedder, &cache).unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 4);

        let second = VectorIndex::build_cached(corpus(), &embedder, &cache).unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 4);
        assert_eq!(first.vectors, second.vectors);

        // A changed corpus is a miss and gets re-embedded wholesale
        let mut changed = corpus();
        changed.pop();
        VectorIndex::build_cached(changed, &embedder, &cache).unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_build_cached_survives_broken_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.db");
        let cache = EmbeddingCache::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let embedder = HashEmbedder::default();
        let index = VectorIndex::build_cached(corpus(), &embedder, &cache).unwrap();
        assert_eq!(index.len(), 4);
    }
}
