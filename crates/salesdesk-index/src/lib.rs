//! Snippet corpus and exact cosine-distance vector index

mod cache;
mod corpus;
mod embed;
mod error;
mod index;

pub use cache::{corpus_fingerprint, EmbeddingCache};
pub use corpus::{build_corpus, CorpusOptions, Snippet, SnippetSource};
pub use embed::{cosine_distance, Embedder, FastEmbedder, HashEmbedder};
pub use error::{CacheError, EmbeddingError, IndexError};
pub use index::{SearchHit, VectorIndex};
