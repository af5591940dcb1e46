//! SQLite store for corpus embeddings, keyed by corpus fingerprint

use crate::corpus::Snippet;
use crate::error::CacheError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// SHA-256 over the embedder id and every snippet text, in corpus order
pub fn corpus_fingerprint(embedder_id: &str, snippets: &[Snippet]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(embedder_id.as_bytes());
    for snippet in snippets {
        // Length prefix keeps ["ab", "c"] distinct from ["a", "bc"]
        hasher.update((snippet.text.len() as u64).to_le_bytes());
        hasher.update(snippet.text.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Holds vectors for a single corpus; a store replaces whatever was there
pub struct EmbeddingCache {
    db_path: PathBuf,
}

impl EmbeddingCache {
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let cache = Self { db_path };
        cache.init_db()?;
        Ok(cache)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn init_db(&self) -> Result<(), CacheError> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS corpus (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                fingerprint TEXT NOT NULL,
                embedder TEXT NOT NULL,
                dimension INTEGER NOT NULL,
                snippets INTEGER NOT NULL,
                written_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS vectors (
                position INTEGER PRIMARY KEY,
                vector BLOB NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Stored vectors, or `None` when the cache holds a different corpus
    pub fn load(
        &self,
        fingerprint: &str,
        expected_len: usize,
    ) -> Result<Option<Vec<Vec<f32>>>, CacheError> {
        let conn = Connection::open(&self.db_path)?;
        let meta: Option<(String, i64, i64)> = conn
            .query_row(
                "SELECT fingerprint, dimension, snippets FROM corpus WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((stored, dimension, count)) = meta else {
            return Ok(None);
        };
        if stored != fingerprint {
            return Ok(None);
        }
        if count as usize != expected_len {
            return Err(CacheError::Corrupt(format!(
                "fingerprint matches but {count} vectors recorded for {expected_len} snippets"
            )));
        }

        let mut stmt = conn.prepare("SELECT vector FROM vectors ORDER BY position")?;
        let rows = stmt.query_map([], |row| row.get::<_, Vec<u8>>(0))?;

        let mut vectors = Vec::with_capacity(expected_len);
        for row in rows {
            let bytes = row?;
            if bytes.len() != dimension as usize * 4 {
                return Err(CacheError::Corrupt(format!(
                    "vector {} has {} bytes, expected {}",
                    vectors.len(),
                    bytes.len(),
                    dimension * 4
                )));
            }
            vectors.push(decode_vector(&bytes));
        }
        if vectors.len() != expected_len {
            return Err(CacheError::Corrupt(format!(
                "{} vectors stored, expected {expected_len}",
                vectors.len()
            )));
        }
        Ok(Some(vectors))
    }

    /// Replace the cached corpus
    pub fn store(
        &self,
        fingerprint: &str,
        embedder_id: &str,
        vectors: &[Vec<f32>],
    ) -> Result<(), CacheError> {
        let mut conn = Connection::open(&self.db_path)?;
        let dimension = vectors.first().map_or(0, Vec::len);

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM vectors", [])?;
        tx.execute("DELETE FROM corpus", [])?;
        {
            let mut insert = tx.prepare("INSERT INTO vectors (position, vector) VALUES (?1, ?2)")?;
            for (position, vector) in vectors.iter().enumerate() {
                insert.execute(params![position as i64, encode_vector(vector)])?;
            }
        }
        tx.execute(
            "INSERT INTO corpus (id, fingerprint, embedder, dimension, snippets, written_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5)",
            params![
                fingerprint,
                embedder_id,
                dimension as i64,
                vectors.len() as i64,
                Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;

        tracing::debug!(vectors = vectors.len(), dimension, "wrote embedding cache");
        Ok(())
    }
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|x| x.to_le_bytes()).collect()
}

fn decode_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
