//! Path resolution for salesdesk state files

use std::path::PathBuf;

/// Resolves standard paths for the query log and embedding cache
#[derive(Debug, Clone)]
pub struct Paths {
    pub state_dir: PathBuf,
}

impl Paths {
    /// Paths rooted at `~/.salesdesk`
    pub fn new() -> std::io::Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self {
            state_dir: home.join(".salesdesk"),
        })
    }

    /// Paths rooted at an explicit directory
    pub fn rooted_at(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    /// Get query_log.jsonl path
    pub fn query_log_file(&self) -> PathBuf {
        self.state_dir.join("query_log.jsonl")
    }

    /// Get embeddings.db path
    pub fn embedding_cache_file(&self) -> PathBuf {
        self.state_dir.join("embeddings.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_new() {
        let paths = Paths::new().unwrap();
        assert!(paths.state_dir.ends_with(".salesdesk"));
    }

    #[test]
    fn test_rooted_paths() {
        let paths = Paths::rooted_at("/var/lib/salesdesk");
        assert!(paths.query_log_file().ends_with("salesdesk/query_log.jsonl"));
        assert!(paths.embedding_cache_file().ends_with("salesdesk/embeddings.db"));
    }
}
