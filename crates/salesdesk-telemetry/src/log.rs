//! Append-only query log shared by concurrent resolution pipelines

use crate::io::{append_jsonl, read_jsonl};
use crate::types::QueryLogEntry;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

/// Serialization formats for [`QueryLog::export`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Jsonl,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "jsonl" | "ndjson" => Ok(ExportFormat::Jsonl),
            other => Err(format!("unknown export format '{other}' (expected csv or jsonl)")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("export buffer was not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("failed to flush export buffer: {0}")]
    Flush(String),
}

const EXPORT_HEADER: [&str; 4] = ["timestamp", "query", "strategy", "response"];

/// Query log with an optional JSONL sink on disk.
///
/// The in-memory sequence is authoritative for [`export`](Self::export);
/// the sink only mirrors it. Appends hold the lock across the disk write so
/// lines from concurrent requests never interleave.
#[derive(Debug, Default)]
pub struct QueryLog {
    entries: Mutex<Vec<QueryLogEntry>>,
    sink: Option<PathBuf>,
}

impl QueryLog {
    /// Log that lives only for the process lifetime
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Log mirrored to a JSONL file; existing entries are loaded first
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let existing: Vec<QueryLogEntry> = read_jsonl(&path)?;
        tracing::debug!(path = %path.display(), entries = existing.len(), "opened query log");
        Ok(Self {
            entries: Mutex::new(existing),
            sink: Some(path),
        })
    }

    /// Log mirrored to `path` without loading the history already there
    pub fn append_only(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            sink: Some(path.into()),
        }
    }

    /// Record an entry. Never fails: a sink write error is reported and the
    /// entry is still kept in memory.
    pub fn append(&self, entry: QueryLogEntry) {
        let mut entries = self.lock();
        if let Some(path) = &self.sink {
            if let Err(e) = append_jsonl(path, &entry) {
                tracing::warn!(path = %path.display(), "query log write failed: {e}");
            }
        }
        entries.push(entry);
    }

    pub fn entries(&self) -> Vec<QueryLogEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Serialize every entry, oldest first
    pub fn export(&self, format: ExportFormat) -> Result<String, ExportError> {
        let entries = self.lock();
        match format {
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                writer.write_record(EXPORT_HEADER)?;
                for entry in entries.iter() {
                    writer.write_record([
                        entry.timestamp.to_rfc3339().as_str(),
                        entry.query.as_str(),
                        entry.strategy.as_str(),
                        entry.response.as_str(),
                    ])?;
                }
                let bytes = writer
                    .into_inner()
                    .map_err(|e| ExportError::Flush(e.to_string()))?;
                Ok(String::from_utf8(bytes)?)
            }
            ExportFormat::Jsonl => {
                let mut out = String::new();
                for entry in entries.iter() {
                    out.push_str(&serde_json::to_string(entry)?);
                    out.push('\n');
                }
                Ok(out)
            }
        }
    }

    /// Human-readable transcript
    pub fn render_text(&self) -> String {
        let entries = self.lock();
        if entries.is_empty() {
            return "No query logs found.".to_string();
        }

        let mut out = String::new();
        for entry in entries.iter() {
            out.push_str(&format!(
                "{} | [{}] Query: {}\nResponse: {}\n{}\n",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.strategy,
                entry.query,
                entry.response,
                "=".repeat(50)
            ));
        }
        out
    }

    fn lock(&self) -> MutexGuard<'_, Vec<QueryLogEntry>> {
        // A panic while holding the lock cannot leave a half-written entry in
        // the vector, so the data is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StrategyTag;
    use std::sync::Arc;

    #[test]
    fn test_append_and_export_csv() {
        let log = QueryLog::in_memory();
        log.append(QueryLogEntry::new(
            "top customer",
            StrategyTag::Insight,
            "Euro Shopping Channel, with $912,294.11",
        ));
        log.append(QueryLogEntry::new("why?", StrategyTag::LlmFailed, "unavailable"));

        let csv = log.export(ExportFormat::Csv).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), EXPORT_HEADER.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "top customer");
        assert_eq!(&rows[0][2], "insight");
        assert_eq!(&rows[0][3], "Euro Shopping Channel, with $912,294.11");
        assert_eq!(&rows[1][2], "llm_failed");
    }

    #[test]
    fn test_export_jsonl_is_line_per_entry() {
        let log = QueryLog::in_memory();
        log.append(QueryLogEntry::new("a", StrategyTag::Semantic, "line one\nline two"));
        log.append(QueryLogEntry::new("b", StrategyTag::Llm, "answer"));

        let out = log.export(ExportFormat::Jsonl).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: QueryLogEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.response, "line one\nline two");
    }

    #[test]
    fn test_open_reloads_persisted_entries() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("query_log.jsonl");

        {
            let log = QueryLog::open(&path).unwrap();
            log.append(QueryLogEntry::new("q1", StrategyTag::Insight, "r1"));
            log.append(QueryLogEntry::new("q2", StrategyTag::Llm, "r2"));
        }

        let reopened = QueryLog::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.entries()[1].query, "q2");
    }

    #[test]
    fn test_open_tolerates_corrupt_history() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("query_log.jsonl");
        std::fs::write(&path, b"{\"bad\":1}\n\xc3\n").unwrap();

        let log = QueryLog::open(&path).unwrap();
        assert!(log.is_empty());

        log.append(QueryLogEntry::new("q", StrategyTag::Insight, "r"));
        let reopened = QueryLog::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.entries()[0].query, "q");
    }

    #[test]
    fn test_append_only_skips_history_but_persists() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("query_log.jsonl");
        QueryLog::open(&path)
            .unwrap()
            .append(QueryLogEntry::new("old", StrategyTag::Llm, "r"));

        let log = QueryLog::append_only(&path);
        assert!(log.is_empty());
        log.append(QueryLogEntry::new("new", StrategyTag::Semantic, "r"));
        assert_eq!(log.len(), 1);
        assert_eq!(QueryLog::open(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_append_survives_unwritable_sink() {
        let temp = tempfile::TempDir::new().unwrap();
        // A directory cannot be opened for appending
        let log = QueryLog {
            entries: Mutex::new(Vec::new()),
            sink: Some(temp.path().to_path_buf()),
        };

        log.append(QueryLogEntry::new("q", StrategyTag::Insight, "r"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_concurrent_appends_are_all_recorded() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("query_log.jsonl");
        let log = Arc::new(QueryLog::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        log.append(QueryLogEntry::new(
                            format!("thread {t} query {i}"),
                            StrategyTag::Semantic,
                            "x".repeat(200),
                        ));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.len(), 200);
        let on_disk: Vec<QueryLogEntry> = read_jsonl(&path).unwrap();
        assert_eq!(on_disk.len(), 200);
    }

    #[test]
    fn test_render_text() {
        let log = QueryLog::in_memory();
        assert_eq!(log.render_text(), "No query logs found.");

        log.append(QueryLogEntry::new("sales by territory", StrategyTag::Insight, "EMEA"));
        let text = log.render_text();
        assert!(text.contains("[insight] Query: sales by territory"));
        assert!(text.contains("Response: EMEA"));
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("jsonl".parse::<ExportFormat>(), Ok(ExportFormat::Jsonl));
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
