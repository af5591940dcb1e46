use std::path::PathBuf;

/// Errors raised while loading or querying the dataset
#[derive(Debug, thiserror::Error)]
pub enum DataFormatError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine text encoding: {0}")]
    Encoding(String),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}
