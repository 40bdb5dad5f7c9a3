use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a project dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `line` is 1-based and only set for JSON lines input.
    #[error("failed to parse dataset {path}{}: {source}", line_suffix(.line))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported dataset format: {path} (expected .json or .jsonl)")]
    UnsupportedFormat { path: PathBuf },

    #[error("duplicate project id: {id}")]
    DuplicateId { id: String },
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" (line {})", l)).unwrap_or_default()
}
