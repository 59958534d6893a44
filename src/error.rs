use std::path::PathBuf;
use thiserror::Error;

/// Failures the import refuses to continue past
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("output {0:?} already exists; use --force or delete it first")]
    OutputExists(PathBuf),

    #[error("database {0:?} does not exist")]
    OutputMissing(PathBuf),

    #[error("unhandled input: missing {missing:?}, unexpected {unexpected:?}")]
    FileSetMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),

    #[error("{file} line {line}: expected {expected} fields, found {found}")]
    ColumnCount {
        file: String,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("malformed CSV quoting at line {line}: {reason}")]
    MalformedQuoting { line: u64, reason: &'static str },

    #[error("manifest count for {table} is not an integer: {value:?}")]
    InvalidManifestCount { table: String, value: String },

    #[error("table {table} is loaded before its parent {parent}")]
    UnorderedLoad { table: String, parent: String },
}
