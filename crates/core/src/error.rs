//! Error types for benchtrack-core

use thiserror::Error;

/// Result type alias for benchtrack-core operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A single input line exceeded the per-line buffer limit.
    #[error("line too long (limit {limit} bytes)")]
    LineTooLong { limit: usize },

    #[error("invalid goos line: {line}")]
    InvalidSectionHeader { line: String },

    #[error("invalid benchmark format: expected at least 3 fields: {line:?}")]
    InvalidBenchmarkFormat { line: String },

    #[error("{name}: could not parse runs: {value:?}")]
    InvalidIterationCount { name: String, value: String },

    #[error("{name}: invalid metric format: {metric:?}")]
    InvalidMetricFormat { name: String, metric: String },

    #[error("{name}: could not parse metric value: {metric:?}")]
    InvalidMetricValue { name: String, metric: String },

    #[error("number of suites mismatch: {before} vs {after}")]
    SuiteCountMismatch { before: usize, after: usize },

    #[error("suite package mismatch at index {index}: {before} vs {after}")]
    SuitePackageMismatch {
        index: usize,
        before: String,
        after: String,
    },

    #[error("no runs found in {path}")]
    EmptyInput { path: String },

    #[error("failed to read file: {path}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file: {path}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
