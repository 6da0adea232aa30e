use thiserror::Error;

/// Structural failures while resolving a byte source into a table.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no encoding/delimiter combination parsed the input")]
    NoEncodingDelimiterMatch,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The header row could not be mapped onto the canonical schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("required columns not found: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("load failed: {0}")]
    Load(#[from] LoadError),

    #[error("schema mapping failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
