//! Error types for geocols.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for geocols operations.
pub type GeoResult<T> = Result<T, GeoError>;

/// Errors produced while reconciling a column set against the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The loaded table names the same column twice.
    #[error("Duplicate column in table: {0}")]
    DuplicateColumn(String),

    /// A column in the chosen order is not part of the reference schema.
    #[error("Column '{0}' in the chosen order is not in the reference schema")]
    NotInSchema(String),
}

/// Errors that can occur in geocols.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Reconciliation failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// The final order names a column that is neither in the table nor missing.
    #[error("Schema error: column '{0}' is neither in the table nor scheduled for creation")]
    Schema(String),

    /// A reconciliation result does not match the table it is applied to.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Position outside the current column order.
    #[error("Position {index} out of range (order has {len} entries)")]
    Position { index: usize, len: usize },

    /// Label rejected by the schema.
    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    /// Sheet or workbook error.
    #[error("Sheet error: {0}")]
    Sheet(#[from] geocols_sheet::SheetError),

    /// The export target already exists and overwriting is disabled.
    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// The written file did not match what was planned.
    #[error("Export verification failed: {0}")]
    Verify(String),

    /// Session action attempted before a workbook or sheet was loaded.
    #[error("No {0} loaded")]
    NotLoaded(&'static str),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GeoError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a verification error.
    pub fn verify(message: impl Into<String>) -> Self {
        Self::Verify(message.into())
    }
}
