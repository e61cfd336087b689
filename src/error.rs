//! Error types for ingestion and analysis.

use thiserror::Error;

/// Errors raised while reading a delimited-text series.
///
/// Malformed *rows* are not errors: they are dropped and counted in the
/// [`crate::ingest::IngestReport`]. These variants cover problems with the
/// source as a whole.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input had no header line.
    #[error("missing header line")]
    MissingHeader,

    /// A column declared in the schema is absent from the header.
    #[error("column '{column}' not found in header: {header}")]
    MissingColumn {
        /// The declared column that could not be resolved.
        column: String,
        /// The header line as read, for context.
        header: String,
    },

    /// Every data row was dropped as malformed.
    #[error("no parseable rows in '{name}' ({dropped} dropped)")]
    NoRows {
        /// Series name.
        name: String,
        /// Number of rows dropped while parsing.
        dropped: usize,
    },
}

/// Errors raised by the analysis pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A channel name was not present in the aligned table.
    #[error("unknown channel '{0}'")]
    UnknownChannel(String),

    /// Two channels that must share a grid have mismatched lengths.
    #[error("channel length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first operand.
        left: usize,
        /// Length of the second operand.
        right: usize,
    },

    /// The sweep was configured with a non-positive step.
    #[error("sweep step must be positive, got {0}")]
    InvalidSweepStep(i64),
}
