//! Error types for the training engine.

use thiserror::Error;

/// Errors raised by model construction, optimization and data ingestion.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A layer or cell was constructed with a zero-sized dimension
    #[error("invalid dimension for {name}: {value} (must be at least 1)")]
    InvalidDimension { name: &'static str, value: usize },

    /// A gradient or parameter shape does not match the initialized shape
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// The optimizer was stepped before `initialize` was called
    #[error("optimizer update called before initialize")]
    NotInitialized,

    /// The optimizer was initialized more than once
    #[error("optimizer already initialized")]
    AlreadyInitialized,

    /// Adam bias correction is undefined for step 0
    #[error("optimizer step index must be at least 1, got {0}")]
    InvalidStep(usize),

    /// Exploration rate outside the unit interval
    #[error("epsilon must lie in [0, 1], got {0}")]
    InvalidEpsilon(f64),

    /// The trainer was given an empty record table
    #[error("record table is empty")]
    EmptyTable,

    /// A CSV row could not be parsed into a record
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// CSV-level read failure
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem failure while reading the record table
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
