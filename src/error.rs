// In: src/error.rs

//! This module defines the single, unified error type for the entire gspy bridge.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! The per-stage enums (`ValidationError`, `DecodeError`, `EncodeError`) carry the
//! precise diagnostics for each stage and fold into `GspyError` via `#[from]`.

use thiserror::Error;

//==================================================================================
// I. Stage-Specific Errors
//==================================================================================

/// A structural rule over the schema was violated. Fatal to initialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("parameter '{name}' declares dimensions_from, which is only legal on input vectors and matrices")]
    IllegalDimensionSource { name: String },

    #[error("parameter '{name}' needs {expected} dimension source(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("parameter '{name}' references unknown input '{reference}'")]
    UnknownReference { name: String, reference: String },

    #[error("parameter '{name}' references input '{reference}', which is not a scalar")]
    NotScalar { name: String, reference: String },

    #[error("parameter '{name}' declares both static dimensions and dimensions_from")]
    ConflictingShape { name: String },

    #[error("input '{name}' is a table, which is only supported as an output")]
    OutputOnlyKind { name: String },

    #[error("parameter name '{name}' is declared more than once")]
    DuplicateName { name: String },

    #[error("parameter '{name}' has a non-positive static dimension {value}")]
    NonPositiveDimension { name: String, value: i64 },

    #[error(
        "parameter '{name}' references scalar '{reference}', which is positioned after the variable-length field '{field}'"
    )]
    ReferenceAfterVariableField {
        name: String,
        reference: String,
        field: String,
    },
}

/// A per-call failure while converting the host's input buffer into values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("parameter '{name}' depends on scalar '{reference}', which was not harvested")]
    MissingReference { name: String, reference: String },

    #[error("input '{name}' is a table, which cannot be decoded")]
    OutputOnlyKind { name: String },

    #[error("field '{field}' carries an invalid dimension value {value}")]
    InvalidDimension { field: String, value: f64 },

    #[error("buffer underrun at offset {offset}: needed {needed} value(s), {available} available")]
    BufferUnderrun {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// A per-call failure while writing calculation results into the output buffer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("result count mismatch for {what}: expected {expected}, got {actual}")]
    ResultCountMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("output '{name}' expected a {expected} value, got {found}")]
    UnexpectedType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("value is missing required field '{0}'")]
    MissingField(String),

    #[error("field '{0}' has no backing data")]
    NullPayload(String),

    #[error("invalid table dimension count {0}: must be 1, 2, or 3")]
    InvalidDimensionCount(i64),

    #[error("table is missing its '{0}' array")]
    MissingAxis(&'static str),

    #[error("time series data must have rank 1, 2, or 3, got {0}")]
    UnsupportedRank(usize),

    #[error("time series has an empty '{0}' axis, which the record header cannot describe")]
    EmptySeriesAxis(&'static str),

    #[error("buffer overrun at offset {offset}: needed {needed} value(s), {available} available")]
    BufferOverrun {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

//==================================================================================
// II. The Unified Error
//==================================================================================

#[derive(Error, Debug)]
pub enum GspyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Input decoding failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Output encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Calculation failed: {0}")]
    Calculation(String),

    #[error("The bridge has not been initialized")]
    NotInitialized,

    #[error("Unknown method id: {0}")]
    UnknownMethod(i32),

    /// An error originating from the underlying I/O subsystem (e.g., config file not found).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while parsing the configuration.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error for Python FFI (Foreign Function Interface) operations.
    #[error("FFI operation failed: {0}")]
    FfiError(String), // PyErr doesn't impl Error, so we can't use #[from] here.
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

#[cfg(feature = "python")]
impl From<pyo3::PyErr> for GspyError {
    fn from(err: pyo3::PyErr) -> Self {
        GspyError::FfiError(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<GspyError> for pyo3::PyErr {
    fn from(err: GspyError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
