//! Custom error types for the health-survey preprocessing pipeline.
//!
//! Value-level problems (an unparseable cell, an irreparable row) are never
//! errors: they are absorbed as nulls or counters by design. The variants
//! here cover structural defects (name collisions, empty input) and the
//! ambient failure modes of the surrounding machinery (IO, polars, CSV).
//!
//! Errors serialize as `{code, message}` so downstream consumers can
//! branch on the code without parsing the display string.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the preprocessing pipeline.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// The input table has no rows or no columns.
    #[error("Input table is empty")]
    EmptyInput,

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two distinct raw headers canonicalized to the same name and no
    /// override disambiguates them. Fatal: a silent overwrite would
    /// corrupt the schema.
    #[error(
        "Raw headers '{first}' and '{second}' both canonicalize to '{canonical}' and no override disambiguates them"
    )]
    NameCollision {
        canonical: String,
        first: String,
        second: String,
    },

    /// Data cleaning stage failed structurally.
    #[error("Failed to clean data: {0}")]
    CleaningFailed(String),

    /// Type coercion failed structurally (not a per-value parse failure).
    #[error("Failed to coerce column '{column}' to {target_type}: {reason}")]
    CoercionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// Feature derivation failed.
    #[error("Failed to derive features: {0}")]
    FeatureFailed(String),

    /// Internal error (e.g., invariant violation).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// CSV record parsing error wrapper.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for downstream handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "EMPTY_INPUT",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NameCollision { .. } => "NAME_COLLISION",
            Self::CleaningFailed(_) => "CLEANING_FAILED",
            Self::CoercionFailed { .. } => "COERCION_FAILED",
            Self::FeatureFailed(_) => "FEATURE_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Csv(_) => "CSV_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a schema defect that must block the pipeline.
    pub fn is_schema_defect(&self) -> bool {
        matches!(self, Self::NameCollision { .. })
            || matches!(self, Self::WithContext { source, .. } if source.is_schema_defect())
    }
}

/// Serialize implementation producing `{code, message}` structs.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}
