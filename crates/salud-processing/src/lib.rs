//! Health-Survey Preprocessing Library
//!
//! A Polars-based normalization and repair pipeline for raw tabular
//! health-survey exports.
//!
//! # Overview
//!
//! Survey exports arrive with inconsistent column naming, structurally
//! broken rows, mixed types and free text. This library turns them into a
//! clean, typed, feature-augmented table:
//!
//! - **Name canonicalization**: deterministic snake_case headers with a
//!   manual override table for known abbreviation collisions
//! - **Row repair**: rows collapsed into their first cell by upstream
//!   mis-splitting are re-split with a quote-aware CSV parser
//! - **Type coercion**: a fixed per-column policy (date, boolean, numeric,
//!   categorical) with error-tolerant conversion; invalid values become
//!   missing, never failures
//! - **Text normalization**: accent folding, ASCII stripping, case and
//!   whitespace normalization
//! - **Feature derivation**: age buckets and boolean/categorical
//!   indicator columns over the cleaned data
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use salud_processing::{Pipeline, PreprocessorConfig};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .with_infer_schema_length(Some(0)) // everything starts as a string
//!     .try_into_reader_with_file_path(Some("raw.csv".into()))?
//!     .finish()?;
//!
//! let result = Pipeline::builder()
//!     .config(
//!         PreprocessorConfig::builder()
//!             .repair_threshold(0.8)
//!             .build()?,
//!     )
//!     .build()?
//!     .process(df)?;
//!
//! println!("repaired {} rows", result.summary.repair.repaired);
//! println!("{:?}", result.data.shape());
//! ```
//!
//! # Error philosophy
//!
//! Per-value problems (an unparseable date, a non-numeric age) are
//! absorbed as nulls. Structural defects such as two headers collapsing
//! to the same canonical name, or an empty input table, fail fast and
//! block the pipeline; see [`error::PreprocessingError`].

pub mod cleaner;
pub mod config;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{
    DerivedFieldBuilder, NameCanonicalizer, RowRepairer, TextNormalizer, TypeCoercer, age_group,
};
pub use config::{ConfigValidationError, PreprocessorConfig, PreprocessorConfigBuilder};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use features::FeatureEngineer;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use types::{
    ColumnKind, ColumnNameMapping, PipelineResult, PreprocessingSummary, RepairOutcome,
};
