//! Shared types for the preprocessing pipeline.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Declared semantic kind of a column in the type-policy tables.
///
/// Columns absent from every table are left as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Calendar date, parsed from a handful of accepted formats.
    Date,
    /// Boolean encoded numerically upstream (1 = true, 0 = false).
    Boolean,
    /// Integer or floating point measurement.
    Numeric,
    /// Finite-but-unenumerated domain; membership is data-driven.
    Categorical,
}

impl ColumnKind {
    /// Human-readable tag used in logs and coercion step messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        }
    }
}

/// Ordered record of raw header -> canonical name renames.
///
/// Built once at canonicalization time and immutable afterward; kept for
/// auditability only and never re-derived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnNameMapping {
    entries: Vec<(String, String)>,
}

impl ColumnNameMapping {
    /// Record a raw -> canonical rename.
    pub fn record(&mut self, raw: impl Into<String>, canonical: impl Into<String>) {
        self.entries.push((raw.into(), canonical.into()));
    }

    /// Look up the canonical name recorded for a raw header.
    pub fn canonical_for(&self, raw: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(r, _)| r == raw)
            .map(|(_, c)| c.as_str())
    }

    /// Iterate over (raw, canonical) pairs in original column order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counts produced by the malformed-row repair stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairOutcome {
    /// Rows whose missing-field ratio met the repair threshold.
    pub detected: usize,
    /// Rows successfully re-split and reassigned positionally.
    pub repaired: usize,
    /// Detected rows whose re-split did not yield the expected field
    /// count; left untouched and still missing-heavy downstream.
    pub irreparable: usize,
}

/// Result of a full pipeline run: the cleaned table plus a summary of
/// everything that was done to it.
#[derive(Debug)]
pub struct PipelineResult {
    /// The cleaned, typed, feature-augmented table.
    pub data: DataFrame,
    /// Accounting of all stages for display or JSON output.
    pub summary: PreprocessingSummary,
}

/// Human-readable summary of what the pipeline did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessingSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of rows before/after preprocessing.
    pub rows_before: usize,
    pub rows_after: usize,

    /// Number of columns before/after preprocessing (derived columns
    /// included in the after count).
    pub columns_before: usize,
    pub columns_after: usize,

    /// Raw header -> canonical name mapping recorded at canonicalization.
    pub column_mapping: ColumnNameMapping,

    /// Columns dropped because every value was missing, plus any
    /// configured manual drops.
    pub dropped_columns: Vec<String>,

    /// Malformed-row repair counts.
    pub repair: RepairOutcome,

    /// Per-column coercion step messages.
    pub coercion_steps: Vec<String>,

    /// Other actions taken, in order (drops, normalization, features).
    pub actions: Vec<String>,

    /// Warnings generated during preprocessing.
    pub warnings: Vec<String>,
}

impl PreprocessingSummary {
    pub fn add_action(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}
