//! Data cleaning module for the survey preprocessing pipeline.
//!
//! This module provides functionality for:
//! - Column-name canonicalization with override correction
//! - Dropping uninformative (all-missing) columns
//! - Structural repair of malformed rows
//! - Typed conversion according to the declared schema
//! - Derived age-group assignment
//! - Text normalization

mod coerce;
mod converters;
mod derive;
mod names;
mod repair;
mod text;

pub use coerce::TypeCoercer;
pub use derive::{DerivedFieldBuilder, UNKNOWN_AGE_GROUP, age_group};
pub use names::NameCanonicalizer;
pub use repair::RowRepairer;
pub use text::TextNormalizer;

use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Drop every column whose values are all missing. Returns the dropped
/// names in original order.
pub fn drop_all_null_columns(df: &mut DataFrame) -> Result<Vec<String>> {
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let empty: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| col.null_count() == col.len())
        .map(|col| col.name().to_string())
        .collect();

    if empty.is_empty() {
        debug!("no all-missing columns found");
        return Ok(Vec::new());
    }

    let to_drop: Vec<PlSmallStr> = empty.iter().map(|s| s.as_str().into()).collect();
    *df = df.drop_many(to_drop);

    info!("Dropped {} all-missing columns: {:?}", empty.len(), empty);
    Ok(empty)
}

/// Drop the named columns if present; absent names are ignored. Returns
/// the names actually dropped.
pub fn drop_columns(df: &mut DataFrame, names: &[String]) -> Result<Vec<String>> {
    let present: Vec<String> = names
        .iter()
        .filter(|name| df.column(name).is_ok())
        .cloned()
        .collect();

    if present.is_empty() {
        return Ok(Vec::new());
    }

    let to_drop: Vec<PlSmallStr> = present.iter().map(|s| s.as_str().into()).collect();
    *df = df.drop_many(to_drop);

    info!("Dropped {} configured columns: {:?}", present.len(), present);
    Ok(present)
}

/// Per-column null counts, descending, zero-null columns omitted.
pub fn null_summary(df: &DataFrame) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = df
        .get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.null_count()))
        .filter(|(_, n)| *n > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
