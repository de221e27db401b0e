//! Deterministic derived columns computed from coerced values.

use super::converters::to_numeric;
use anyhow::Result;
use polars::prelude::*;
use tracing::{info, warn};

/// Label for a missing age.
pub const UNKNOWN_AGE_GROUP: &str = "Unknown";

/// Bucket an age in years into its half-open decade interval.
///
/// Buckets are contiguous and exhaustive over non-missing input, with
/// inclusive-lower/exclusive-upper boundaries; a missing age maps to
/// [`UNKNOWN_AGE_GROUP`].
pub fn age_group(age: Option<f64>) -> &'static str {
    match age {
        None => UNKNOWN_AGE_GROUP,
        Some(edad) if edad < 20.0 => "0-19",
        Some(edad) if edad < 30.0 => "20-29",
        Some(edad) if edad < 40.0 => "30-39",
        Some(edad) if edad < 50.0 => "40-49",
        Some(edad) if edad < 60.0 => "50-59",
        Some(_) => "60+",
    }
}

/// Computes derived columns on the cleaned table.
pub struct DerivedFieldBuilder;

impl DerivedFieldBuilder {
    /// Write `grupo_etareo` from `edad`, replacing any existing column of
    /// that name. Skipped with a warning when `edad` is absent.
    pub fn assign_age_group(&self, df: &mut DataFrame) -> Result<()> {
        let Ok(col) = df.column("edad") else {
            warn!("column 'edad' absent, skipping age-group derivation");
            return Ok(());
        };

        let ages = to_numeric(col.as_materialized_series())?;
        let chunked = ages.f64()?;
        let labels: Vec<&'static str> = chunked.into_iter().map(age_group).collect();

        df.with_column(Series::new("grupo_etareo".into(), labels))?;
        info!("Assigned age groups for {} rows", df.height());
        Ok(())
    }
}
