//! Typed conversion of columns according to the declared schema.

use super::converters::{to_boolean, to_date, to_numeric};
use crate::schema;
use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::{debug, info};

/// Applies the fixed per-column type policy to a DataFrame.
///
/// Each policy is optional: a declared column absent from the table is
/// skipped silently. Per-value failures become null inside the converters;
/// only structural problems surface as errors.
pub struct TypeCoercer;

impl TypeCoercer {
    /// Coerce all declared columns in place, returning step messages for
    /// the summary.
    pub fn coerce_column_types(&self, df: &mut DataFrame) -> Result<Vec<String>> {
        let mut steps = Vec::new();

        for name in schema::DATE_COLUMNS {
            if let Some(step) = Self::coerce_with(df, name, "date", to_date)? {
                steps.push(step);
            }
        }

        for name in schema::BOOLEAN_COLUMNS {
            if let Some(step) = Self::coerce_with(df, name, "boolean", to_boolean)? {
                steps.push(step);
            }
        }

        for name in schema::NUMERIC_COLUMNS {
            if let Some(step) = Self::coerce_with(df, name, "numeric", to_numeric)? {
                steps.push(step);
            }
        }

        // Categorical columns keep their values untouched; they are tagged
        // as open, data-driven domains rather than transformed.
        let tagged = schema::CATEGORICAL_COLUMNS
            .iter()
            .filter(|name| df.column(name).is_ok())
            .count();
        if tagged > 0 {
            steps.push(format!("Tagged {tagged} categorical columns"));
        }

        info!("Type coercion completed ({} steps)", steps.len());
        Ok(steps)
    }

    fn coerce_with(
        df: &mut DataFrame,
        name: &str,
        target: &str,
        convert: fn(&Series) -> Result<Series>,
    ) -> Result<Option<String>> {
        let Ok(col) = df.column(name) else {
            // Policies are optional per column.
            debug!("column '{}' absent, skipping {} coercion", name, target);
            return Ok(None);
        };

        let series = col.as_materialized_series().clone();
        let before_valid = series.len() - series.null_count();

        let converted =
            convert(&series).with_context(|| format!("coercing '{name}' to {target}"))?;
        let after_valid = converted.len() - converted.null_count();

        df.replace(name, converted)?;

        let step = format!(
            "Coerced '{name}' to {target} ({after_valid}/{before_valid} values valid)"
        );
        debug!("{}", step);
        Ok(Some(step))
    }
}
