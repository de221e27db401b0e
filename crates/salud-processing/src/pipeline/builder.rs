//! Main preprocessing pipeline.
//!
//! Orchestrates the cleaning stages in a fixed order over one in-memory
//! table. Earlier stages change the schema later stages see (renames,
//! drops), so stages are not interleavable; each runs to completion
//! before the next begins and the table is moved between them.

use crate::cleaner::{
    self, DerivedFieldBuilder, NameCanonicalizer, RowRepairer, TextNormalizer, TypeCoercer,
};
use crate::config::PreprocessorConfig;
use crate::error::{PreprocessingError, Result};
use crate::features::FeatureEngineer;
use crate::types::{PipelineResult, PreprocessingSummary};
use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The preprocessing pipeline.
///
/// Use [`Pipeline::builder()`] to create one with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use salud_processing::{Pipeline, PreprocessorConfig};
///
/// let result = Pipeline::builder()
///     .config(PreprocessorConfig::builder().repair_threshold(0.8).build()?)
///     .build()?
///     .process(df)?;
///
/// println!("{} rows cleaned", result.data.height());
/// ```
pub struct Pipeline {
    config: PreprocessorConfig,
    coercer: TypeCoercer,
    derive: DerivedFieldBuilder,
    text: TextNormalizer,
    features: FeatureEngineer,
}

// The pipeline owns no shared state and can be moved to a worker thread.
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Process a DataFrame through the preprocessing pipeline.
    ///
    /// # Errors
    ///
    /// Fails on an empty input table, on a column-name collision not
    /// covered by an override, and on structural polars failures.
    /// Per-value problems never abort: they are absorbed as nulls and
    /// accounted for in the summary.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        if df.height() == 0 || df.width() == 0 {
            return Err(PreprocessingError::EmptyInput);
        }

        let start_time = Instant::now();
        info!("Starting preprocessing pipeline...");

        let mut summary = PreprocessingSummary {
            rows_before: df.height(),
            columns_before: df.width(),
            ..Default::default()
        };

        let mut df = df;

        // Step 1: Canonicalize column names. Collisions are fatal here,
        // before any column content is touched.
        info!("Step 1: Canonicalizing column names...");
        let mut canonicalizer = NameCanonicalizer::new(self.config.rename_overrides.clone());
        canonicalizer.apply(&mut df)?;
        summary.column_mapping = canonicalizer.mapping().clone();

        // Step 2: Drop uninformative columns (all-missing, plus any
        // configured manual drops).
        info!("Step 2: Dropping uninformative columns...");
        let mut dropped = cleaner::drop_all_null_columns(&mut df)
            .map_err(|e| PreprocessingError::CleaningFailed(e.to_string()))?;
        dropped.extend(
            cleaner::drop_columns(&mut df, &self.config.drop_columns)
                .map_err(|e| PreprocessingError::CleaningFailed(e.to_string()))?,
        );
        if !dropped.is_empty() {
            summary.add_action(format!("dropped columns: {dropped:?}"));
        }
        summary.dropped_columns = dropped;

        if df.width() == 0 {
            return Err(PreprocessingError::EmptyInput);
        }

        for (name, nulls) in cleaner::null_summary(&df) {
            debug!("missing values in '{}': {}", name, nulls);
        }

        // Step 3: Repair malformed rows. Must run after the drops (the
        // threshold is relative to the surviving width) and before
        // coercion (repaired values are raw strings).
        info!("Step 3: Repairing malformed rows...");
        let repairer = RowRepairer::new(self.config.repair_threshold);
        summary.repair = repairer
            .repair(&mut df)
            .map_err(|e| PreprocessingError::CleaningFailed(e.to_string()))?;
        if summary.repair.irreparable > 0 {
            summary.add_warning(format!(
                "{} malformed rows could not be repaired and remain missing-heavy",
                summary.repair.irreparable
            ));
            warn!(
                "{} malformed rows left unrepaired",
                summary.repair.irreparable
            );
        }

        // Step 4: Coerce declared column types.
        info!("Step 4: Coercing column types...");
        summary.coercion_steps = self.coercer.coerce_column_types(&mut df).map_err(|e| {
            PreprocessingError::CoercionFailed {
                column: "dataset".to_string(),
                target_type: "declared schema".to_string(),
                reason: e.to_string(),
            }
        })?;

        // Step 5: Derive the age group from the coerced age.
        info!("Step 5: Assigning age groups...");
        self.derive
            .assign_age_group(&mut df)
            .map_err(|e| PreprocessingError::CleaningFailed(e.to_string()))?;

        // Step 6: Normalize text columns.
        info!("Step 6: Normalizing text columns...");
        let normalized = self
            .text
            .normalize_text_columns(&mut df)
            .map_err(|e| PreprocessingError::CleaningFailed(e.to_string()))?;
        summary.add_action(format!("normalized {} text columns", normalized.len()));

        // Step 7: Derive indicator columns.
        if self.config.run_features {
            info!("Step 7: Deriving indicator columns...");
            let actions = self
                .features
                .add_features(&mut df)
                .map_err(|e| PreprocessingError::FeatureFailed(e.to_string()))?;
            for action in actions {
                summary.add_action(action);
            }
        } else {
            info!("Step 7: Skipping feature derivation (disabled)");
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        summary.rows_after = df.height();
        summary.columns_after = df.width();

        info!(
            "Pipeline complete: {} rows x {} columns in {}ms",
            summary.rows_after, summary.columns_after, summary.duration_ms
        );

        Ok(PipelineResult { data: df, summary })
    }
}

/// Builder for creating a [`Pipeline`] instance.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PreprocessorConfig>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PreprocessorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            coercer: TypeCoercer,
            derive: DerivedFieldBuilder,
            text: TextNormalizer,
            features: FeatureEngineer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config.repair_threshold, 0.8);
        assert!(pipeline.config.run_features);
    }

    #[test]
    fn test_pipeline_builder_with_config() {
        let config = PreprocessorConfig::builder()
            .repair_threshold(0.9)
            .run_features(false)
            .build()
            .unwrap();

        let pipeline = Pipeline::builder().config(config).build().unwrap();

        assert_eq!(pipeline.config.repair_threshold, 0.9);
        assert!(!pipeline.config.run_features);
    }

    #[test]
    fn test_empty_input_fails_visibly() {
        let df = DataFrame::empty();
        let pipeline = Pipeline::builder().build().unwrap();

        let err = pipeline.process(df).unwrap_err();
        assert!(matches!(err, PreprocessingError::EmptyInput));
    }

    #[test]
    fn test_collision_blocks_pipeline() {
        let df = df![
            "Edad" => ["30"],
            "edad " => ["31"],
        ]
        .unwrap();

        let pipeline = Pipeline::builder().build().unwrap();
        let err = pipeline.process(df).unwrap_err();
        assert!(err.is_schema_defect());
    }
}
