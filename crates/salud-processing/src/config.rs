//! Configuration types for the preprocessing pipeline.
//!
//! The repair threshold and the manual rename-override table are the only
//! tunable parameters of the core pipeline; they are injected at
//! construction time so the canonicalizer and repairer stay independently
//! testable against synthetic headers and synthetic malformed rows.

use crate::schema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the preprocessing pipeline.
///
/// Use [`PreprocessorConfig::builder()`] for a fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use salud_processing::PreprocessorConfig;
///
/// let config = PreprocessorConfig::builder()
///     .repair_threshold(0.9)
///     .drop_column("frec_alcohol")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    /// A row is malformed when its missing-cell count reaches
    /// `ceil(repair_threshold * column_count)`.
    /// Default: 0.8 (80%)
    pub repair_threshold: f64,

    /// Exact-match corrections applied after generic name
    /// canonicalization. Defaults to the known domain abbreviation
    /// collisions of the survey export.
    pub rename_overrides: HashMap<String, String>,

    /// Canonical names of columns to drop unconditionally, in addition to
    /// the automatic all-missing drop. Absent names are ignored.
    /// Default: empty
    pub drop_columns: Vec<String>,

    /// Whether to run the feature-derivation stage after cleaning.
    /// Default: true
    pub run_features: bool,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            repair_threshold: 0.8,
            rename_overrides: schema::default_rename_overrides(),
            drop_columns: Vec::new(),
            run_features: true,
        }
    }
}

impl PreprocessorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PreprocessorConfigBuilder {
        PreprocessorConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.repair_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "repair_threshold".to_string(),
                value: self.repair_threshold,
            });
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },
}

/// Builder for [`PreprocessorConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PreprocessorConfigBuilder {
    repair_threshold: Option<f64>,
    rename_overrides: Option<HashMap<String, String>>,
    drop_columns: Vec<String>,
    run_features: Option<bool>,
}

impl PreprocessorConfigBuilder {
    /// Set the malformed-row detection threshold.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.8 = 80%)
    pub fn repair_threshold(mut self, threshold: f64) -> Self {
        self.repair_threshold = Some(threshold);
        self
    }

    /// Replace the whole rename-override table.
    pub fn rename_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.rename_overrides = Some(overrides);
        self
    }

    /// Add a single rename override on top of the defaults.
    pub fn rename_override(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename_overrides
            .get_or_insert_with(schema::default_rename_overrides)
            .insert(from.into(), to.into());
        self
    }

    /// Add a canonical column name to drop unconditionally.
    pub fn drop_column(mut self, name: impl Into<String>) -> Self {
        self.drop_columns.push(name.into());
        self
    }

    /// Replace the manual drop list.
    pub fn drop_columns(mut self, names: Vec<String>) -> Self {
        self.drop_columns = names;
        self
    }

    /// Enable or disable the feature-derivation stage.
    pub fn run_features(mut self, run: bool) -> Self {
        self.run_features = Some(run);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PreprocessorConfig` or an error if validation
    /// fails.
    pub fn build(self) -> Result<PreprocessorConfig, ConfigValidationError> {
        let config = PreprocessorConfig {
            repair_threshold: self.repair_threshold.unwrap_or(0.8),
            rename_overrides: self
                .rename_overrides
                .unwrap_or_else(schema::default_rename_overrides),
            drop_columns: self.drop_columns,
            run_features: self.run_features.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreprocessorConfig::default();
        assert_eq!(config.repair_threshold, 0.8);
        assert!(config.drop_columns.is_empty());
        assert!(config.run_features);
        assert_eq!(
            config.rename_overrides.get("tantefumar").map(String::as_str),
            Some("tiempo_ante_fumar")
        );
    }

    #[test]
    fn test_builder_defaults() {
        let config = PreprocessorConfig::builder().build().unwrap();
        assert_eq!(config.repair_threshold, 0.8);
        assert!(!config.rename_overrides.is_empty());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PreprocessorConfig::builder()
            .repair_threshold(0.5)
            .drop_column("frec_alcohol")
            .drop_column("frec_actifisica")
            .run_features(false)
            .build()
            .unwrap();

        assert_eq!(config.repair_threshold, 0.5);
        assert_eq!(config.drop_columns, vec!["frec_alcohol", "frec_actifisica"]);
        assert!(!config.run_features);
    }

    #[test]
    fn test_builder_extra_override_keeps_defaults() {
        let config = PreprocessorConfig::builder()
            .rename_override("ant_quirurgicos", "antecedentes_quirurgicos")
            .build()
            .unwrap();

        assert_eq!(
            config
                .rename_overrides
                .get("ant_quirurgicos")
                .map(String::as_str),
            Some("antecedentes_quirurgicos")
        );
        // Defaults are still present.
        assert_eq!(
            config.rename_overrides.get("td_examen").map(String::as_str),
            Some("tipo_examen")
        );
    }

    #[test]
    fn test_validation_invalid_threshold() {
        let result = PreprocessorConfig::builder().repair_threshold(1.5).build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = PreprocessorConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PreprocessorConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.repair_threshold, deserialized.repair_threshold);
        assert_eq!(config.rename_overrides, deserialized.rename_overrides);
    }
}
