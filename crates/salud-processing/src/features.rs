//! Derived indicator columns computed from the cleaned table.
//!
//! Each rule is a pure function of already-coerced columns. Missing never
//! qualifies and never propagates into a flag: the boolean columns are
//! always definite. A rule whose input column is absent from the table is
//! skipped with a warning, mirroring the optional-policy behavior of the
//! coercion stage.

use anyhow::Result;
use polars::prelude::*;
use tracing::{info, warn};

/// The three diagnosis code columns, in priority order.
const DIAGNOSIS_COLUMNS: [&str; 3] = ["diagnostico_1", "diagnostico_2", "diagnostico_3"];

/// Boolean health-condition columns feeding the occupational-risk flag.
const WORK_RISK_COLUMNS: [&str; 3] = [
    "enfermedades_del_ojo_y_sus_anexos",
    "signos_y_hallazgos_anormales_clinicos_y_de_laboratorio",
    "enfermedades_del_sistema_osteomuscular_y_del_tejido_conectivo",
];

/// Derives indicator columns from a cleaned table.
pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Compute all indicator columns in place, returning the actions taken.
    pub fn add_features(&self, df: &mut DataFrame) -> Result<Vec<String>> {
        let mut actions = Vec::new();

        self.add_is_over_50(df, &mut actions)?;
        self.add_diagnosis_flags(df, &mut actions)?;
        self.add_work_disease_risk(df, &mut actions)?;
        self.add_high_absence(df, &mut actions)?;
        self.add_main_diagnosis_group(df, &mut actions)?;

        info!("Feature engineering added {} columns", actions.len());
        Ok(actions)
    }

    /// `es_mayor_50`: age is non-missing and strictly above 50.
    fn add_is_over_50(&self, df: &mut DataFrame, actions: &mut Vec<String>) -> Result<()> {
        let Some(ages) = numeric_values(df, "edad")? else {
            warn!("column 'edad' absent, skipping es_mayor_50");
            return Ok(());
        };

        let flags: Vec<bool> = ages.iter().map(|a| matches!(a, Some(v) if *v > 50.0)).collect();
        df.with_column(Series::new("es_mayor_50".into(), flags))?;
        actions.push("added es_mayor_50".to_string());
        Ok(())
    }

    /// `tiene_diagnosticos` and `multiples_diagnosticos`: count the
    /// diagnosis columns holding a non-missing value other than
    /// "unknown" (case-insensitive).
    fn add_diagnosis_flags(&self, df: &mut DataFrame, actions: &mut Vec<String>) -> Result<()> {
        let mut diagnosis_cols = Vec::new();
        for name in DIAGNOSIS_COLUMNS {
            if let Some(values) = string_values(df, name)? {
                diagnosis_cols.push(values);
            }
        }

        if diagnosis_cols.is_empty() {
            warn!("no diagnosis columns present, skipping diagnosis flags");
            return Ok(());
        }

        let height = df.height();
        let mut has_any = Vec::with_capacity(height);
        let mut has_multiple = Vec::with_capacity(height);

        for row in 0..height {
            let qualifying = diagnosis_cols
                .iter()
                .filter(|col| is_qualifying_diagnosis(col[row].as_deref()))
                .count();
            has_any.push(qualifying >= 1);
            has_multiple.push(qualifying > 1);
        }

        df.with_column(Series::new("tiene_diagnosticos".into(), has_any))?;
        df.with_column(Series::new("multiples_diagnosticos".into(), has_multiple))?;
        actions.push("added tiene_diagnosticos".to_string());
        actions.push("added multiples_diagnosticos".to_string());
        Ok(())
    }

    /// `riesgo_enfermedades_laborales`: any of the three condition
    /// columns is true. Missing contributes nothing.
    fn add_work_disease_risk(&self, df: &mut DataFrame, actions: &mut Vec<String>) -> Result<()> {
        let mut condition_cols = Vec::new();
        for name in WORK_RISK_COLUMNS {
            if let Some(values) = boolean_values(df, name)? {
                condition_cols.push(values);
            }
        }

        if condition_cols.is_empty() {
            warn!("no condition columns present, skipping riesgo_enfermedades_laborales");
            return Ok(());
        }

        let height = df.height();
        let flags: Vec<bool> = (0..height)
            .map(|row| {
                condition_cols
                    .iter()
                    .any(|col| col[row].unwrap_or(false))
            })
            .collect();

        df.with_column(Series::new("riesgo_enfermedades_laborales".into(), flags))?;
        actions.push("added riesgo_enfermedades_laborales".to_string());
        Ok(())
    }

    /// `dias_perdidos_alto`: missed days non-missing and strictly above 10.
    fn add_high_absence(&self, df: &mut DataFrame, actions: &mut Vec<String>) -> Result<()> {
        let Some(days) = numeric_values(df, "dias_perdidos")? else {
            warn!("column 'dias_perdidos' absent, skipping dias_perdidos_alto");
            return Ok(());
        };

        let flags: Vec<bool> = days.iter().map(|d| matches!(d, Some(v) if *v > 10.0)).collect();
        df.with_column(Series::new("dias_perdidos_alto".into(), flags))?;
        actions.push("added dias_perdidos_alto".to_string());
        Ok(())
    }

    /// `diagnostico_principal_categoria`: first character (upper-cased) of
    /// the primary diagnosis code; "NA" when missing or "unknown".
    fn add_main_diagnosis_group(&self, df: &mut DataFrame, actions: &mut Vec<String>) -> Result<()> {
        let Some(codes) = string_values(df, "diagnostico_1")? else {
            warn!("column 'diagnostico_1' absent, skipping diagnostico_principal_categoria");
            return Ok(());
        };

        let groups: Vec<String> = codes
            .iter()
            .map(|code| main_diagnosis_group(code.as_deref()))
            .collect();

        df.with_column(Series::new("diagnostico_principal_categoria".into(), groups))?;
        actions.push("added diagnostico_principal_categoria".to_string());
        Ok(())
    }
}

/// A diagnosis qualifies when present and not the "unknown" placeholder.
fn is_qualifying_diagnosis(code: Option<&str>) -> bool {
    match code {
        Some(v) => !v.trim().eq_ignore_ascii_case("unknown"),
        None => false,
    }
}

fn main_diagnosis_group(code: Option<&str>) -> String {
    match code {
        Some(v) if !v.trim().eq_ignore_ascii_case("unknown") => v
            .trim()
            .to_uppercase()
            .chars()
            .next()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "NA".to_string()),
        _ => "NA".to_string(),
    }
}

/// Column values as f64, or `None` when the column is absent.
fn numeric_values(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<f64>>>> {
    let Ok(col) = df.column(name) else {
        return Ok(None);
    };
    let series = col.as_materialized_series().cast(&DataType::Float64)?;
    Ok(Some(series.f64()?.into_iter().collect()))
}

/// Column values as strings, or `None` when the column is absent.
fn string_values(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<String>>>> {
    let Ok(col) = df.column(name) else {
        return Ok(None);
    };
    let series = col.as_materialized_series().cast(&DataType::String)?;
    Ok(Some(
        series
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
    ))
}

/// Column values as booleans, or `None` when the column is absent.
///
/// Tolerates columns whose coercion was skipped: non-boolean sources go
/// through the numeric encoding (1 -> true, 0 -> false, else missing).
fn boolean_values(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<bool>>>> {
    let Ok(col) = df.column(name) else {
        return Ok(None);
    };
    let series = col.as_materialized_series();
    if series.dtype() == &DataType::Boolean {
        return Ok(Some(series.bool()?.into_iter().collect()));
    }

    let numeric = series.cast(&DataType::Float64);
    match numeric {
        Ok(numeric) => Ok(Some(
            numeric
                .f64()?
                .into_iter()
                .map(|v| match v {
                    Some(x) if x == 1.0 => Some(true),
                    Some(x) if x == 0.0 => Some(false),
                    _ => None,
                })
                .collect(),
        )),
        Err(_) => Ok(Some(vec![None; series.len()])),
    }
}
