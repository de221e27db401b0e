//! Text normalization for free-text and categorical columns.

use crate::utils::fold_to_ascii;
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Normalizes every text column of the table: accents decompose to their
/// base letters, the non-ASCII remainder is dropped, values are lowercased
/// and trimmed. Stringified-missing artifacts (`"nan"`) and values that
/// normalize to nothing become null.
pub struct TextNormalizer;

impl TextNormalizer {
    /// Normalize all String columns in place; returns the columns touched.
    pub fn normalize_text_columns(&self, df: &mut DataFrame) -> Result<Vec<String>> {
        let text_columns: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|col| col.dtype() == &DataType::String)
            .map(|col| col.name().to_string())
            .collect();

        for name in &text_columns {
            let series = df.column(name)?.as_materialized_series().clone();
            let chunked = series.str()?;
            let mut values: Vec<Option<String>> = Vec::with_capacity(chunked.len());

            for opt_val in chunked.into_iter() {
                values.push(opt_val.and_then(normalize_value));
            }

            df.replace(name, Series::new(name.as_str().into(), values))?;
            debug!("normalized '{}'", name);
        }

        // The ASCII fold truncates one known city name in the export;
        // restore it to its full form.
        if df.column("sede").is_ok() {
            self.fix_truncated_city(df)?;
        }

        info!("Normalized {} text columns", text_columns.len());
        Ok(text_columns)
    }

    fn fix_truncated_city(&self, df: &mut DataFrame) -> Result<()> {
        let series = df.column("sede")?.as_materialized_series().clone();
        let chunked = series.str()?;
        let values: Vec<Option<String>> = chunked
            .into_iter()
            .map(|opt| {
                opt.map(|v| {
                    if v == "bogot" {
                        "bogota".to_string()
                    } else {
                        v.to_string()
                    }
                })
            })
            .collect();

        df.replace("sede", Series::new("sede".into(), values))?;
        Ok(())
    }
}

/// Normalize one text value; `None` means missing.
///
/// The literal `"nan"` is an artifact of stringifying a missing value and
/// maps back to null, as does anything that normalizes to the empty string.
fn normalize_value(value: &str) -> Option<String> {
    let folded = fold_to_ascii(value).to_lowercase();
    let trimmed = folded.trim();
    if trimmed.is_empty() || trimmed == "nan" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn str_at(df: &DataFrame, col: &str, idx: usize) -> Option<String> {
        df.column(col)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .get(idx)
            .map(|s| s.to_string())
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value("  Médico General  "), Some("medico general".to_string()));
        assert_eq!(normalize_value("CASADO"), Some("casado".to_string()));
        assert_eq!(normalize_value("nan"), None);
        assert_eq!(normalize_value("NaN"), None);
        assert_eq!(normalize_value("   "), None);
    }

    #[test]
    fn test_normalize_value_drops_non_ascii_remainder() {
        assert_eq!(normalize_value("Bogotá"), Some("bogota".to_string()));
        assert_eq!(normalize_value("日本"), None);
    }

    #[test]
    fn test_normalize_text_columns() {
        let mut df = df![
            "profesion" => [Some("Ingeniero De Sistemas "), Some("nan"), None],
            "edad" => [Some(30.0), Some(40.0), None],
        ]
        .unwrap();

        TextNormalizer.normalize_text_columns(&mut df).unwrap();

        assert_eq!(
            str_at(&df, "profesion", 0),
            Some("ingeniero de sistemas".to_string())
        );
        assert_eq!(str_at(&df, "profesion", 1), None);
        assert_eq!(str_at(&df, "profesion", 2), None);
        // Numeric columns untouched.
        assert_eq!(df.column("edad").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_truncated_city_restored() {
        let mut df = df![
            "sede" => ["Bogot", "Cali", "bogota"],
        ]
        .unwrap();

        TextNormalizer.normalize_text_columns(&mut df).unwrap();

        assert_eq!(str_at(&df, "sede", 0), Some("bogota".to_string()));
        assert_eq!(str_at(&df, "sede", 1), Some("cali".to_string()));
        assert_eq!(str_at(&df, "sede", 2), Some("bogota".to_string()));
    }
}
