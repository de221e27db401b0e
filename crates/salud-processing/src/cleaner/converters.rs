//! Type conversion functions for the coercion stage.
//!
//! All converters are error-tolerant: a value that cannot be coerced to
//! the declared type becomes null, never an error.

use crate::utils::parse_numeric_string;
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Date formats accepted by the survey export, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Datetime formats occasionally produced by the export; the time part is
/// discarded.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Check if a DataType is numeric (integer or float).
#[inline]
pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Convert a series to Float64, parsing strings leniently.
pub(crate) fn to_numeric(series: &Series) -> Result<Series> {
    if is_numeric_dtype(series.dtype()) {
        return Ok(series.cast(&DataType::Float64)?);
    }

    let str_series = series.cast(&DataType::String)?;
    let chunked = str_series.str()?;
    let mut result: Vec<Option<f64>> = Vec::with_capacity(chunked.len());

    for opt_val in chunked.into_iter() {
        result.push(opt_val.and_then(parse_numeric_string));
    }

    Ok(Series::new(series.name().clone(), result))
}

/// Convert a series to Boolean via numeric coercion: 1 -> true, 0 -> false,
/// anything else (including already-missing) -> null.
///
/// Values are never interpreted as booleans directly from text.
pub(crate) fn to_boolean(series: &Series) -> Result<Series> {
    if series.dtype() == &DataType::Boolean {
        return Ok(series.clone());
    }

    let numeric = to_numeric(series)?;
    let chunked = numeric.f64()?;
    let mut result: Vec<Option<bool>> = Vec::with_capacity(chunked.len());

    for opt_val in chunked.into_iter() {
        let mapped = match opt_val {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        };
        result.push(mapped);
    }

    Ok(Series::new(series.name().clone(), result))
}

/// Convert a string series to a calendar Date; unparseable values become
/// null.
pub(crate) fn to_date(series: &Series) -> Result<Series> {
    if series.dtype() == &DataType::Date {
        return Ok(series.clone());
    }

    let str_series = series.cast(&DataType::String)?;
    let chunked = str_series.str()?;
    let epoch = NaiveDate::default(); // 1970-01-01
    let mut days: Vec<Option<i32>> = Vec::with_capacity(chunked.len());

    for opt_val in chunked.into_iter() {
        let parsed = opt_val.and_then(|v| parse_date(v.trim()));
        days.push(parsed.map(|d| (d - epoch).num_days() as i32));
    }

    let int_series = Series::new(series.name().clone(), days);
    Ok(int_series.cast(&DataType::Date)?)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_null_at(series: &Series, idx: usize) -> bool {
        matches!(series.get(idx).unwrap(), AnyValue::Null)
    }

    fn get_bool_at(series: &Series, idx: usize) -> bool {
        match series.get(idx).unwrap() {
            AnyValue::Boolean(b) => b,
            other => panic!("expected boolean, got {other:?}"),
        }
    }

    // ========================================================================
    // to_numeric() tests
    // ========================================================================

    #[test]
    fn test_to_numeric_basic() {
        let series = Series::new("edad".into(), &["30", "41.5", "60"]);
        let result = to_numeric(&series).unwrap();

        assert_eq!(result.dtype(), &DataType::Float64);
        assert_eq!(result.get(0).unwrap().try_extract::<f64>().unwrap(), 30.0);
        assert_eq!(result.get(1).unwrap().try_extract::<f64>().unwrap(), 41.5);
    }

    #[test]
    fn test_to_numeric_invalid_becomes_null() {
        let series = Series::new("edad".into(), &["treinta", "", "nan", "42"]);
        let result = to_numeric(&series).unwrap();

        assert!(is_null_at(&result, 0));
        assert!(is_null_at(&result, 1));
        assert!(is_null_at(&result, 2));
        assert_eq!(result.get(3).unwrap().try_extract::<f64>().unwrap(), 42.0);
    }

    #[test]
    fn test_to_numeric_preserves_nulls() {
        let series = Series::new("x".into(), &[Some("1.5"), None, Some("3")]);
        let result = to_numeric(&series).unwrap();

        assert!(is_null_at(&result, 1));
        assert_eq!(result.null_count(), 1);
    }

    #[test]
    fn test_to_numeric_already_numeric() {
        let series = Series::new("x".into(), &[1i64, 2, 3]);
        let result = to_numeric(&series).unwrap();
        assert_eq!(result.dtype(), &DataType::Float64);
        assert_eq!(result.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_to_numeric_with_thousands_separator() {
        let series = Series::new("x".into(), &["1,000", "2,500.5"]);
        let result = to_numeric(&series).unwrap();
        assert_eq!(result.get(0).unwrap().try_extract::<f64>().unwrap(), 1000.0);
        assert_eq!(result.get(1).unwrap().try_extract::<f64>().unwrap(), 2500.5);
    }

    // ========================================================================
    // to_boolean() tests
    // ========================================================================

    #[test]
    fn test_to_boolean_numeric_encoding() {
        let series = Series::new("fuma".into(), &["1", "0", "1.0", "0.0"]);
        let result = to_boolean(&series).unwrap();

        assert_eq!(result.dtype(), &DataType::Boolean);
        assert!(get_bool_at(&result, 0));
        assert!(!get_bool_at(&result, 1));
        assert!(get_bool_at(&result, 2));
        assert!(!get_bool_at(&result, 3));
    }

    #[test]
    fn test_to_boolean_rejects_text_tokens() {
        // Booleans come only from the numeric encoding, never from text.
        let series = Series::new("fuma".into(), &["true", "false", "si", "no", "2"]);
        let result = to_boolean(&series).unwrap();

        assert_eq!(result.null_count(), 5);
    }

    #[test]
    fn test_to_boolean_preserves_nulls() {
        let series = Series::new("fuma".into(), &[Some("1"), None, Some("0")]);
        let result = to_boolean(&series).unwrap();

        assert!(get_bool_at(&result, 0));
        assert!(is_null_at(&result, 1));
        assert!(!get_bool_at(&result, 2));
    }

    #[test]
    fn test_to_boolean_already_boolean() {
        let series = Series::new("fuma".into(), &[true, false]);
        let result = to_boolean(&series).unwrap();
        assert_eq!(result.dtype(), &DataType::Boolean);
        assert!(get_bool_at(&result, 0));
    }

    // ========================================================================
    // to_date() tests
    // ========================================================================

    #[test]
    fn test_to_date_iso() {
        let series = Series::new("fecha_de_examen".into(), &["2023-05-17", "1970-01-01"]);
        let result = to_date(&series).unwrap();

        assert_eq!(result.dtype(), &DataType::Date);
        assert_eq!(result.null_count(), 0);
        // 1970-01-01 is day zero.
        assert_eq!(result.get(1).unwrap(), AnyValue::Date(0));
    }

    #[test]
    fn test_to_date_alternate_formats() {
        let series = Series::new("f".into(), &["17/05/2023", "2023/05/17", "17-05-2023"]);
        let result = to_date(&series).unwrap();
        assert_eq!(result.null_count(), 0);

        // All three spell the same day.
        let d0 = result.get(0).unwrap();
        assert_eq!(result.get(1).unwrap(), d0);
        assert_eq!(result.get(2).unwrap(), d0);
    }

    #[test]
    fn test_to_date_datetime_discards_time() {
        let series = Series::new("f".into(), &["2023-05-17 08:30:00"]);
        let result = to_date(&series).unwrap();
        assert_eq!(result.null_count(), 0);
    }

    #[test]
    fn test_to_date_invalid_becomes_null() {
        let series = Series::new("f".into(), &["mayo 17", "2023-13-45", "", "2023-05-17"]);
        let result = to_date(&series).unwrap();

        assert_eq!(result.null_count(), 3);
        assert!(!is_null_at(&result, 3));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("").is_none());
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("2023-02-30").is_none());
        assert!(parse_date("2023-05-17").is_some());
    }
}
