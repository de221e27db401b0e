//! Structural repair of malformed rows.
//!
//! Upstream exports occasionally collapse an entire row into its first
//! cell: a free-text field containing the delimiter breaks the producer's
//! splitting and every remaining cell arrives empty. Such rows are
//! detectable by their missing-field ratio and recoverable by re-splitting
//! the first cell with a quote-aware CSV record parser; naive splitting
//! on the delimiter would over-split embedded commas inside quoted
//! free-text fields (e.g. a profession like `"ingeniero, de sistemas"`).

use crate::types::RepairOutcome;
use anyhow::Result;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

/// Detects and repairs rows whose fields were mis-split upstream.
///
/// Repair is best-effort: a row whose re-split does not yield exactly one
/// field per column is left untouched and stays missing-heavy for
/// downstream stages.
pub struct RowRepairer {
    threshold: f64,
}

impl RowRepairer {
    /// Create a repairer with the given missing-field ratio threshold.
    ///
    /// A row is malformed when its missing-cell count reaches
    /// `ceil(threshold * column_count)`.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Indices of rows meeting the malformed threshold.
    pub fn detect(&self, df: &DataFrame) -> Result<Vec<usize>> {
        let counts = missing_counts_per_row(df)?;
        let cutoff = self.cutoff(df.width());
        Ok(counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c >= cutoff)
            .map(|(i, _)| i)
            .collect())
    }

    /// Repair malformed rows in place.
    ///
    /// For each detected row the first cell's string content is parsed as
    /// a single CSV record; on an exact field-count match the row's values
    /// are replaced positionally (empty fields become null). Affected
    /// columns are rebuilt as strings; type coercion runs afterwards and
    /// restores the declared types.
    pub fn repair(&self, df: &mut DataFrame) -> Result<RepairOutcome> {
        let width = df.width();
        if width == 0 || df.height() == 0 {
            return Ok(RepairOutcome::default());
        }

        let counts = missing_counts_per_row(df)?;
        let cutoff = self.cutoff(width);
        let malformed: Vec<usize> = counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c >= cutoff)
            .map(|(i, _)| i)
            .collect();

        if malformed.is_empty() {
            debug!("No malformed rows detected");
            return Ok(RepairOutcome::default());
        }

        let first = df.get_columns()[0]
            .as_materialized_series()
            .cast(&DataType::String)?;
        let first_str = first.str()?;

        let mut replacements: HashMap<usize, Vec<Option<String>>> = HashMap::new();
        let mut irreparable = 0usize;

        for &idx in &malformed {
            let fields = first_str.get(idx).and_then(|raw| split_record(raw, width));
            match fields {
                Some(fields) => {
                    // Repair must never increase the row's missing count.
                    let missing_after = fields.iter().filter(|f| f.is_none()).count();
                    if missing_after <= counts[idx] {
                        debug!(row = idx, "repaired row: {:?}", fields);
                        replacements.insert(idx, fields);
                    } else {
                        debug!(row = idx, "re-split left row worse, skipping");
                        irreparable += 1;
                    }
                }
                None => {
                    debug!(row = idx, "row not recoverable, leaving as-is");
                    irreparable += 1;
                }
            }
        }

        let outcome = RepairOutcome {
            detected: malformed.len(),
            repaired: replacements.len(),
            irreparable,
        };

        if replacements.is_empty() {
            info!(
                "Detected {} malformed rows, none repairable",
                outcome.detected
            );
            return Ok(outcome);
        }

        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        for (j, name) in names.iter().enumerate() {
            let series = df.column(name)?.as_materialized_series().cast(&DataType::String)?;
            let chunked = series.str()?;
            let mut values: Vec<Option<String>> = chunked
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect();
            for (&idx, fields) in &replacements {
                values[idx] = fields[j].clone();
            }
            df.replace(name, Series::new(name.as_str().into(), values))?;
        }

        info!(
            "Repaired {} of {} malformed rows ({} irreparable)",
            outcome.repaired, outcome.detected, outcome.irreparable
        );
        Ok(outcome)
    }

    fn cutoff(&self, width: usize) -> usize {
        (self.threshold * width as f64).ceil() as usize
    }
}

/// Missing cells per row: nulls, plus whitespace-only string cells.
fn missing_counts_per_row(df: &DataFrame) -> Result<Vec<usize>> {
    let mut counts = vec![0usize; df.height()];

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        if series.dtype() == &DataType::String {
            for (i, val) in series.str()?.into_iter().enumerate() {
                match val {
                    Some(v) if !v.trim().is_empty() => {}
                    _ => counts[i] += 1,
                }
            }
        } else {
            for (i, is_null) in series.is_null().into_iter().enumerate() {
                if is_null.unwrap_or(true) {
                    counts[i] += 1;
                }
            }
        }
    }

    Ok(counts)
}

/// Parse one raw string into exactly `expected` fields, respecting quoted
/// segments. Returns `None` when the record cannot be read or the field
/// count differs.
fn split_record(raw: &str, expected: usize) -> Option<Vec<Option<String>>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(trimmed.as_bytes());

    let mut record = csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => {}
        _ => return None,
    }

    if record.len() != expected {
        return None;
    }

    Some(
        record
            .iter()
            .map(|field| {
                let field = field.trim();
                if field.is_empty() {
                    None
                } else {
                    Some(field.to_string())
                }
            })
            .collect(),
    )
}
