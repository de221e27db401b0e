//! Shared utilities for the preprocessing pipeline.

use unicode_normalization::UnicodeNormalization;

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 4] = [',', '$', '%', ' '];

/// Textual artifacts of stringified missing values.
pub const MISSING_MARKERS: [&str; 5] = ["nan", "na", "n/a", "null", "none"];

/// Clean a string for numeric parsing by removing formatting characters.
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Check if a string is a stringified-missing marker.
pub fn is_missing_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    MISSING_MARKERS.iter().any(|&marker| lower == marker)
}

/// Try to parse a string as a numeric value (f64).
///
/// Handles thousands separators and stray formatting; missing markers and
/// empty strings yield `None`.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || is_missing_marker(trimmed) {
        return None;
    }
    let cleaned = clean_numeric_string(trimmed);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

// =============================================================================
// Unicode Folding Utilities
// =============================================================================

/// Decompose to NFKD and keep only the ASCII remainder.
///
/// This matches the normalization applied to text cells: accents decompose
/// into base letter + combining mark and the mark is dropped; characters
/// with no ASCII decomposition disappear entirely.
pub fn fold_to_ascii(s: &str) -> String {
    s.nfkd().filter(char::is_ascii).collect()
}

// =============================================================================
// Tests
// =============================================================================
