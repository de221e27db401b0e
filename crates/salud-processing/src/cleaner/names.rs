//! Column-name canonicalization.
//!
//! Raw survey headers arrive with accents, camelCase compounds, stray
//! quotes and inconsistent separators. Every header is folded to a
//! canonical snake_case identifier through a fixed sequence of steps, then
//! a manual override table corrects the known abbreviation collisions that
//! the generic algorithm cannot disambiguate.

use crate::error::{PreprocessingError, Result};
use crate::types::ColumnNameMapping;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info};

static QUOTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']"#).expect("valid regex"));
static NON_ALNUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Canonicalizes raw column headers and records the rename mapping.
///
/// The override table is injected at construction; overrides are applied
/// by exact string match only, after the generic algorithm.
pub struct NameCanonicalizer {
    overrides: HashMap<String, String>,
    mapping: ColumnNameMapping,
}

impl NameCanonicalizer {
    /// Create a canonicalizer with a custom override table.
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self {
            overrides,
            mapping: ColumnNameMapping::default(),
        }
    }

    /// Create a canonicalizer with the default survey override table.
    pub fn with_defaults() -> Self {
        Self::new(crate::schema::default_rename_overrides())
    }

    /// Canonicalize a single raw header.
    ///
    /// Pure and deterministic; does not record the mapping. Idempotent for
    /// names that are already canonical.
    pub fn canonicalize(&self, raw: &str) -> String {
        let name = deunicode::deunicode(raw);
        let name = insert_case_boundaries(&name);
        let name = name.to_lowercase();
        let name = QUOTES_RE.replace_all(&name, "");
        let name = NON_ALNUM_RE.replace_all(&name, "_");
        let name = name.trim_matches('_').to_string();

        match self.overrides.get(&name) {
            Some(corrected) => corrected.clone(),
            None => name,
        }
    }

    /// Rename every column of `df` to its canonical form.
    ///
    /// Records the raw -> canonical mapping for auditing. Fails with
    /// [`PreprocessingError::NameCollision`] if two distinct raw headers
    /// collapse to the same canonical name: proceeding would silently
    /// overwrite a column.
    pub fn apply(&mut self, df: &mut DataFrame) -> Result<()> {
        let raw_names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let mut seen: HashMap<String, String> = HashMap::with_capacity(raw_names.len());
        let mut canonical_names = Vec::with_capacity(raw_names.len());

        for raw in &raw_names {
            let canonical = self.canonicalize(raw);
            if let Some(first) = seen.get(&canonical) {
                return Err(PreprocessingError::NameCollision {
                    canonical,
                    first: first.clone(),
                    second: raw.clone(),
                });
            }
            seen.insert(canonical.clone(), raw.clone());
            self.mapping.record(raw.clone(), canonical.clone());
            if raw != &canonical {
                debug!("renamed column '{}' -> '{}'", raw, canonical);
            }
            canonical_names.push(canonical);
        }

        df.set_column_names(canonical_names)?;
        info!("Canonicalized {} column names", raw_names.len());
        Ok(())
    }

    /// The raw -> canonical mapping recorded by [`apply`](Self::apply).
    pub fn mapping(&self) -> &ColumnNameMapping {
        &self.mapping
    }
}

/// Insert a `_` at each lowercase->uppercase transition ("aB" -> "a_B")
/// and at each uppercase-run->uppercase+lowercase transition
/// ("ABc" -> "A_Bc"), splitting camelCase compounds into word tokens
/// before case folding.
fn insert_case_boundaries(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let lower_to_upper = prev.is_ascii_lowercase() && c.is_ascii_uppercase();
            let run_to_word = prev.is_ascii_uppercase()
                && c.is_ascii_uppercase()
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if lower_to_upper || run_to_word {
                out.push('_');
            }
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn canonicalizer() -> NameCanonicalizer {
        NameCanonicalizer::with_defaults()
    }

    #[test]
    fn test_case_boundaries() {
        assert_eq!(insert_case_boundaries("aB"), "a_B");
        assert_eq!(insert_case_boundaries("ABc"), "A_Bc");
        assert_eq!(insert_case_boundaries("FechaNacimiento"), "Fecha_Nacimiento");
        assert_eq!(insert_case_boundaries("IMCInterpretacion"), "IMC_Interpretacion");
        assert_eq!(insert_case_boundaries("already_snake"), "already_snake");
    }

    #[test]
    fn test_canonicalize_accents_and_case() {
        let c = canonicalizer();
        assert_eq!(c.canonicalize("Género"), "genero");
        assert_eq!(c.canonicalize("FechaNacimiento"), "fecha_nacimiento");
        assert_eq!(c.canonicalize("Días Perdidos"), "dias_perdidos");
        assert_eq!(c.canonicalize("Profesión"), "profesion");
    }

    #[test]
    fn test_canonicalize_quotes_and_separators() {
        let c = canonicalizer();
        assert_eq!(c.canonicalize("\"Edad\""), "edad");
        assert_eq!(c.canonicalize("  estado--civil  "), "estado_civil");
        assert_eq!(c.canonicalize("horas___sueno"), "horas_sueno");
        assert_eq!(c.canonicalize("__area__"), "area");
    }

    #[test]
    fn test_canonicalize_applies_overrides_last() {
        let c = canonicalizer();
        // Generic folding of the raw export header collides with a
        // different field; the override restores the intended name.
        assert_eq!(
            c.canonicalize("SignosVitales_IMCinterpretacion"),
            "signos_vitales_imc_interpretacion"
        );
        assert_eq!(c.canonicalize("TANTEFUMAR"), "tiempo_ante_fumar");
        assert_eq!(c.canonicalize("DX1_Examen"), "diagnostico_1");
        assert_eq!(c.canonicalize("TD_Examen"), "tipo_examen");
    }

    #[test]
    fn test_canonicalize_fully_cased_imc_header() {
        let c = canonicalizer();
        assert_eq!(
            c.canonicalize("SignosVitales_IMCInterpretacion"),
            "signos_vitales_imc_interpretacion"
        );
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let c = canonicalizer();
        for raw in [
            "Género",
            "FechaNacimiento",
            "SignosVitales_IMCinterpretacion",
            "DX1_Examen",
            "\"Días Perdidos\"",
        ] {
            let once = c.canonicalize(raw);
            assert_eq!(c.canonicalize(&once), once, "not idempotent for '{raw}'");
        }
    }

    #[test]
    fn test_apply_renames_and_records_mapping() {
        let mut df = df![
            "Edad" => ["30", "41"],
            "Género" => ["M", "F"],
            "DX1_Examen" => ["J45", "unknown"],
        ]
        .unwrap();

        let mut c = canonicalizer();
        c.apply(&mut df).unwrap();

        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["edad", "genero", "diagnostico_1"]);

        assert_eq!(c.mapping().canonical_for("Género"), Some("genero"));
        assert_eq!(c.mapping().canonical_for("DX1_Examen"), Some("diagnostico_1"));
        assert_eq!(c.mapping().len(), 3);
    }

    #[test]
    fn test_apply_detects_collision() {
        let mut df = df![
            "Edad" => ["30"],
            "edad " => ["31"],
        ]
        .unwrap();

        let mut c = canonicalizer();
        let err = c.apply(&mut df).unwrap_err();
        assert!(matches!(err, PreprocessingError::NameCollision { .. }));
        assert!(err.is_schema_defect());
    }

    #[test]
    fn test_production_header_set_has_no_collisions() {
        // Raw headers as they appear in the survey export; pairwise
        // distinct canonical names must come out the other side.
        let headers = [
            "Edad",
            "Género",
            "FechaNacimiento",
            "Fecha de Examen",
            "Sede",
            "Cédula",
            "Estado Civil",
            "Escolaridad",
            "Profesión",
            "Estrato",
            "Área",
            "NDependientes",
            "Fuma",
            "TANTEFUMAR",
            "TABSTIFUMAR",
            "BebeAlcohol",
            "TBEBER",
            "TABSTIALCOHOL",
            "ActiFisica",
            "Siesta",
            "HorasSueno",
            "DuracionSiesta",
            "SignosVitales_Pulso",
            "SignosVitales_Talla",
            "SignosVitales_Peso",
            "SignosVitales_IMC",
            "SignosVitales_IMCinterpretacion",
            "TD_Examen",
            "DX1_Examen",
            "DX2_Examen",
            "DX3_Examen",
            "Atenciones",
            "Días Perdidos",
        ];

        let c = canonicalizer();
        let canonical: Vec<String> = headers.iter().map(|h| c.canonicalize(h)).collect();
        for (i, a) in canonical.iter().enumerate() {
            for b in &canonical[i + 1..] {
                assert_ne!(a, b, "collision between canonical names");
            }
        }
    }
}
