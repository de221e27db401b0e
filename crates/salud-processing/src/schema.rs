//! Static column schema for the health-survey export.
//!
//! The per-column type policies and the rename-override table are plain
//! configuration data, not scattered conditionals: one dispatcher in the
//! coercer walks these tables, and each table can be unit-tested on its
//! own. Canonical names here are the post-canonicalization forms.

use crate::types::ColumnKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Columns parsed to calendar dates.
pub const DATE_COLUMNS: [&str; 2] = ["fecha_nacimiento", "fecha_de_examen"];

/// Columns holding numerically-encoded booleans (1 = true, 0 = false).
pub const BOOLEAN_COLUMNS: [&str; 11] = [
    "enfermedades_del_ojo_y_sus_anexos",
    "sintomas",
    "signos_y_hallazgos_anormales_clinicos_y_de_laboratorio",
    "no_clasificados_en_otra_parte",
    "enfermedades_del_sistema_osteomuscular_y_del_tejido_conectivo",
    "enfermedades_endocrinas",
    "fuma",
    "bebealcohol",
    "ante_alcohol",
    "actifisica",
    "siesta",
];

/// Columns parsed to numeric measurements.
pub const NUMERIC_COLUMNS: [&str; 19] = [
    "edad",
    "ndependientes",
    "horas_sueno",
    "duracion_siesta",
    "signos_vitales_tensionarterialsistolica",
    "signos_vitales_tensionarterialdiastolica",
    "signos_vitales_pulso",
    "signos_vitales_frecuenciacardiaca",
    "signos_vitales_frecuenciarespiratoria",
    "signos_vitales_talla",
    "signos_vitales_peso",
    "signos_vitales_imc",
    "tiempo_ante_fumar",
    "tiempo_abstinencia_fumar",
    "tiempo_beber",
    "tiempo_abstinencia_alcohol",
    "tact_fisica",
    "atenciones",
    "dias_perdidos",
];

/// Columns belonging to finite-but-unenumerated categorical domains.
/// Membership is data-driven; the values themselves are not transformed
/// at coercion time.
pub const CATEGORICAL_COLUMNS: [&str; 25] = [
    "genero",
    "grupo_etareo",
    "sede",
    "cedula",
    "hemo",
    "estado_civil",
    "escolaridad",
    "profesion",
    "estrato",
    "area",
    "t_fumar",
    "ante_fumar",
    "tipo_actifisica",
    "tipo_examen",
    "signos_vitales_dominancia",
    "signos_vitales_contextura",
    "signos_vitales_tensionarterialsistolica_interpretacion",
    "signos_vitales_tensionarterialdiastolica_interpretacion",
    "signos_vitales_interpretacionmedico",
    "signos_vitales_imc_interpretacion",
    "diagnostico_1",
    "diagnostico_2",
    "diagnostico_3",
    "frec_actifisica",
    "frec_alcohol",
];

/// Known abbreviation collisions in the survey export, corrected by exact
/// match after generic canonicalization.
pub const RENAME_OVERRIDES: [(&str, &str); 9] = [
    (
        "signos_vitales_im_cinterpretacion",
        "signos_vitales_imc_interpretacion",
    ),
    ("tantefumar", "tiempo_ante_fumar"),
    ("tabstifumar", "tiempo_abstinencia_fumar"),
    ("tbeber", "tiempo_beber"),
    ("tabstialcohol", "tiempo_abstinencia_alcohol"),
    ("td_examen", "tipo_examen"),
    ("dx1_examen", "diagnostico_1"),
    ("dx2_examen", "diagnostico_2"),
    ("dx3_examen", "diagnostico_3"),
];

static COLUMN_KINDS: Lazy<HashMap<&'static str, ColumnKind>> = Lazy::new(|| {
    let mut kinds = HashMap::new();
    for name in DATE_COLUMNS {
        kinds.insert(name, ColumnKind::Date);
    }
    for name in BOOLEAN_COLUMNS {
        kinds.insert(name, ColumnKind::Boolean);
    }
    for name in NUMERIC_COLUMNS {
        kinds.insert(name, ColumnKind::Numeric);
    }
    for name in CATEGORICAL_COLUMNS {
        kinds.insert(name, ColumnKind::Categorical);
    }
    kinds
});

/// Declared kind of a canonical column name, if any.
///
/// Columns not covered by a policy are left as free text.
pub fn column_kind(name: &str) -> Option<ColumnKind> {
    COLUMN_KINDS.get(name).copied()
}

/// Default rename-override table as an owned map for configuration.
pub fn default_rename_overrides() -> HashMap<String, String> {
    RENAME_OVERRIDES
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policies_are_disjoint() {
        // A column declared in two tables would make coercion order-dependent.
        let total =
            DATE_COLUMNS.len() + BOOLEAN_COLUMNS.len() + NUMERIC_COLUMNS.len() + CATEGORICAL_COLUMNS.len();
        assert_eq!(COLUMN_KINDS.len(), total);
    }

    #[test]
    fn test_column_kind_lookup() {
        assert_eq!(column_kind("fecha_nacimiento"), Some(ColumnKind::Date));
        assert_eq!(column_kind("fuma"), Some(ColumnKind::Boolean));
        assert_eq!(column_kind("edad"), Some(ColumnKind::Numeric));
        assert_eq!(column_kind("diagnostico_1"), Some(ColumnKind::Categorical));
        assert_eq!(column_kind("observaciones"), None);
    }

    #[test]
    fn test_override_targets_are_canonical() {
        // Every override target must already be in canonical form, i.e.
        // running it through the tables or the generic algorithm changes
        // nothing. Cheap proxy: lowercase ascii + underscores only.
        for (_, target) in RENAME_OVERRIDES {
            assert!(
                target
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "override target '{target}' is not canonical"
            );
        }
    }

    #[test]
    fn test_override_targets_have_policies() {
        // The corrected names are the ones the coercer sees; each of them
        // must resolve to a declared kind.
        for (_, target) in RENAME_OVERRIDES {
            assert!(
                column_kind(target).is_some(),
                "override target '{target}' has no type policy"
            );
        }
    }
}
