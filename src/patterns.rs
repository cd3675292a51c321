//! Structural pattern registry: named boolean predicates over a `FeatureBag`.
//!
//! Pattern names are data — detection config references them by string — so
//! the registry is the single place that knows how each one is detected.
//! Unknown names are rejected at config load time, never at classification
//! time.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::features::FeatureBag;

/// A structural pattern predicate. Pure function of the feature bag.
pub type PatternFn = fn(&FeatureBag) -> bool;

// Requirement and test-case identifiers, e.g. "RF-001" / "TC 12". Anchored on
// a word boundary so they never fire inside unrelated words.
static RF_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\brf[- ]?\d+").expect("RF id regex"));
static TC_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btc[- ]?\d+").expect("TC id regex"));

/// Look up a predicate by its configured name.
pub fn lookup(name: &str) -> Option<PatternFn> {
    REGISTRY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, f)| *f)
}

pub fn is_known(name: &str) -> bool {
    lookup(name).is_some()
}

/// Evaluate the named patterns against the bag, keeping config order.
/// Callers guarantee the names were validated at load time; unknown names
/// simply never match.
pub fn matched<'a>(names: &'a [String], bag: &FeatureBag) -> Vec<&'a str> {
    names
        .iter()
        .filter(|n| lookup(n).map(|p| p(bag)).unwrap_or(false))
        .map(|n| n.as_str())
        .collect()
}

// Heuristic predicates mirror the review rubric's structural expectations.
// They run over lower-cased text, so all needles are lower-case.
static REGISTRY: &[(&str, PatternFn)] = &[
    ("tiene_seccion_rollback", |b| b.headings_text.contains("rollback")),
    ("tiene_inventario_datos", |b| {
        b.full_text.contains("inventario") && b.full_text.contains("datos")
    }),
    ("tiene_cronograma_migracion", |b| {
        b.full_text.contains("cronograma") || b.full_text.contains("timeline")
    }),
    ("tiene_matriz_trazabilidad_rf_tc", |b| {
        (RF_ID.is_match(&b.full_text) || b.full_text.contains("requisito"))
            && (TC_ID.is_match(&b.full_text) || b.full_text.contains("caso"))
            && b.full_text.contains("trazabilidad")
    }),
    ("tiene_arquitectura", |b| {
        b.headings_text.contains("arquitectura") || b.full_text.contains("diagrama")
    }),
    ("tiene_requisitos_funcionales", |b| {
        b.full_text.contains("requisitos funcionales") || RF_ID.is_match(&b.full_text)
    }),
    ("tiene_modelo_datos", |b| {
        b.full_text.contains("modelo de datos") || b.full_text.contains("entidades")
    }),
    ("tiene_escenarios_negocio", |b| {
        b.full_text.contains("escenario")
            && (b.full_text.contains("negocio") || b.full_text.contains("uso"))
    }),
    ("tiene_tabla_parametros", |b| {
        b.full_text.contains("parámetros") || b.full_text.contains("configuración")
    }),
    ("tiene_comandos_scripts", |b| {
        b.full_text.contains("comando") || b.full_text.contains("script")
    }),
    ("tiene_endpoints_apis", |b| {
        (b.full_text.contains("endpoint") || b.full_text.contains("api")) && b.tables_count > 0
    }),
    ("tiene_codigos_error", |b| {
        b.full_text.contains("código") && b.full_text.contains("error")
    }),
    ("tiene_checklist", |b| {
        b.full_text.contains("checklist")
            || b.full_text.contains("☐")
            || b.full_text.contains("[ ]")
    }),
    ("tiene_criterios_aceptacion", |b| {
        b.full_text.contains("criterios") && b.full_text.contains("aceptación")
    }),
    ("tiene_casos_prueba_con_pasos", |b| {
        b.full_text.contains("casos de prueba") && b.full_text.contains("pasos")
    }),
    ("tiene_datos_prueba", |b| {
        b.full_text.contains("datos de prueba") || b.full_text.contains("test data")
    }),
    ("tiene_resultados_evidencia", |b| {
        b.full_text.contains("resultado")
            && (b.full_text.contains("esperado") || b.full_text.contains("evidencia"))
    }),
    ("tiene_procedimientos_inicio_parada", |b| {
        (b.full_text.contains("inicio") || b.full_text.contains("start"))
            && (b.full_text.contains("parada") || b.full_text.contains("stop"))
    }),
    ("tiene_monitoreo_alertas", |b| {
        b.full_text.contains("monitoreo") || b.full_text.contains("alertas")
    }),
    ("tiene_ventanas_mantenimiento", |b| {
        b.full_text.contains("ventana") && b.full_text.contains("mantenimiento")
    }),
    ("tiene_troubleshooting", |b| {
        b.full_text.contains("troubleshooting") || b.full_text.contains("solución de problemas")
    }),
    ("tiene_timeline_cronologia", |b| {
        b.full_text.contains("timeline") || b.full_text.contains("cronología")
    }),
    ("tiene_causa_raiz", |b| {
        b.full_text.contains("causa raíz")
            || b.full_text.contains("root cause")
            || b.full_text.contains("5 whys")
    }),
    ("tiene_acciones_preventivas", |b| {
        b.full_text.contains("acciones preventivas") || b.full_text.contains("prevención")
    }),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureBag;
    use crate::outline::{DocumentOutline, DocumentSection};
    use std::collections::HashMap;

    fn bag(heading: &str, body: &str, tables: usize) -> FeatureBag {
        FeatureBag::from_outline(&DocumentOutline {
            filename: "doc.docx".into(),
            word_count: body.split_whitespace().count(),
            sections: vec![DocumentSection {
                title: heading.into(),
                level: 1,
                content: body.into(),
                location: "Section 1".into(),
            }],
            tables_count: tables,
            has_toc: false,
            metadata: HashMap::new(),
        })
    }

    #[test]
    fn rollback_pattern_requires_heading_hit() {
        let b = bag("Plan de Rollback", "sin nada", 0);
        assert!(lookup("tiene_seccion_rollback").unwrap()(&b));
        let b = bag("Introducción", "rollback mencionado solo en el cuerpo", 0);
        assert!(!lookup("tiene_seccion_rollback").unwrap()(&b));
    }

    #[test]
    fn endpoints_pattern_needs_a_table() {
        let b = bag("API", "endpoint GET /users", 0);
        assert!(!lookup("tiene_endpoints_apis").unwrap()(&b));
        let b = bag("API", "endpoint GET /users", 1);
        assert!(lookup("tiene_endpoints_apis").unwrap()(&b));
    }

    #[test]
    fn matched_preserves_config_order_and_skips_unknown() {
        let b = bag(
            "Plan de Rollback",
            "inventario de datos y cronograma de fases",
            0,
        );
        let names = vec![
            "tiene_inventario_datos".to_string(),
            "nombre_inexistente".to_string(),
            "tiene_seccion_rollback".to_string(),
        ];
        assert_eq!(
            matched(&names, &b),
            vec!["tiene_inventario_datos", "tiene_seccion_rollback"]
        );
    }

    #[test]
    fn rf_ids_require_a_word_boundary_and_digits() {
        let b = bag("Trazabilidad", "perfil del usuario y trazabilidad de casos", 0);
        assert!(!lookup("tiene_matriz_trazabilidad_rf_tc").unwrap()(&b));
        let b = bag("Trazabilidad", "trazabilidad: RF-001 cubierto por TC 12", 0);
        assert!(lookup("tiene_matriz_trazabilidad_rf_tc").unwrap()(&b));
    }

    #[test]
    fn is_known_rejects_typos() {
        assert!(is_known("tiene_causa_raiz"));
        assert!(!is_known("tiene_causa_raíz"));
    }
}
