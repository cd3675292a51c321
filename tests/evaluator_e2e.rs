//! End-to-end evaluation runs over synthetic deliverables with the
//! deterministic mock collaborator: scoring, penalties, findings, questions,
//! potential projections, decisions and re-evaluation.

use std::collections::HashMap;
use std::sync::Arc;

use doc_compliance_analyzer::collab::MockCollaborator;
use doc_compliance_analyzer::criteria::UserAnswers;
use doc_compliance_analyzer::report::{CriterioEstado, Prioridad, Severidad};
use doc_compliance_analyzer::{Decision, DocType, DocumentEvaluator, DocumentOutline, DocumentSection};

fn outline(filename: &str, sections: &[(&str, &str)], word_count: usize) -> DocumentOutline {
    let sections: Vec<DocumentSection> = sections
        .iter()
        .enumerate()
        .map(|(i, (title, content))| DocumentSection {
            title: (*title).to_string(),
            level: 1,
            content: (*content).to_string(),
            location: format!("Section {}", i + 1),
        })
        .collect();
    DocumentOutline {
        filename: filename.into(),
        word_count,
        sections,
        tables_count: 1,
        has_toc: true,
        metadata: HashMap::new(),
    }
}

/// A migration document satisfying every DTM rubric criterion lexically.
fn complete_dtm() -> DocumentOutline {
    outline(
        "DTM_ventas_v3.docx",
        &[
            (
                "Control de Versiones",
                "Versión 3.0, autor Equipo de Datos. Historial de cambios actualizado.",
            ),
            (
                "Inventario de Datos",
                "Inventario de datos con origen y destino por tabla, incluyendo volumetría.",
            ),
            (
                "Plan de Rollback",
                "Plan de rollback con criterios de activación y procedimiento de reversión.",
            ),
            (
                "Matriz de Trazabilidad",
                "Matriz de trazabilidad: RF-001 cubierto por TC-001 en la release 1.0.",
            ),
            (
                "Cronograma",
                "Cronograma de migración por fases con ventana de cutover el sábado.",
            ),
            (
                "Validación Post-Migración",
                "Validación post-migración con conciliación de totales por tabla.",
            ),
            (
                "Riesgos",
                "Riesgo de pérdida de datos con plan de mitigación y punto de control.",
            ),
        ],
        260,
    )
}

/// Same document with rollback, cronograma and validación stripped out.
fn incomplete_dtm() -> DocumentOutline {
    outline(
        "DTM_ventas_v3.docx",
        &[
            (
                "Control de Versiones",
                "Versión 3.0, autor Equipo de Datos. Historial de cambios actualizado.",
            ),
            (
                "Inventario de Datos",
                "Inventario de datos con origen y destino por tabla, incluyendo volumetría.",
            ),
            (
                "Matriz de Trazabilidad",
                "Matriz de trazabilidad: RF-001 cubierto por TC-001 en la release 1.0.",
            ),
            (
                "Riesgos",
                "Riesgo de pérdida de datos con plan de mitigación y punto de control.",
            ),
        ],
        180,
    )
}

fn evaluator() -> DocumentEvaluator {
    DocumentEvaluator::new(Arc::new(MockCollaborator))
}

#[tokio::test]
async fn complete_document_is_approved() {
    let result = evaluator()
        .evaluate_with_run_id(&complete_dtm(), &UserAnswers::new(), "run-full")
        .await;
    assert_eq!(result.doc_type, DocType::Dtm);
    assert_eq!(result.score, 100.0);
    assert_eq!(result.decision, Decision::Aprobado);
    assert!(result.hallazgos.is_empty());
    assert!(result.preguntas.is_empty());
    assert!(result.penalizaciones_aplicadas.is_empty());
    assert_eq!(result.peso_total_aplicable, 100.0);
    assert!(result.fail_fast.iter().all(|f| !f.active));
    assert!(result
        .criterios
        .iter()
        .all(|c| c.estado == CriterioEstado::Cumple));
}

#[tokio::test]
async fn missing_evidence_rejects_with_sorted_findings() {
    let result = evaluator()
        .evaluate_with_run_id(&incomplete_dtm(), &UserAnswers::new(), "run-gaps")
        .await;
    assert_eq!(result.doc_type, DocType::Dtm);
    // Three criteria (pesos 20, 15, 15) lost outright.
    assert_eq!(result.score, 50.0);
    assert_eq!(result.decision, Decision::Rechazado);
    // Zero-point criteria never draw the flat penalty on top.
    assert!(result.penalizaciones_aplicadas.is_empty());

    // Findings sorted blocking-first; rollback is the blocking gap.
    assert_eq!(result.hallazgos.len(), 3);
    assert_eq!(result.hallazgos[0].criterio_id, "DTM-02");
    assert_eq!(result.hallazgos[0].severidad, Severidad::Bloqueante);
    assert_eq!(result.hallazgos[0].prioridad, Prioridad::P0);
    assert_eq!(result.preguntas.len(), 3);

    // Remediation projections stay monotone and consistent.
    let p = &result.score_potencial;
    assert_eq!(p.actual, 50.0);
    assert_eq!(p.si_corrige_p0, 70.0);
    assert_eq!(p.si_corrige_p0_p1, 100.0);
    assert_eq!(p.si_corrige_todo, 100.0);
}

#[tokio::test]
async fn short_draft_fails_fast_without_scoring() {
    let doc = outline(
        "borrador.docx",
        &[("Borrador", "Apenas unas notas iniciales del documento.")],
        42,
    );
    let result = evaluator()
        .evaluate_with_run_id(&doc, &UserAnswers::new(), "run-ff")
        .await;
    assert_eq!(result.decision, Decision::Rechazado);
    assert!(result.fail_fast[0].active);
    assert!(result.criterios.is_empty());
    assert!(result.hallazgos.is_empty());
}

#[tokio::test]
async fn reevaluation_with_answers_improves_the_score() {
    let evaluator = evaluator();
    let first = evaluator
        .evaluate_with_run_id(&incomplete_dtm(), &UserAnswers::new(), "run-1")
        .await;

    let mut answers = UserAnswers::new();
    answers.insert(
        "answer_DTM-02".into(),
        "El plan de rollback está descrito en el anexo B del contrato.".into(),
    );
    let second = evaluator
        .evaluate_with_run_id(&incomplete_dtm(), &answers, "run-2")
        .await;

    assert!(second.score > first.score);
    assert_eq!(second.score, 60.0);
    let dtm02 = second
        .criterios
        .iter()
        .find(|c| c.criterio_id == "DTM-02")
        .unwrap();
    assert_eq!(dtm02.estado, CriterioEstado::Parcial);
    assert_eq!(dtm02.puntos_obtenidos, 10.0);

    // A partially covered blocking criterion still reports as bloqueante.
    let h = second
        .hallazgos
        .iter()
        .find(|h| h.criterio_id == "DTM-02")
        .unwrap();
    assert_eq!(h.severidad, Severidad::Bloqueante);
}

#[tokio::test]
async fn identical_runs_reproduce_identical_ids() {
    let evaluator = evaluator();
    let a = evaluator
        .evaluate_with_run_id(&incomplete_dtm(), &UserAnswers::new(), "run-rep")
        .await;
    let b = evaluator
        .evaluate_with_run_id(&incomplete_dtm(), &UserAnswers::new(), "run-rep")
        .await;
    let ids_a: Vec<&str> = a.hallazgos.iter().map(|h| h.id.as_str()).collect();
    let ids_b: Vec<&str> = b.hallazgos.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids_a, ids_b);

    let c = evaluator
        .evaluate_with_run_id(&incomplete_dtm(), &UserAnswers::new(), "run-other")
        .await;
    assert_ne!(ids_a[0], c.hallazgos[0].id.as_str());
}

#[tokio::test]
async fn result_serializes_with_canonical_field_values() {
    let result = evaluator()
        .evaluate_with_run_id(&incomplete_dtm(), &UserAnswers::new(), "run-json")
        .await;
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"doc_type\":\"DTM\""));
    assert!(json.contains("\"decision\":\"RECHAZADO\""));
    assert!(json.contains("\"estado\":\"NO\""));
    assert!(json.contains("\"estado\":\"CUMPLE\""));
    assert!(json.contains("\"severidad\":\"bloqueante\""));
    assert!(json.contains("\"prioridad\":\"P0\""));
}
