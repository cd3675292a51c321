//! Scoring and decision engine: weighted score with NA exclusion, the
//! penalty pass, findings and clarifying questions, potential-score
//! projections and the final decision.
//!
//! Everything here is pure and deterministic — given the same criterion
//! evaluations and run id, the output is byte-for-byte identical.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::classify::DetectionResult;
use crate::config::RubricConfig;
use crate::report::{
    CriterioEstado, CriterioEvaluacion, Decision, EvidenciaTipo, FailFast, Hallazgo,
    PenalizacionAplicada, Pregunta, Prioridad, ScorePotencial, Severidad,
};

/// Criteria at or above this weight are critical for the penalty pass.
const CRITICAL_WEIGHT: u32 = 15;

/// Decision thresholds on the 0–100 score.
const APPROVE_AT: f64 = 85.0;
const CORRECT_AT: f64 = 70.0;

/// Maximum clarifying questions surfaced per run.
const MAX_QUESTIONS: usize = 5;

/// Weighted score over the applicable (non-NA) criteria, and the applicable
/// weight total. An all-NA rubric scores 0 rather than dividing by zero.
pub fn calculate_score(criterios: &[CriterioEvaluacion]) -> (f64, f64) {
    let applicable: Vec<&CriterioEvaluacion> = criterios
        .iter()
        .filter(|c| c.estado != CriterioEstado::Na)
        .collect();
    let peso_total: f64 = applicable.iter().map(|c| c.peso as f64).sum();
    if peso_total == 0.0 {
        return (0.0, 0.0);
    }
    let puntos: f64 = applicable.iter().map(|c| c.puntos_obtenidos).sum();
    ((puntos / peso_total * 100.0), peso_total)
}

/// Penalty pass: a critical criterion judged NO costs a flat deduction, but
/// only if it still holds points — a criterion that already scored 0 lost
/// its full weight and is never punished twice. The score floors at 0.
pub fn apply_penalties(
    score: f64,
    criterios: &[CriterioEvaluacion],
    rubric: &RubricConfig,
) -> (f64, Vec<PenalizacionAplicada>) {
    let Some(penalty) = rubric.penalizacion("falta_evidencia_critica") else {
        return (score, Vec::new());
    };

    let mut adjusted = score;
    let mut applied = Vec::new();
    for c in criterios {
        if c.peso >= CRITICAL_WEIGHT && c.estado == CriterioEstado::No && c.puntos_obtenidos > 0.0
        {
            adjusted += penalty.penalizacion;
            applied.push(PenalizacionAplicada {
                tipo: "falta_evidencia_critica".into(),
                criterio: c.criterio_id.clone(),
                penalizacion: penalty.penalizacion,
            });
            debug!(criterio = %c.criterio_id, delta = penalty.penalizacion, "penalty applied");
        }
    }
    (adjusted.max(0.0), applied)
}

/// One finding per NO or PARCIAL criterion, plus a classification finding
/// when the filename disagreed with the content. Sorted by severity rank,
/// then priority.
pub fn generate_findings(
    run_id: &str,
    criterios: &[CriterioEvaluacion],
    detection: &DetectionResult,
) -> Vec<Hallazgo> {
    let mut hallazgos: Vec<Hallazgo> = criterios
        .iter()
        .filter_map(|c| finding_for(run_id, c))
        .collect();

    if detection.conflict_name_vs_content {
        hallazgos.push(classification_finding(run_id, detection));
    }

    hallazgos.sort_by_key(|h| (h.severidad.rank(), h.prioridad));
    hallazgos
}

fn finding_for(run_id: &str, c: &CriterioEvaluacion) -> Option<Hallazgo> {
    // Severity is always the configured missing-evidence severity; a PARCIAL
    // on a bloqueante criterion still blocks approval.
    let (evidencia_tipo, titulo, impacto) = match c.estado {
        CriterioEstado::No if c.evidencia.is_empty() => (
            EvidenciaTipo::Missing,
            format!("Falta evidencia: {}", c.nombre),
            c.peso as f64,
        ),
        // NO despite lexical hits: the evidence was found but judged
        // insufficient.
        CriterioEstado::No => (
            EvidenciaTipo::Found,
            format!("Evidencia insuficiente: {}", c.nombre),
            c.peso as f64,
        ),
        CriterioEstado::Parcial => (
            EvidenciaTipo::Inconsistent,
            format!("Evidencia incompleta: {}", c.nombre),
            c.peso as f64 * 0.5,
        ),
        CriterioEstado::Cumple | CriterioEstado::Na => return None,
    };
    let severidad = c.severidad_si_falta;

    Some(Hallazgo {
        id: stable_id(run_id, "hallazgo", &c.criterio_id),
        criterio_id: c.criterio_id.clone(),
        severidad,
        prioridad: severidad.prioridad(),
        titulo,
        evidencia_tipo,
        evidencia_detalle: evidence_detail(c),
        recomendacion: format!("Documentar {} con evidencia verificable", c.nombre),
        que_agregar: format!(
            "Sección que cubra: {}",
            c.nombre.to_lowercase()
        ),
        donde_insertar: suggest_location(c),
        ejemplo_texto: format!(
            "Ejemplo: \"{}: [detalle concreto con datos del proyecto]\"",
            c.nombre
        ),
        impacto_estimado: impacto,
    })
}

/// First lexical snippet when one exists, otherwise the judge's
/// justification.
fn evidence_detail(c: &CriterioEvaluacion) -> String {
    match c.evidencia.first() {
        Some(ev) => format!("{}: {}", ev.location, ev.snippet),
        None => c.justificacion.clone(),
    }
}

fn suggest_location(c: &CriterioEvaluacion) -> String {
    match c.evidencia.first() {
        Some(ev) => format!("Ampliar {}", ev.location),
        None => "Nueva sección al final del documento".into(),
    }
}

fn classification_finding(run_id: &str, detection: &DetectionResult) -> Hallazgo {
    let suggested = detection
        .filename_suggested_type
        .map(|t| t.to_string())
        .unwrap_or_default();
    Hallazgo {
        id: stable_id(run_id, "hallazgo", "CLASIFICACION"),
        criterio_id: "CLASIFICACION".into(),
        severidad: Severidad::Mayor,
        prioridad: Prioridad::P1,
        titulo: "El nombre del archivo no coincide con el contenido".into(),
        evidencia_tipo: EvidenciaTipo::Inconsistent,
        evidencia_detalle: detection.razon.clone(),
        recomendacion: format!(
            "Renombrar el archivo según el contenido ({}) o revisar si el contenido corresponde a {}",
            detection.tipo_detectado, suggested
        ),
        que_agregar: "".into(),
        donde_insertar: "Nombre del archivo".into(),
        ejemplo_texto: "".into(),
        impacto_estimado: 5.0,
    }
}

/// Clarifying questions from the highest-priority findings (P0–P2), at most
/// [`MAX_QUESTIONS`]. Findings arrive pre-sorted.
pub fn generate_questions(run_id: &str, hallazgos: &[Hallazgo]) -> Vec<Pregunta> {
    hallazgos
        .iter()
        .filter(|h| h.prioridad <= Prioridad::P2)
        .take(MAX_QUESTIONS)
        .map(|h| Pregunta {
            id: stable_id(run_id, "pregunta", &h.criterio_id),
            pregunta: format!(
                "¿Puede aportar la evidencia faltante para \"{}\"?",
                h.titulo
            ),
            prioridad: h.prioridad,
            categoria: categoria_for(h),
            por_que_importa: format!(
                "Sin esta evidencia el criterio {} no puede validarse ({:.1} puntos en juego)",
                h.criterio_id, h.impacto_estimado
            ),
            si_no_responde: match h.prioridad {
                Prioridad::P0 => "El documento será rechazado".into(),
                Prioridad::P1 => "El score se mantendrá penalizado".into(),
                _ => "El hallazgo quedará abierto".into(),
            },
            criterio_relacionado: h.criterio_id.clone(),
        })
        .collect()
}

fn categoria_for(h: &Hallazgo) -> String {
    if h.criterio_id == "CLASIFICACION" {
        "clasificacion".into()
    } else {
        "evidencia".into()
    }
}

/// Projected scores if finding tiers were remediated. Each projection adds
/// the summed estimated impact of the remediated tier in points, capped at
/// 100 and never below `actual`.
pub fn calculate_potential(actual: f64, hallazgos: &[Hallazgo]) -> ScorePotencial {
    let uplift = |max_prio: Prioridad| -> f64 {
        let regained: f64 = hallazgos
            .iter()
            .filter(|h| h.prioridad <= max_prio)
            .map(|h| h.impacto_estimado)
            .sum();
        (actual + regained).min(100.0)
    };

    ScorePotencial {
        actual,
        si_corrige_p0: uplift(Prioridad::P0),
        si_corrige_p0_p1: uplift(Prioridad::P1),
        si_corrige_todo: uplift(Prioridad::P3),
    }
}

/// Final decision. Fail-fast rejection wins over everything; approval
/// additionally requires the absence of blocking findings.
pub fn make_decision(score: f64, fail_fast: &[FailFast], hallazgos: &[Hallazgo]) -> Decision {
    if fail_fast.iter().any(|f| f.active) {
        return Decision::Rechazado;
    }
    let has_blocker = hallazgos
        .iter()
        .any(|h| h.severidad == Severidad::Bloqueante);
    if score >= APPROVE_AT && !has_blocker {
        Decision::Aprobado
    } else if score >= CORRECT_AT {
        Decision::RequiereCorreccion
    } else {
        Decision::Rechazado
    }
}

/// Stable short id derived from the run id and the related criterion, so a
/// re-run over identical inputs reproduces identical ids.
pub fn stable_id(run_id: &str, kind: &str, criterio_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(run_id.as_bytes());
    hasher.update(b":");
    hasher.update(kind.as_bytes());
    hasher.update(b":");
    hasher.update(criterio_id.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    format!("{kind}-{hex}")
}
