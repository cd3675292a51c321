//! Criterion evaluation: lexical evidence gathering plus collaborator
//! judgment, one `CriterioEvaluacion` per rubric item.
//!
//! The judge can fail per criterion without aborting the run: a failed
//! judgment degrades that criterion to NO with a justification citing the
//! failure, and the rest of the rubric proceeds.

use std::collections::HashMap;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::collab::{JudgeContext, SharedCollaborator};
use crate::config::CriterioConfig;
use crate::outline::{search_evidence, DocumentOutline, EvidenceRef};
use crate::report::{CriterioEstado, CriterioEvaluacion};

/// Sections handed to the judge for context, from the top of the document.
const CONTEXT_SECTIONS: usize = 8;

/// Free-text answers keyed `answer_<criterio_id>`, collected from the user
/// between evaluation runs.
pub type UserAnswers = HashMap<String, String>;

/// Evaluate every criterion of the active rubric concurrently, preserving
/// rubric order in the output.
pub async fn evaluate_criteria(
    judge: &SharedCollaborator,
    criterios: &[CriterioConfig],
    outline: &DocumentOutline,
    answers: &UserAnswers,
) -> Vec<CriterioEvaluacion> {
    let futures = criterios
        .iter()
        .map(|c| evaluate_one(judge, c, outline, answers));
    join_all(futures).await
}

async fn evaluate_one(
    judge: &SharedCollaborator,
    criterio: &CriterioConfig,
    outline: &DocumentOutline,
    answers: &UserAnswers,
) -> CriterioEvaluacion {
    let evidencia = search_evidence(outline, &criterio.evidencia_requerida);
    let respuesta_usuario = answers
        .get(&format!("answer_{}", criterio.id))
        .filter(|a| !a.trim().is_empty())
        .cloned();

    let ctx = JudgeContext {
        criterio_id: criterio.id.clone(),
        nombre: criterio.nombre.clone(),
        descripcion: criterio.descripcion.clone(),
        evidencia_requerida: criterio.evidencia_requerida.clone(),
        evidencia_encontrada: render_evidence(&evidencia),
        respuesta_usuario,
        secciones: render_sections(outline),
    };

    let (estado, justificacion) = match judge.judge(&ctx).await {
        Ok(judgment) => {
            debug!(criterio = %criterio.id, estado = ?judgment.estado, "criterion judged");
            (judgment.estado, judgment.justificacion)
        }
        Err(err) => {
            warn!(criterio = %criterio.id, error = %err, "judge unavailable, marking NO");
            (
                CriterioEstado::No,
                format!("No evaluado: el juez no estuvo disponible ({err})"),
            )
        }
    };

    CriterioEvaluacion {
        criterio_id: criterio.id.clone(),
        nombre: criterio.nombre.clone(),
        peso: criterio.peso,
        puntos_obtenidos: estado.puntos(criterio.peso),
        estado,
        evidencia,
        justificacion,
        severidad_si_falta: criterio.severidad_si_falta,
    }
}

fn render_evidence(evidence: &[EvidenceRef]) -> Vec<String> {
    evidence
        .iter()
        .map(|e| format!("{}: {}", e.location, e.snippet))
        .collect()
}

fn render_sections(outline: &DocumentOutline) -> Vec<String> {
    outline
        .sections
        .iter()
        .take(CONTEXT_SECTIONS)
        .map(|s| format!("{} — {}", s.location, s.title))
        .collect()
}
