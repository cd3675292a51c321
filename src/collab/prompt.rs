//! Prompt construction and strict answer parsing shared by the HTTP
//! providers. Both capabilities demand a JSON-only answer; anything else is a
//! malformed-answer error and the caller's deterministic fallback applies.

use serde::de::DeserializeOwned;

use crate::error::CollaboratorError;

use super::{JudgeContext, TiebreakCandidate};

pub(super) const TIEBREAK_SYSTEM: &str = "Eres un clasificador de documentos de \
gobierno. Responde SOLO con JSON: {\"winner\": \"<tipo>\", \"reasoning\": \"...\"}. \
El winner debe ser exactamente uno de los dos candidatos.";

pub(super) const JUDGE_SYSTEM: &str = "Eres un evaluador de criterios de rúbrica. \
Reglas anti-alucinación: solo afirmar CUMPLE o PARCIAL si hay evidencia citada con \
location y snippet; sin evidencia, estado = NO; NA solo si el criterio genuinamente \
no aplica, con justificación explícita; no inferir ni inventar contenido. Responde \
SOLO con JSON: {\"estado\": \"CUMPLE|PARCIAL|NO|NA\", \"justificacion\": \"...\"}.";

pub(super) fn tiebreak_prompt(a: &TiebreakCandidate, b: &TiebreakCandidate) -> String {
    format!(
        "Desempate entre dos tipos de documento muy cercanos:\n\n\
         Candidato 1: {} (score: {:.1})\nSeñales: {}\n\n\
         Candidato 2: {} (score: {:.1})\nSeñales: {}\n\n\
         Elige el winner entre \"{}\" y \"{}\".",
        a.doc_type,
        a.score,
        a.evidence.join(", "),
        b.doc_type,
        b.score,
        b.evidence.join(", "),
        a.doc_type,
        b.doc_type,
    )
}

pub(super) fn judge_prompt(ctx: &JudgeContext) -> String {
    let evidencia = if ctx.evidencia_encontrada.is_empty() {
        "No se encontró evidencia automática".to_string()
    } else {
        ctx.evidencia_encontrada
            .iter()
            .map(|e| format!("- {e}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let usuario = ctx
        .respuesta_usuario
        .as_deref()
        .map(|r| format!("\n\nEvidencia aportada por usuario:\n{r}"))
        .unwrap_or_default();

    format!(
        "Evalúa el siguiente criterio del documento:\n\n\
         CRITERIO: {}\nDESCRIPCIÓN: {}\nEVIDENCIA REQUERIDA: {}\n\n\
         DOCUMENTO (primeras secciones):\n{}\n\n\
         EVIDENCIA ENCONTRADA:\n{}{}",
        ctx.nombre,
        ctx.descripcion,
        ctx.evidencia_requerida.join(", "),
        ctx.secciones.join("\n\n"),
        evidencia,
        usuario,
    )
}

/// Parse the model's JSON payload, tolerating a markdown code fence around it.
pub(super) fn parse_answer<T: DeserializeOwned>(raw: &str) -> Result<T, CollaboratorError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim()).map_err(CollaboratorError::from)
}
