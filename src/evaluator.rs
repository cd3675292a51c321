//! Evaluation orchestrator: fail-fast gate, classification, rubric
//! evaluation, scoring and decision, assembled into one `EvaluationResult`.
//!
//! A re-evaluation after user answers is a full second run over the same
//! outline plus the answers; nothing from the first run is patched in place.

use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::classify::{Classifier, DetectionResult};
use crate::collab::SharedCollaborator;
use crate::config::{DetectionConfig, RubricConfig};
use crate::criteria::{evaluate_criteria, UserAnswers};
use crate::doc_type::DocType;
use crate::outline::DocumentOutline;
use crate::report::{Decision, EvaluationResult, FailFast, ScorePotencial};
use crate::scoring;

/// Documents under this many words are rejected before any scoring.
const MIN_WORD_COUNT: usize = 100;

pub struct DocumentEvaluator {
    rubric: Arc<RubricConfig>,
    classifier: Classifier,
    collaborator: SharedCollaborator,
}

impl DocumentEvaluator {
    /// Evaluator over the embedded default configs.
    pub fn new(collaborator: SharedCollaborator) -> Self {
        Self::with_configs(
            Arc::new(DetectionConfig::builtin().clone()),
            Arc::new(RubricConfig::builtin().clone()),
            collaborator,
        )
    }

    /// Evaluator over explicit, already-validated configs.
    pub fn with_configs(
        detection: Arc<DetectionConfig>,
        rubric: Arc<RubricConfig>,
        collaborator: SharedCollaborator,
    ) -> Self {
        Self {
            rubric,
            classifier: Classifier::with_config(detection, collaborator.clone()),
            collaborator,
        }
    }

    /// Full evaluation with a caller-chosen run id. Identical inputs and run
    /// id reproduce the result byte-for-byte apart from the timestamp.
    pub async fn evaluate_with_run_id(
        &self,
        outline: &DocumentOutline,
        answers: &UserAnswers,
        run_id: &str,
    ) -> EvaluationResult {
        let mut fail_fast = vec![word_count_check(outline)];
        if fail_fast.iter().any(|f| f.active) {
            warn!(run_id, filename = %outline.filename, "fail-fast rejection");
            return rejected_early(run_id, fail_fast);
        }

        let detection = self.classifier.classify(outline).await;
        fail_fast.push(unknown_type_check(&detection));
        if detection.tipo_detectado == DocType::Unknown {
            warn!(run_id, "document type unknown, nothing to score");
        }
        let criterios_cfg = self.rubric.criterios_for(detection.tipo_detectado);

        let criterios =
            evaluate_criteria(&self.collaborator, criterios_cfg, outline, answers).await;

        let (raw_score, peso_total) = scoring::calculate_score(&criterios);
        let (score, penalizaciones) =
            scoring::apply_penalties(raw_score, &criterios, &self.rubric);
        let hallazgos = scoring::generate_findings(run_id, &criterios, &detection);
        let preguntas = scoring::generate_questions(run_id, &hallazgos);
        let score_potencial = scoring::calculate_potential(score, &hallazgos);
        let decision = scoring::make_decision(score, &fail_fast, &hallazgos);

        info!(
            run_id,
            tipo = %detection.tipo_detectado,
            score,
            decision = ?decision,
            hallazgos = hallazgos.len(),
            "evaluation complete"
        );

        EvaluationResult {
            run_id: run_id.to_string(),
            doc_type: detection.tipo_detectado,
            doc_type_confidence: detection.confianza,
            score,
            decision,
            fail_fast,
            criterios,
            hallazgos,
            preguntas,
            score_potencial,
            penalizaciones_aplicadas: penalizaciones,
            peso_total_aplicable: peso_total,
            timestamp: Utc::now(),
        }
    }

    /// Evaluation with a run id derived from the filename and current time.
    pub async fn evaluate(
        &self,
        outline: &DocumentOutline,
        answers: &UserAnswers,
    ) -> EvaluationResult {
        let run_id = derive_run_id(&outline.filename);
        self.evaluate_with_run_id(outline, answers, &run_id).await
    }

    /// Classification only, without rubric scoring.
    pub async fn classify(&self, outline: &DocumentOutline) -> DetectionResult {
        self.classifier.classify(outline).await
    }

}

fn word_count_check(outline: &DocumentOutline) -> FailFast {
    FailFast {
        code: "FF-01".into(),
        name: "Documento demasiado corto".into(),
        active: outline.word_count < MIN_WORD_COUNT,
        evidencia: format!("{} palabras", outline.word_count),
        explicacion: format!(
            "Un entregable evaluable requiere al menos {MIN_WORD_COUNT} palabras"
        ),
    }
}

fn unknown_type_check(detection: &DetectionResult) -> FailFast {
    FailFast {
        code: "FF-02".into(),
        name: "Tipo de documento no identificado".into(),
        active: detection.tipo_detectado.is_unknown(),
        evidencia: detection.razon.clone(),
        explicacion: "Sin tipo detectado no hay rúbrica aplicable".into(),
    }
}

fn rejected_early(run_id: &str, fail_fast: Vec<FailFast>) -> EvaluationResult {
    EvaluationResult {
        run_id: run_id.to_string(),
        doc_type: DocType::Unknown,
        doc_type_confidence: 0.0,
        score: 0.0,
        decision: Decision::Rechazado,
        fail_fast,
        criterios: Vec::new(),
        hallazgos: Vec::new(),
        preguntas: Vec::new(),
        score_potencial: ScorePotencial {
            actual: 0.0,
            si_corrige_p0: 0.0,
            si_corrige_p0_p1: 0.0,
            si_corrige_todo: 0.0,
        },
        penalizaciones_aplicadas: Vec::new(),
        peso_total_aplicable: 0.0,
        timestamp: Utc::now(),
    }
}

fn derive_run_id(filename: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(filename.as_bytes());
    hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
    format!("run-{hex}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use crate::collab::MockCollaborator;
    use crate::outline::DocumentSection;

    use super::*;

    fn short_outline() -> DocumentOutline {
        DocumentOutline {
            filename: "borrador.docx".into(),
            word_count: 42,
            sections: vec![DocumentSection {
                title: "Borrador".into(),
                level: 1,
                content: "Texto breve.".into(),
                location: "Section 1".into(),
            }],
            tables_count: 0,
            has_toc: false,
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn short_document_is_rejected_before_scoring() {
        let evaluator = DocumentEvaluator::new(Arc::new(MockCollaborator));
        let result = evaluator
            .evaluate_with_run_id(&short_outline(), &UserAnswers::new(), "run-t1")
            .await;
        assert_eq!(result.decision, Decision::Rechazado);
        assert!(result.fail_fast[0].active);
        assert_eq!(result.fail_fast[0].code, "FF-01");
        assert!(result.criterios.is_empty());
        assert_eq!(result.score, 0.0);
    }

    #[tokio::test]
    async fn unknown_type_triggers_the_second_fail_fast() {
        let doc = DocumentOutline {
            filename: "memo_interno.docx".into(),
            word_count: 180,
            sections: vec![DocumentSection {
                title: "Memo".into(),
                level: 1,
                content: "Comunicación interna sobre el cambio de horario de oficina.".into(),
                location: "Section 1".into(),
            }],
            tables_count: 0,
            has_toc: false,
            metadata: HashMap::new(),
        };
        let evaluator = DocumentEvaluator::new(Arc::new(MockCollaborator));
        let result = evaluator
            .evaluate_with_run_id(&doc, &UserAnswers::new(), "run-t2")
            .await;
        assert!(!result.fail_fast[0].active);
        assert_eq!(result.fail_fast[1].code, "FF-02");
        assert!(result.fail_fast[1].active);
        assert_eq!(result.decision, Decision::Rechazado);
        assert!(result.criterios.is_empty());
    }

    #[test]
    fn derived_run_ids_are_unique_enough() {
        let a = derive_run_id("a.docx");
        let b = derive_run_id("b.docx");
        assert_ne!(a, b);
        assert!(a.starts_with("run-"));
    }
}
