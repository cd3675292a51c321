//! Document-type classification: deterministic signal scoring and resolution,
//! with a collaborator-assisted tiebreak for near ties.

pub mod resolver;
pub mod signals;
pub mod tiebreak;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::collab::SharedCollaborator;
use crate::config::DetectionConfig;
use crate::doc_type::DocType;
use crate::features::FeatureBag;
use crate::outline::DocumentOutline;

/// One of the three best-scoring types, kept for diagnostics regardless of
/// whether it cleared the candidate gate.
#[derive(Debug, Clone, Serialize)]
pub struct TopCandidate {
    pub doc_type: DocType,
    pub score: f64,
    pub why: String,
}

/// Classification outcome for a single document.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    pub tipo_detectado: DocType,
    pub confianza: f64,
    pub razon: String,
    pub top3: Vec<TopCandidate>,
    pub conflict_name_vs_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename_suggested_type: Option<DocType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secondary_signals: Vec<String>,
    /// Only populated for UNKNOWN: what to ask the author to classify by hand.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub questions_to_classify: Vec<String>,
}

/// Classifier over a fixed detection config and an optional collaborator.
pub struct Classifier {
    config: Arc<DetectionConfig>,
    collaborator: SharedCollaborator,
}

impl Classifier {
    /// Classifier over the embedded default config.
    pub fn new(collaborator: SharedCollaborator) -> Self {
        Self::with_config(Arc::new(DetectionConfig::builtin().clone()), collaborator)
    }

    /// Classifier over an explicit, already-validated config.
    pub fn with_config(config: Arc<DetectionConfig>, collaborator: SharedCollaborator) -> Self {
        Self {
            config,
            collaborator,
        }
    }

    /// Rule-based classification, then a collaborator tiebreak when the top
    /// two candidates land within [`resolver::TIE_GAP`] points.
    pub async fn classify(&self, outline: &DocumentOutline) -> DetectionResult {
        let bag = FeatureBag::from_outline(outline);
        let scores = signals::score_all(&self.config, &bag);
        for ts in &scores {
            debug!(doc_type = %ts.doc_type, score = ts.score, strong = ts.strong, "type scored");
        }

        let mut result = resolver::resolve(&self.config, &bag, &scores);
        tiebreak::apply(&self.config, &self.collaborator, &scores, &mut result).await;

        info!(
            filename = %outline.filename,
            tipo = %result.tipo_detectado,
            confianza = result.confianza,
            "document classified"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use crate::collab::DisabledCollaborator;
    use crate::outline::DocumentSection;

    use super::*;

    fn outline(filename: &str, headings: &[(&str, &str)]) -> DocumentOutline {
        let sections: Vec<DocumentSection> = headings
            .iter()
            .enumerate()
            .map(|(i, (title, content))| DocumentSection {
                title: (*title).to_string(),
                level: 1,
                content: (*content).to_string(),
                location: format!("Section {}", i + 1),
            })
            .collect();
        let word_count = sections
            .iter()
            .map(|s| s.content.split_whitespace().count() + s.title.split_whitespace().count())
            .sum();
        DocumentOutline {
            filename: filename.into(),
            word_count,
            sections,
            tables_count: 0,
            has_toc: false,
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn classifies_a_runbook_without_a_collaborator() {
        let classifier = Classifier::new(Arc::new(DisabledCollaborator));
        let result = classifier
            .classify(&outline(
                "runbook_operacion.docx",
                &[
                    ("Runbook de Operación", "Procedimientos de inicio y parada del servicio."),
                    ("Monitoreo y Alertas", "Umbrales de monitoreo y alerta. Alerta temprana."),
                    ("Ventanas de Mantenimiento", "Mantenimiento programado los domingos."),
                    ("Troubleshooting", "Procedimiento ante errores comunes."),
                ],
            ))
            .await;
        assert_eq!(result.tipo_detectado, DocType::RunbookManualOperacion);
        assert!(result.confianza > 0.6);
        assert!(result.top3.len() <= 3);
    }

    #[tokio::test]
    async fn generic_document_comes_back_unknown_with_questions() {
        let classifier = Classifier::new(Arc::new(DisabledCollaborator));
        let result = classifier
            .classify(&outline(
                "acta_reunion.docx",
                &[("Acta", "Asistentes y acuerdos de la reunión semanal.")],
            ))
            .await;
        assert_eq!(result.tipo_detectado, DocType::Unknown);
        assert_eq!(result.confianza, 0.0);
        assert!(!result.questions_to_classify.is_empty());
    }
}
