//! Tiebreak gateway: the one place the classifier consults a collaborator.
//!
//! Only a near tie between two gated candidates crosses the gateway, and the
//! rule-based winner always survives a collaborator failure or an answer
//! naming a type outside the tied pair. Confidence is never touched.

use tracing::{debug, warn};

use crate::collab::{SharedCollaborator, TiebreakCandidate};
use crate::config::DetectionConfig;

use super::resolver::{gated_candidates, TIE_GAP};
use super::signals::TypeScore;
use super::DetectionResult;

/// The tied pair eligible for a collaborator consult, if any.
pub fn tied_pair<'a>(
    cfg: &DetectionConfig,
    result: &DetectionResult,
    scores: &'a [TypeScore],
) -> Option<(&'a TypeScore, &'a TypeScore)> {
    if result.tipo_detectado.is_unknown() {
        return None;
    }
    let candidates = gated_candidates(cfg, scores);
    if candidates.len() < 2 {
        return None;
    }
    let (top1, top2) = (candidates[0], candidates[1]);
    (top1.score - top2.score <= TIE_GAP).then_some((top1, top2))
}

/// Consult the collaborator on a near tie and apply a validated override.
/// The detection reason gains a tiebreaker clause on success; everything
/// else in the result is left as the rules decided it.
pub async fn apply(
    cfg: &DetectionConfig,
    collab: &SharedCollaborator,
    scores: &[TypeScore],
    result: &mut DetectionResult,
) {
    let Some((top1, top2)) = tied_pair(cfg, result, scores) else {
        return;
    };

    let answer = collab
        .resolve_tie(&candidate_of(top1), &candidate_of(top2))
        .await;

    match answer {
        Ok(answer) => {
            if answer.winner != top1.doc_type && answer.winner != top2.doc_type {
                warn!(
                    winner = %answer.winner,
                    "tiebreaker named a type outside the tied pair, keeping rule-based winner"
                );
                return;
            }
            debug!(winner = %answer.winner, "tiebreaker accepted");
            result.tipo_detectado = answer.winner;
            if !answer.reasoning.is_empty() {
                result
                    .razon
                    .push_str(&format!(" | LLM tiebreaker: {}", answer.reasoning));
            }
        }
        Err(err) => {
            warn!(error = %err, "tiebreaker unavailable, keeping rule-based winner");
        }
    }
}

fn candidate_of(ts: &TypeScore) -> TiebreakCandidate {
    TiebreakCandidate {
        doc_type: ts.doc_type,
        score: ts.score,
        evidence: ts.evidence.iter().take(3).cloned().collect(),
    }
}
