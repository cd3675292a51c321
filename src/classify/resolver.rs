//! Type resolver: a small state machine over gated candidates.
//!
//! Resolution order (first applicable wins): no candidates → UNKNOWN;
//! structural dominance; single candidate; clear leader; near tie with
//! conflict-resolution rules. Filename-vs-content disagreement is checked
//! independently after the winner is known.

use std::collections::BTreeSet;

use crate::config::{ConflictRule, DetectionConfig};
use crate::doc_type::DocType;
use crate::features::FeatureBag;
use crate::patterns;

use super::signals::TypeScore;
use super::{DetectionResult, TopCandidate};

/// Two candidates within this many points are a near tie.
pub const TIE_GAP: f64 = 5.0;

/// Confidence ceilings per resolution path.
const CAP_DOMINANCE: f64 = 0.95;
const CAP_SINGLE: f64 = 0.90;
const CAP_CLEAR_LEADER: f64 = 0.85;
const CAP_NEAR_TIE: f64 = 0.75;

/// Candidate gate: threshold AND at least one strong indicator, sorted by
/// descending score.
pub(crate) fn gated_candidates<'a>(
    cfg: &DetectionConfig,
    scores: &'a [TypeScore],
) -> Vec<&'a TypeScore> {
    let mut candidates: Vec<&TypeScore> = scores
        .iter()
        .filter(|ts| {
            let threshold = cfg
                .type_config(ts.doc_type)
                .map(|t| t.threshold)
                .unwrap_or(f64::MAX);
            ts.score >= threshold && ts.strong
        })
        .collect();
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}

pub fn resolve(cfg: &DetectionConfig, bag: &FeatureBag, scores: &[TypeScore]) -> DetectionResult {
    let candidates = gated_candidates(cfg, scores);

    // Top 3 from raw scores regardless of gating, for diagnostics.
    let top3 = top3(scores);

    if candidates.is_empty() {
        return DetectionResult {
            tipo_detectado: DocType::Unknown,
            confianza: 0.0,
            razon: "Ningún tipo supera umbral o tiene indicadores fuertes".into(),
            top3,
            conflict_name_vs_content: false,
            filename_suggested_type: None,
            secondary_signals: Vec::new(),
            questions_to_classify: cfg.unknown_questions.clone(),
        };
    }

    let (winner, razon, confianza) = pick_winner(cfg, bag, scores, &candidates);

    let mut result = DetectionResult {
        tipo_detectado: winner,
        confianza: round2(confianza),
        razon,
        top3,
        conflict_name_vs_content: false,
        filename_suggested_type: None,
        secondary_signals: secondary_signals(cfg, bag, winner),
        questions_to_classify: Vec::new(),
    };

    check_filename_conflict(cfg, bag, scores, &mut result);
    result
}

fn pick_winner(
    cfg: &DetectionConfig,
    bag: &FeatureBag,
    scores: &[TypeScore],
    candidates: &[&TypeScore],
) -> (DocType, String, f64) {
    let score_of = |t: DocType| {
        scores
            .iter()
            .find(|ts| ts.doc_type == t)
            .map(|ts| ts.score)
            .unwrap_or(0.0)
    };

    // 1) Structural dominance.
    if let Some((winner, reason)) = dominance_winner(cfg, bag) {
        if candidates.iter().any(|c| c.doc_type == winner) {
            return (
                winner,
                format!("Dominancia estructural: {reason}"),
                (score_of(winner) / 100.0).min(CAP_DOMINANCE),
            );
        }
    }

    // 2) Single candidate.
    if candidates.len() == 1 {
        let c = candidates[0];
        return (
            c.doc_type,
            format!("Único candidato con score {:.1} >= umbral", c.score),
            (c.score / 100.0).min(CAP_SINGLE),
        );
    }

    let top1 = candidates[0];
    let top2 = candidates[1];

    // 3) Clear leader.
    if top1.score - top2.score > TIE_GAP {
        return (
            top1.doc_type,
            format!("Score más alto: {:.1} vs {:.1}", top1.score, top2.score),
            (top1.score / 100.0).min(CAP_CLEAR_LEADER),
        );
    }

    // 4) Near tie → conflict-resolution rules.
    let (winner, reason) = resolve_conflict(cfg, top1, top2);
    (
        winner,
        format!("{reason} (empate cercano, aplicada regla de conflicto)"),
        (score_of(winner) / 100.0).min(CAP_NEAR_TIE),
    )
}

/// First dominance rule whose required patterns all matched anywhere in the
/// document. The caller still requires the winner to be a gated candidate.
fn dominance_winner<'a>(cfg: &'a DetectionConfig, bag: &FeatureBag) -> Option<(DocType, &'a str)> {
    let mut matched_anywhere: BTreeSet<&str> = BTreeSet::new();
    for t in &cfg.types {
        matched_anywhere.extend(patterns::matched(&t.structural_patterns, bag));
    }

    cfg.dominance_rules
        .iter()
        .find(|rule| {
            rule.requires
                .iter()
                .all(|p| matched_anywhere.contains(p.as_str()))
        })
        .map(|rule| (rule.winner, rule.reason.as_str()))
}

/// Near-tie resolution between two candidates. The rule table is keyed by
/// ordered pairs; the reversed key is honored once with the favor lists
/// swapped, and absence of both keys falls back to the higher raw score.
fn resolve_conflict<'a>(
    cfg: &DetectionConfig,
    t1: &'a TypeScore,
    t2: &'a TypeScore,
) -> (DocType, String) {
    if let Some((rule, favor_1, favor_2)) = find_conflict_rule(cfg, t1.doc_type, t2.doc_type) {
        let count_1 = favored_count(favor_1, &t1.evidence);
        let count_2 = favored_count(favor_2, &t2.evidence);
        if count_1 > count_2 {
            return (t1.doc_type, format!("Resolución de conflicto: {rule}"));
        }
        if count_2 > count_1 {
            return (t2.doc_type, format!("Resolución de conflicto: {rule}"));
        }
        // Equal favored-signal counts: fall through to raw score.
    }

    if t1.score >= t2.score {
        (
            t1.doc_type,
            format!("Score más alto ({:.1} vs {:.1})", t1.score, t2.score),
        )
    } else {
        (
            t2.doc_type,
            format!("Score más alto ({:.1} vs {:.1})", t2.score, t1.score),
        )
    }
}

/// Returns `(rule_text, favor_for_first, favor_for_second)` with the favor
/// lists oriented to the caller's argument order.
fn find_conflict_rule(
    cfg: &DetectionConfig,
    first: DocType,
    second: DocType,
) -> Option<(&str, &[String], &[String])> {
    cfg.conflict_rules.iter().find_map(|r: &ConflictRule| {
        if r.a == first && r.b == second {
            Some((r.rule.as_str(), r.favor_a.as_slice(), r.favor_b.as_slice()))
        } else if r.a == second && r.b == first {
            Some((r.rule.as_str(), r.favor_b.as_slice(), r.favor_a.as_slice()))
        } else {
            None
        }
    })
}

fn favored_count(favor: &[String], evidence: &[String]) -> usize {
    favor
        .iter()
        .filter(|sig| evidence.iter().any(|e| e.contains(sig.as_str())))
        .count()
}

/// Filename-vs-content disagreement, checked independently of the winner
/// path. First config-ordered type whose filename tokens intersect the
/// document's filename tokens is the filename-suggested type.
fn check_filename_conflict(
    cfg: &DetectionConfig,
    bag: &FeatureBag,
    scores: &[TypeScore],
    result: &mut DetectionResult,
) {
    let suggested = cfg.types.iter().find_map(|t| {
        t.filename_tokens
            .iter()
            .any(|tok| bag.filename_tokens.contains(&tok.to_lowercase()))
            .then_some(t.id)
    });

    let Some(suggested) = suggested else { return };
    if suggested == result.tipo_detectado {
        return;
    }

    let score_of = |t: DocType| {
        scores
            .iter()
            .find(|ts| ts.doc_type == t)
            .map(|ts| ts.score)
            .unwrap_or(0.0)
    };
    let evidence_count = scores
        .iter()
        .find(|ts| ts.doc_type == result.tipo_detectado)
        .map(|ts| ts.evidence.len())
        .unwrap_or(0);

    let policy = &cfg.filename_vs_content;
    let score_diff = (score_of(result.tipo_detectado) - score_of(suggested)).abs();

    if score_diff > policy.threshold_difference
        && evidence_count >= policy.min_strong_indicators_content
    {
        result.conflict_name_vs_content = true;
        result.filename_suggested_type = Some(suggested);
        result.razon.push_str(&format!(
            " | CONFLICTO: nombre sugiere {suggested} pero contenido gana por {score_diff:.1} puntos"
        ));
    }
}

/// Structural-pattern re-check for the winner only; explanation, not scoring.
fn secondary_signals(cfg: &DetectionConfig, bag: &FeatureBag, winner: DocType) -> Vec<String> {
    let Some(type_cfg) = cfg.type_config(winner) else {
        return Vec::new();
    };
    patterns::matched(&type_cfg.structural_patterns, bag)
        .into_iter()
        .map(|p| format!("structural:{p}"))
        .take(5)
        .collect()
}

fn top3(scores: &[TypeScore]) -> Vec<TopCandidate> {
    let mut sorted: Vec<&TypeScore> = scores.iter().collect();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
    sorted
        .iter()
        .take(3)
        .map(|ts| TopCandidate {
            doc_type: ts.doc_type,
            score: round1(ts.score),
            why: format!(
                "{} señales: {}",
                ts.evidence.len(),
                ts.evidence
                    .iter()
                    .take(3)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
        .collect()
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
