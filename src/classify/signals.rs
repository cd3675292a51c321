//! Signal scorer: bounded per-type scores from weighted signals.
//!
//! Deterministic and side-effect free. Evidence strings are retained in call
//! order and tagged by kind — the order is significant, since the resolver's
//! `why` explanations truncate to the first 3 entries.

use crate::config::{DetectionConfig, TypeDetection};
use crate::doc_type::DocType;
use crate::features::FeatureBag;
use crate::patterns;

/// Score for one candidate type, clamped to [0,100], with its evidence trail.
#[derive(Debug, Clone)]
pub struct TypeScore {
    pub doc_type: DocType,
    pub score: f64,
    pub evidence: Vec<String>,
    /// At least one strong indicator fired (heading/table hit, or a keyword
    /// occurring ≥2 times). Hard gate for candidacy in the resolver.
    pub strong: bool,
}

/// Strong-indicator hits for one type: `heading:…`, `table:…` and
/// `keyword:…(Nx)` tags, in check order.
pub fn strong_indicators(type_cfg: &TypeDetection, bag: &FeatureBag) -> Vec<String> {
    let mut found = Vec::new();

    for indicator in &type_cfg.heading_indicators {
        let needle = indicator.to_lowercase();
        if bag.headings.iter().any(|h| h.contains(&needle)) {
            found.push(format!("heading:{indicator}"));
        }
    }

    // Table keywords are checked against the full text, not actual table
    // cells. Weak proxy; thresholds are calibrated against it.
    for indicator in &type_cfg.table_indicators {
        if bag.full_text.contains(&indicator.to_lowercase()) {
            found.push(format!("table:{indicator}"));
        }
    }

    for keyword in &type_cfg.keywords {
        let count = bag.count_in_text(&keyword.to_lowercase());
        if count >= 2 {
            found.push(format!("keyword:{keyword}({count}x)"));
        }
    }

    found
}

/// Compute the bounded score and evidence trail for a single type.
pub fn score_type(cfg: &DetectionConfig, type_cfg: &TypeDetection, bag: &FeatureBag) -> TypeScore {
    let w = &cfg.scoring;
    let mut score = 0.0;
    let mut evidence = Vec::new();

    // 1) Filename exact match — at most once per type.
    for token in &type_cfg.filename_tokens {
        if bag.filename_tokens.contains(&token.to_lowercase()) {
            score += w.filename_exact_match;
            evidence.push(format!("filename_match:{token}"));
            break;
        }
    }

    // 2) Strong indicators.
    let strong_found = strong_indicators(type_cfg, bag);
    let strong = !strong_found.is_empty();
    if strong {
        let headings: Vec<&String> = strong_found
            .iter()
            .filter(|e| e.starts_with("heading:"))
            .collect();
        if !headings.is_empty() {
            score += w.strong_indicator_heading * headings.len().min(3) as f64;
            evidence.extend(headings.iter().take(3).map(|e| (*e).clone()));
        }

        let tables: Vec<&String> = strong_found
            .iter()
            .filter(|e| e.starts_with("table:"))
            .collect();
        if !tables.is_empty() {
            score += w.strong_indicator_table * tables.len().min(2) as f64;
            evidence.extend(tables.iter().take(2).map(|e| (*e).clone()));
        }

        let keywords = strong_found
            .iter()
            .filter(|e| e.starts_with("keyword:"))
            .count();
        if keywords >= 5 {
            score += w.keyword_density_high;
            evidence.push(format!("high_keyword_density:{keywords}"));
        } else if keywords >= 2 {
            score += w.keyword_density_medium;
            evidence.push(format!("medium_keyword_density:{keywords}"));
        }
    }

    // 3) Structural patterns.
    let matched = patterns::matched(&type_cfg.structural_patterns, bag);
    if !matched.is_empty() {
        score += w.structural_pattern * matched.len().min(3) as f64;
        evidence.extend(matched.iter().take(3).map(|p| format!("pattern:{p}")));
    }

    TypeScore {
        doc_type: type_cfg.id,
        score: score.min(100.0),
        evidence,
        strong,
    }
}

/// Score every configured type, in config order.
pub fn score_all(cfg: &DetectionConfig, bag: &FeatureBag) -> Vec<TypeScore> {
    cfg.types.iter().map(|t| score_type(cfg, t, bag)).collect()
}
