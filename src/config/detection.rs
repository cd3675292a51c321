//! Detection configuration: per-type signals, weights, thresholds, dominance
//! and conflict rules, loaded from TOML and validated eagerly.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::doc_type::DocType;
use crate::error::ConfigError;
use crate::patterns;

/// Signal weights for the 0–100 type score.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalWeights {
    pub filename_exact_match: f64,
    pub strong_indicator_heading: f64,
    pub strong_indicator_table: f64,
    pub keyword_density_high: f64,
    pub keyword_density_medium: f64,
    pub structural_pattern: f64,
}

/// Detection signals for one concrete document type.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeDetection {
    pub id: DocType,
    /// Candidate gate: minimum score for this type to be considered at all.
    pub threshold: f64,
    #[serde(default)]
    pub filename_tokens: Vec<String>,
    #[serde(default)]
    pub heading_indicators: Vec<String>,
    #[serde(default)]
    pub table_indicators: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub structural_patterns: Vec<String>,
}

/// Structural dominance: if all `requires` patterns matched anywhere in the
/// document, `winner` takes the classification outright (when gated).
#[derive(Debug, Clone, Deserialize)]
pub struct DominanceRule {
    pub requires: Vec<String>,
    pub winner: DocType,
    pub reason: String,
}

/// Near-tie resolution between an ordered type pair.
#[derive(Debug, Clone, Deserialize)]
pub struct ConflictRule {
    pub a: DocType,
    pub b: DocType,
    #[serde(default)]
    pub favor_a: Vec<String>,
    #[serde(default)]
    pub favor_b: Vec<String>,
    pub rule: String,
}

/// Policy for flagging filename-vs-content disagreement.
#[derive(Debug, Clone, Deserialize)]
pub struct FilenamePolicy {
    pub threshold_difference: f64,
    pub min_strong_indicators_content: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    pub scoring: SignalWeights,
    pub filename_vs_content: FilenamePolicy,
    #[serde(default)]
    pub unknown_questions: Vec<String>,
    pub types: Vec<TypeDetection>,
    #[serde(default)]
    pub dominance_rules: Vec<DominanceRule>,
    #[serde(default)]
    pub conflict_rules: Vec<ConflictRule>,
}

static BUILTIN: Lazy<DetectionConfig> = Lazy::new(|| {
    DetectionConfig::from_toml_str(include_str!("../../config/detection.toml"))
        .expect("valid builtin detection config")
});

impl DetectionConfig {
    /// The embedded default config shipped with the crate.
    pub fn builtin() -> &'static DetectionConfig {
        &BUILTIN
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let cfg: DetectionConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Per-type lookup. Valid configs carry every type referenced by rules,
    /// so a miss here is a programming error in the caller.
    pub fn type_config(&self, doc_type: DocType) -> Option<&TypeDetection> {
        self.types.iter().find(|t| t.id == doc_type)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.types.is_empty() {
            return Err(ConfigError::Invalid("no document types configured".into()));
        }

        let weights = [
            self.scoring.filename_exact_match,
            self.scoring.strong_indicator_heading,
            self.scoring.strong_indicator_table,
            self.scoring.keyword_density_high,
            self.scoring.keyword_density_medium,
            self.scoring.structural_pattern,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::Invalid(
                "signal weights must be finite and non-negative".into(),
            ));
        }

        for t in &self.types {
            if t.id.is_unknown() {
                return Err(ConfigError::Invalid(
                    "UNKNOWN cannot carry detection signals".into(),
                ));
            }
            if self.types.iter().filter(|o| o.id == t.id).count() > 1 {
                return Err(ConfigError::Invalid(format!(
                    "duplicate type entry for {}",
                    t.id
                )));
            }
            if !(0.0..=100.0).contains(&t.threshold) {
                return Err(ConfigError::Invalid(format!(
                    "threshold for {} must be in [0,100]",
                    t.id
                )));
            }
            for p in &t.structural_patterns {
                if !patterns::is_known(p) {
                    return Err(ConfigError::UnknownPattern {
                        doc_type: t.id.to_string(),
                        pattern: p.clone(),
                    });
                }
            }
        }

        for rule in &self.dominance_rules {
            if self.type_config(rule.winner).is_none() {
                return Err(ConfigError::UnknownType(rule.winner.to_string()));
            }
            for p in &rule.requires {
                if !patterns::is_known(p) {
                    return Err(ConfigError::UnknownPattern {
                        doc_type: rule.winner.to_string(),
                        pattern: p.clone(),
                    });
                }
            }
        }

        for rule in &self.conflict_rules {
            for side in [rule.a, rule.b] {
                if self.type_config(side).is_none() {
                    return Err(ConfigError::UnknownType(side.to_string()));
                }
            }
            if rule.a == rule.b {
                return Err(ConfigError::Invalid(format!(
                    "conflict rule pairs {} with itself",
                    rule.a
                )));
            }
        }

        // Serde defaults this to empty, which would silently ship UNKNOWN
        // results with no clarifying questions. Catch it at load time.
        if self.unknown_questions.is_empty() {
            return Err(ConfigError::Invalid(
                "unknown_questions must not be empty".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_loads_and_validates() {
        let cfg = DetectionConfig::builtin();
        assert_eq!(cfg.types.len(), DocType::CONCRETE.len());
        assert!(!cfg.unknown_questions.is_empty());
        assert!(cfg.type_config(DocType::Dtm).is_some());
        assert!(cfg.type_config(DocType::Unknown).is_none());
    }

    #[test]
    fn rejects_unknown_pattern_name() {
        let toml_str = r#"
            [scoring]
            filename_exact_match = 20.0
            strong_indicator_heading = 15.0
            strong_indicator_table = 10.0
            keyword_density_high = 15.0
            keyword_density_medium = 8.0
            structural_pattern = 10.0

            [filename_vs_content]
            threshold_difference = 15.0
            min_strong_indicators_content = 2

            [[types]]
            id = "DTM"
            threshold = 40.0
            structural_patterns = ["tiene_algo_inexistente"]
        "#;
        let err = DetectionConfig::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPattern { .. }));
    }

    #[test]
    fn rejects_dominance_winner_without_type_entry() {
        let toml_str = r#"
            [scoring]
            filename_exact_match = 20.0
            strong_indicator_heading = 15.0
            strong_indicator_table = 10.0
            keyword_density_high = 15.0
            keyword_density_medium = 8.0
            structural_pattern = 10.0

            [filename_vs_content]
            threshold_difference = 15.0
            min_strong_indicators_content = 2

            [[types]]
            id = "DTM"
            threshold = 40.0

            [[dominance_rules]]
            requires = ["tiene_seccion_rollback"]
            winner = "DTC"
            reason = "sin entrada de tipo"
        "#;
        let err = DetectionConfig::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownType(_)));
    }

    #[test]
    fn rejects_questions_buried_inside_a_table() {
        // A top-level key written below a table header parses as an ignored
        // table key; the load-time check refuses the resulting empty list.
        let toml_str = r#"
            [scoring]
            filename_exact_match = 20.0
            strong_indicator_heading = 15.0
            strong_indicator_table = 10.0
            keyword_density_high = 15.0
            keyword_density_medium = 8.0
            structural_pattern = 10.0

            [filename_vs_content]
            threshold_difference = 15.0
            min_strong_indicators_content = 2
            unknown_questions = ["¿Qué tipo de documento es?"]

            [[types]]
            id = "DTM"
            threshold = 40.0
        "#;
        let err = DetectionConfig::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let toml_str = r#"
            [scoring]
            filename_exact_match = 20.0
            strong_indicator_heading = 15.0
            strong_indicator_table = 10.0
            keyword_density_high = 15.0
            keyword_density_medium = 8.0
            structural_pattern = 10.0

            [filename_vs_content]
            threshold_difference = 15.0
            min_strong_indicators_content = 2

            [[types]]
            id = "DTM"
            threshold = 140.0
        "#;
        assert!(matches!(
            DetectionConfig::from_toml_str(toml_str),
            Err(ConfigError::Invalid(_))
        ));
    }
}
