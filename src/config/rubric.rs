//! Rubric configuration: per-type criterion checklists and the penalty table,
//! loaded from JSON and validated eagerly.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::doc_type::DocType;
use crate::error::ConfigError;
use crate::report::Severidad;

/// A single weighted rubric checklist item for a document type.
#[derive(Debug, Clone, Deserialize)]
pub struct CriterioConfig {
    pub id: String,
    pub nombre: String,
    pub peso: u32,
    pub descripcion: String,
    #[serde(default)]
    pub evidencia_requerida: Vec<String>,
    pub severidad_si_falta: Severidad,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Penalizacion {
    pub penalizacion: f64,
    #[serde(default)]
    pub descripcion: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TipoRubrica {
    criterios: Vec<CriterioConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RubricConfig {
    #[serde(rename = "tipos_documentos_entregables")]
    tipos: HashMap<DocType, TipoRubrica>,
    #[serde(rename = "penalizaciones_tipicas", default)]
    penalizaciones: HashMap<String, Penalizacion>,
}

static BUILTIN: Lazy<RubricConfig> = Lazy::new(|| {
    RubricConfig::from_json_str(include_str!("../../config/rubrica.json"))
        .expect("valid builtin rubric config")
});

impl RubricConfig {
    /// The embedded default rubric shipped with the crate.
    pub fn builtin() -> &'static RubricConfig {
        &BUILTIN
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: RubricConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Ordered criteria for a concrete type. Validation guarantees every
    /// concrete type has a non-empty list, so a miss yields an empty slice
    /// only for UNKNOWN.
    pub fn criterios_for(&self, doc_type: DocType) -> &[CriterioConfig] {
        self.tipos
            .get(&doc_type)
            .map(|t| t.criterios.as_slice())
            .unwrap_or(&[])
    }

    /// Flat penalty for a named penalty kind, if configured.
    pub fn penalizacion(&self, kind: &str) -> Option<&Penalizacion> {
        self.penalizaciones.get(kind)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tipos.contains_key(&DocType::Unknown) {
            return Err(ConfigError::Invalid(
                "UNKNOWN cannot carry rubric criteria".into(),
            ));
        }
        for doc_type in DocType::CONCRETE {
            let tipo = self
                .tipos
                .get(&doc_type)
                .ok_or_else(|| ConfigError::UnknownType(doc_type.to_string()))?;
            if tipo.criterios.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "type {doc_type} has an empty criteria list"
                )));
            }
            for c in &tipo.criterios {
                if c.peso == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "criterio {} has non-positive weight",
                        c.id
                    )));
                }
                if tipo.criterios.iter().filter(|o| o.id == c.id).count() > 1 {
                    return Err(ConfigError::Invalid(format!(
                        "duplicate criterio id {}",
                        c.id
                    )));
                }
            }
        }
        for (name, p) in &self.penalizaciones {
            if !p.penalizacion.is_finite() || p.penalizacion > 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "penalizacion `{name}` must be a finite non-positive delta"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rubric_covers_every_concrete_type() {
        let cfg = RubricConfig::builtin();
        for t in DocType::CONCRETE {
            assert!(!cfg.criterios_for(t).is_empty(), "no criteria for {t}");
        }
        assert!(cfg.criterios_for(DocType::Unknown).is_empty());
        assert!(cfg.penalizacion("falta_evidencia_critica").is_some());
    }

    #[test]
    fn rejects_missing_type() {
        let json = r#"{"tipos_documentos_entregables": {
            "DTM": {"criterios": [{"id": "C1", "nombre": "x", "peso": 10,
                "descripcion": "d", "severidad_si_falta": "menor"}]}
        }}"#;
        assert!(matches!(
            RubricConfig::from_json_str(json),
            Err(ConfigError::UnknownType(_))
        ));
    }

    #[test]
    fn rejects_zero_weight_criterio() {
        let mut json: serde_json::Value =
            serde_json::from_str(include_str!("../../config/rubrica.json")).unwrap();
        json["tipos_documentos_entregables"]["DTM"]["criterios"][0]["peso"] =
            serde_json::json!(0);
        assert!(matches!(
            RubricConfig::from_json_str(&json.to_string()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_positive_penalty_delta() {
        let mut json: serde_json::Value =
            serde_json::from_str(include_str!("../../config/rubrica.json")).unwrap();
        json["penalizaciones_tipicas"]["falta_evidencia_critica"]["penalizacion"] =
            serde_json::json!(10);
        assert!(matches!(
            RubricConfig::from_json_str(&json.to_string()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
