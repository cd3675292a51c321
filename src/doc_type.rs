//! Deliverable document types recognized by the government rubric.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Typed identifier for a deliverable type. Serialized with the canonical
/// identifiers used by the rubric and the detection config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocType {
    /// Documento Técnico de Migración.
    #[serde(rename = "DTM")]
    Dtm,
    /// Documento de Solución Propuesta.
    #[serde(rename = "DSP")]
    Dsp,
    /// Documento Técnico de Configuración.
    #[serde(rename = "DTC")]
    Dtc,
    /// Definition of Done / checklist de entrega.
    #[serde(rename = "DoD")]
    Dod,
    #[serde(rename = "PLAN_PRUEBAS_EVIDENCIA")]
    PlanPruebasEvidencia,
    #[serde(rename = "RUNBOOK_MANUAL_OPERACION")]
    RunbookManualOperacion,
    #[serde(rename = "SOPORTE_EVOLUTIVO_RCA")]
    SoporteEvolutivoRca,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl DocType {
    /// All concrete (non-UNKNOWN) types, in the canonical config order.
    /// Order matters: filename-suggestion lookup takes the first match.
    pub const CONCRETE: [DocType; 7] = [
        DocType::Dtm,
        DocType::Dsp,
        DocType::Dtc,
        DocType::Dod,
        DocType::PlanPruebasEvidencia,
        DocType::RunbookManualOperacion,
        DocType::SoporteEvolutivoRca,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Dtm => "DTM",
            DocType::Dsp => "DSP",
            DocType::Dtc => "DTC",
            DocType::Dod => "DoD",
            DocType::PlanPruebasEvidencia => "PLAN_PRUEBAS_EVIDENCIA",
            DocType::RunbookManualOperacion => "RUNBOOK_MANUAL_OPERACION",
            DocType::SoporteEvolutivoRca => "SOPORTE_EVOLUTIVO_RCA",
            DocType::Unknown => "UNKNOWN",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, DocType::Unknown)
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DTM" => Ok(DocType::Dtm),
            "DSP" => Ok(DocType::Dsp),
            "DTC" => Ok(DocType::Dtc),
            "DoD" => Ok(DocType::Dod),
            "PLAN_PRUEBAS_EVIDENCIA" => Ok(DocType::PlanPruebasEvidencia),
            "RUNBOOK_MANUAL_OPERACION" => Ok(DocType::RunbookManualOperacion),
            "SOPORTE_EVOLUTIVO_RCA" => Ok(DocType::SoporteEvolutivoRca),
            "UNKNOWN" => Ok(DocType::Unknown),
            other => Err(ConfigError::UnknownType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_canonical_identifiers() {
        for t in DocType::CONCRETE {
            assert_eq!(t.as_str().parse::<DocType>().unwrap(), t);
        }
        assert_eq!("UNKNOWN".parse::<DocType>().unwrap(), DocType::Unknown);
    }

    #[test]
    fn rejects_unknown_identifier_at_parse_time() {
        assert!("DTX".parse::<DocType>().is_err());
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&DocType::PlanPruebasEvidencia).unwrap();
        assert_eq!(json, "\"PLAN_PRUEBAS_EVIDENCIA\"");
    }
}
