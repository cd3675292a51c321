//! Evaluation output types: criterion states, findings, questions, potential
//! scores and the aggregate `EvaluationResult`. These are the persisted
//! shapes — field names are part of the exported contract and must stay
//! byte-for-byte reproducible given identical inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::doc_type::DocType;
use crate::outline::EvidenceRef;

/// Resultado de un criterio tras el juicio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CriterioEstado {
    Cumple,
    Parcial,
    No,
    Na,
}

impl CriterioEstado {
    /// Point conversion is deterministic given the state: CUMPLE → full
    /// weight, PARCIAL → half, NO/NA → 0. No other partial credit exists.
    pub fn puntos(&self, peso: u32) -> f64 {
        match self {
            CriterioEstado::Cumple => peso as f64,
            CriterioEstado::Parcial => peso as f64 * 0.5,
            CriterioEstado::No | CriterioEstado::Na => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severidad {
    Bloqueante,
    Mayor,
    Menor,
    Sugerencia,
}

impl Severidad {
    /// Sort rank: bloqueante first.
    pub fn rank(&self) -> u8 {
        match self {
            Severidad::Bloqueante => 0,
            Severidad::Mayor => 1,
            Severidad::Menor => 2,
            Severidad::Sugerencia => 3,
        }
    }

    /// Fixed severity → priority map.
    pub fn prioridad(&self) -> Prioridad {
        match self {
            Severidad::Bloqueante => Prioridad::P0,
            Severidad::Mayor => Prioridad::P1,
            Severidad::Menor => Prioridad::P2,
            Severidad::Sugerencia => Prioridad::P3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Prioridad {
    P0,
    P1,
    P2,
    P3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenciaTipo {
    Found,
    Missing,
    Inconsistent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "APROBADO")]
    Aprobado,
    #[serde(rename = "REQUIERE_CORRECCION")]
    RequiereCorreccion,
    #[serde(rename = "RECHAZADO")]
    Rechazado,
}

/// Resultado de evaluar un criterio de la rúbrica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterioEvaluacion {
    pub criterio_id: String,
    pub nombre: String,
    pub peso: u32,
    pub estado: CriterioEstado,
    pub puntos_obtenidos: f64,
    #[serde(default)]
    pub evidencia: Vec<EvidenceRef>,
    pub justificacion: String,
    pub severidad_si_falta: Severidad,
}

/// Hard precondition whose failure forces outright rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailFast {
    pub code: String,
    pub name: String,
    pub active: bool,
    pub evidencia: String,
    pub explicacion: String,
}

/// Hallazgo: a gap derived from a criterion evaluation or a classification
/// conflict, with remediation guidance and estimated point impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hallazgo {
    pub id: String,
    pub criterio_id: String,
    pub severidad: Severidad,
    pub prioridad: Prioridad,
    pub titulo: String,
    pub evidencia_tipo: EvidenciaTipo,
    pub evidencia_detalle: String,
    pub recomendacion: String,
    pub que_agregar: String,
    pub donde_insertar: String,
    pub ejemplo_texto: String,
    pub impacto_estimado: f64,
}

/// Clarifying question synthesized from a high-priority finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pregunta {
    pub id: String,
    pub pregunta: String,
    pub prioridad: Prioridad,
    pub categoria: String,
    pub por_que_importa: String,
    pub si_no_responde: String,
    pub criterio_relacionado: String,
}

/// Projected scores if priority tiers of findings were remediated.
/// All fields are capped at 100 and monotonically ≥ `actual`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePotencial {
    pub actual: f64,
    pub si_corrige_p0: f64,
    pub si_corrige_p0_p1: f64,
    pub si_corrige_todo: f64,
}

/// Flat penalty applied during the penalty pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenalizacionAplicada {
    pub tipo: String,
    pub criterio: String,
    pub penalizacion: f64,
}

/// Aggregate result of one evaluation run. A re-evaluation after user answers
/// replaces the whole record; it is never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub run_id: String,
    pub doc_type: DocType,
    pub doc_type_confidence: f64,
    pub score: f64,
    pub decision: Decision,
    pub fail_fast: Vec<FailFast>,
    pub criterios: Vec<CriterioEvaluacion>,
    pub hallazgos: Vec<Hallazgo>,
    pub preguntas: Vec<Pregunta>,
    pub score_potencial: ScorePotencial,
    #[serde(default)]
    pub penalizaciones_aplicadas: Vec<PenalizacionAplicada>,
    pub peso_total_aplicable: f64,
    pub timestamp: DateTime<Utc>,
}
