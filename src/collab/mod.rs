//! Collaborator contracts: the two narrow capabilities the core delegates to
//! an external generative model — classification tiebreak and per-criterion
//! judgment. Both call sites have deterministic fallbacks; a collaborator
//! being slow, wrong or down never aborts a run.

pub mod anthropic;
pub mod openai;
mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::doc_type::DocType;
use crate::error::{CollaboratorError, ConfigError};
use crate::report::CriterioEstado;

/// Summary of one tied candidate handed to the tiebreak collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct TiebreakCandidate {
    pub doc_type: DocType,
    pub score: f64,
    /// Top evidence strings (≤3) backing this candidate.
    pub evidence: Vec<String>,
}

/// Answer from the tiebreak collaborator. Anything whose `winner` is not one
/// of the two candidates is discarded by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct TiebreakAnswer {
    pub winner: DocType,
    #[serde(default)]
    pub reasoning: String,
}

/// Context handed to the criterion judge.
#[derive(Debug, Clone, Serialize)]
pub struct JudgeContext {
    pub criterio_id: String,
    pub nombre: String,
    pub descripcion: String,
    pub evidencia_requerida: Vec<String>,
    /// Evidence found by the lexical search, pre-rendered as
    /// "location: snippet" lines.
    pub evidencia_encontrada: Vec<String>,
    /// Free-text answer supplied by the user for this criterion, if any.
    pub respuesta_usuario: Option<String>,
    /// Leading document sections, pre-rendered for context.
    pub secciones: Vec<String>,
}

/// Judgment for one criterion. The anti-hallucination contract applies:
/// CUMPLE/PARCIAL only with cited evidence, no evidence forces NO, NA needs
/// an explicit justification.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Judgment {
    pub estado: CriterioEstado,
    pub justificacion: String,
}

/// Best-effort classification tiebreak.
#[async_trait]
pub trait TiebreakResolver: Send + Sync {
    async fn resolve_tie(
        &self,
        a: &TiebreakCandidate,
        b: &TiebreakCandidate,
    ) -> Result<TiebreakAnswer, CollaboratorError>;
}

/// Per-criterion judge.
#[async_trait]
pub trait CriterionJudge: Send + Sync {
    async fn judge(&self, ctx: &JudgeContext) -> Result<Judgment, CollaboratorError>;
}

pub type SharedTiebreak = Arc<dyn TiebreakResolver>;
pub type SharedJudge = Arc<dyn CriterionJudge>;

/// Always fails with `Disabled`; used when no provider is configured. The
/// callers' fallbacks (rule-based winner, estado=NO) then apply.
pub struct DisabledCollaborator;

#[async_trait]
impl TiebreakResolver for DisabledCollaborator {
    async fn resolve_tie(
        &self,
        _a: &TiebreakCandidate,
        _b: &TiebreakCandidate,
    ) -> Result<TiebreakAnswer, CollaboratorError> {
        Err(CollaboratorError::Disabled)
    }
}

#[async_trait]
impl CriterionJudge for DisabledCollaborator {
    async fn judge(&self, _ctx: &JudgeContext) -> Result<Judgment, CollaboratorError> {
        Err(CollaboratorError::Disabled)
    }
}

/// Deterministic collaborator for tests and local runs: picks the
/// higher-score candidate and judges from the lexical evidence alone
/// (all keywords found → CUMPLE, some → PARCIAL, none → NO).
pub struct MockCollaborator;

#[async_trait]
impl TiebreakResolver for MockCollaborator {
    async fn resolve_tie(
        &self,
        a: &TiebreakCandidate,
        b: &TiebreakCandidate,
    ) -> Result<TiebreakAnswer, CollaboratorError> {
        let winner = if a.score >= b.score { a } else { b };
        Ok(TiebreakAnswer {
            winner: winner.doc_type,
            reasoning: "mock: higher score".into(),
        })
    }
}

#[async_trait]
impl CriterionJudge for MockCollaborator {
    async fn judge(&self, ctx: &JudgeContext) -> Result<Judgment, CollaboratorError> {
        let required = ctx.evidencia_requerida.len();
        let found = ctx.evidencia_encontrada.len();
        let estado = if required == 0 || found >= required {
            CriterioEstado::Cumple
        } else if found > 0 || ctx.respuesta_usuario.is_some() {
            CriterioEstado::Parcial
        } else {
            CriterioEstado::No
        };
        Ok(Judgment {
            estado,
            justificacion: format!("mock: {found}/{required} evidencias requeridas encontradas"),
        })
    }
}

/// Provider configuration. `api_key = "ENV"` resolves the key from the
/// provider's environment variable at build time.
#[derive(Debug, Clone, Deserialize)]
pub struct CollabConfig {
    pub enabled: bool,
    /// "openai" | "anthropic" | "mock" (case-insensitive)
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

fn default_api_key() -> String {
    "ENV".into()
}

/// One object serving both capabilities, as every provider implements both.
pub trait Collaborator: TiebreakResolver + CriterionJudge {}
impl<T: TiebreakResolver + CriterionJudge> Collaborator for T {}

pub type SharedCollaborator = Arc<dyn Collaborator>;

/// Build a collaborator from config. Disabled config yields the disabled
/// client; an unknown provider is a `ConfigError` (fail at startup, not on
/// the first tied classification).
pub fn build_collaborator(config: &CollabConfig) -> Result<SharedCollaborator, ConfigError> {
    if !config.enabled {
        return Ok(Arc::new(DisabledCollaborator));
    }
    match config.provider.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(openai::OpenAiCollaborator::new(
            config.model.as_deref(),
            resolve_key(config, "OPENAI_API_KEY")?,
        ))),
        "anthropic" => Ok(Arc::new(anthropic::AnthropicCollaborator::new(
            config.model.as_deref(),
            resolve_key(config, "ANTHROPIC_API_KEY")?,
        ))),
        "mock" => Ok(Arc::new(MockCollaborator)),
        other => Err(ConfigError::Invalid(format!(
            "unsupported collaborator provider `{other}`"
        ))),
    }
}

fn resolve_key(config: &CollabConfig, env_var: &str) -> Result<String, ConfigError> {
    if config.api_key.trim().eq_ignore_ascii_case("env") {
        std::env::var(env_var)
            .map_err(|_| ConfigError::Invalid(format!("missing {env_var} env var")))
    } else {
        Ok(config.api_key.clone())
    }
}
