//! OpenAI provider (Chat Completions API) for both collaborator capabilities.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;

use super::prompt::{judge_prompt, parse_answer, tiebreak_prompt, JUDGE_SYSTEM, TIEBREAK_SYSTEM};
use super::{
    CriterionJudge, JudgeContext, Judgment, TiebreakAnswer, TiebreakCandidate, TiebreakResolver,
};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiCollaborator {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiCollaborator {
    pub fn new(model_override: Option<&str>, api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("doc-compliance-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model: model_override.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, CollaboratorError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.1,
            max_tokens: 500,
        };

        let resp = self
            .http
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CollaboratorError::Transport(format!(
                "openai returned {}",
                resp.status()
            )));
        }
        let body: Resp = resp.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CollaboratorError::Malformed("empty choices".into()))
    }
}

#[async_trait]
impl TiebreakResolver for OpenAiCollaborator {
    async fn resolve_tie(
        &self,
        a: &TiebreakCandidate,
        b: &TiebreakCandidate,
    ) -> Result<TiebreakAnswer, CollaboratorError> {
        let raw = self
            .complete(TIEBREAK_SYSTEM, &tiebreak_prompt(a, b))
            .await?;
        parse_answer(&raw)
    }
}

#[async_trait]
impl CriterionJudge for OpenAiCollaborator {
    async fn judge(&self, ctx: &JudgeContext) -> Result<Judgment, CollaboratorError> {
        let raw = self.complete(JUDGE_SYSTEM, &judge_prompt(ctx)).await?;
        parse_answer(&raw)
    }
}
