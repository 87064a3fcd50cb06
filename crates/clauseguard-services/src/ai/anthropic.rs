//! Anthropic Messages API client for contract classification and analysis.

use async_trait::async_trait;
use clauseguard_core::models::AnalysisOutcome;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use super::prompt::{analysis_prompt, detection_prompt, parse_analysis, parse_contract_type};
use super::{AiError, ContractAi};

const API_BASE: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// Classification replies are a few words.
const DETECTION_MAX_TOKENS: u32 = 64;

pub struct AnthropicContractAi {
    http_client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl Debug for AnthropicContractAi {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AnthropicContractAi")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<MessageParam>,
}

#[derive(Debug, Serialize)]
struct MessageParam {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlockResponse>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlockResponse {
    Text { text: String },
    #[serde(other)]
    Other,
}

impl AnthropicContractAi {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Result<Self, AiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AiError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
        })
    }

    /// Point the client at a different API root (proxies, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Send a single-turn prompt and return the concatenated text blocks.
    async fn complete(&self, prompt: String, max_tokens: u32) -> Result<String, AiError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: vec![MessageParam {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AiError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(format!("Invalid Messages API response: {}", e)))?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                model = %self.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Anthropic usage"
            );
        }

        let text = parsed
            .content
            .into_iter()
            .filter_map(|b| match b {
                ContentBlockResponse::Text { text } => Some(text),
                ContentBlockResponse::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(AiError::Empty);
        }
        Ok(text)
    }
}

#[async_trait]
impl ContractAi for AnthropicContractAi {
    async fn detect_type(&self, contract_text: &str) -> Result<String, AiError> {
        let reply = self
            .complete(detection_prompt(contract_text), DETECTION_MAX_TOKENS)
            .await?;
        let contract_type = parse_contract_type(&reply)?;
        tracing::info!(contract_type = %contract_type, "Detected contract type");
        Ok(contract_type)
    }

    async fn analyze(
        &self,
        contract_text: &str,
        contract_type: &str,
    ) -> Result<AnalysisOutcome, AiError> {
        let reply = self
            .complete(analysis_prompt(contract_text, contract_type), self.max_tokens)
            .await?;
        let outcome = parse_analysis(&reply)?;
        tracing::info!(
            contract_type = %contract_type,
            overall_score = outcome.overall_score,
            risks = outcome.risks.len(),
            opportunities = outcome.opportunities.len(),
            "Contract analysis completed"
        );
        Ok(outcome)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
