//! Contract type classification and analysis through a hosted language model.

mod anthropic;
mod prompt;

use async_trait::async_trait;
use clauseguard_core::models::AnalysisOutcome;
use thiserror::Error;

pub use anthropic::AnthropicContractAi;
pub use prompt::{analysis_prompt, detection_prompt, parse_analysis, parse_contract_type};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Model request failed: {0}")]
    Request(String),

    #[error("Model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Could not parse model output: {0}")]
    Parse(String),

    #[error("Model returned an empty response")]
    Empty,
}

/// The two model-backed steps of the contract pipeline.
#[async_trait]
pub trait ContractAi: Send + Sync {
    /// Classify contract text into a single type label.
    async fn detect_type(&self, contract_text: &str) -> Result<String, AiError>;

    /// Produce a structured analysis of `contract_text` as a contract of `contract_type`.
    async fn analyze(
        &self,
        contract_text: &str,
        contract_type: &str,
    ) -> Result<AnalysisOutcome, AiError>;

    /// Identifier stored alongside every analysis this model produces.
    fn model_id(&self) -> &str;
}
