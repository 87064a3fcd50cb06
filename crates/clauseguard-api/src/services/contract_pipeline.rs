//! Upload → detect and upload → analyze.
//!
//! Both flows stage the uploaded bytes in the blob cache under a fresh
//! per-request key, read them back, and extract text before calling the
//! model. Downstream failures collapse into `DetectionFailed` /
//! `AnalysisFailed`; the cause is logged, never returned to the client.

use bytes::Bytes;
use clauseguard_cache::keys::upload_key;
use clauseguard_cache::CacheError;
use clauseguard_core::constants::{ANALYSIS_LANGUAGE, UPLOAD_TTL_SECS};
use clauseguard_core::models::{ContractAnalysis, NewContractAnalysis};
use clauseguard_core::AppError;
use clauseguard_services::ExtractionError;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::state::AppState;

/// Why staging an upload or reading its text back failed.
#[derive(Debug, Error)]
enum StageError {
    #[error("cache: {0}")]
    Cache(#[from] CacheError),

    #[error("upload {0} missing from cache")]
    Missing(String),

    #[error("extraction: {0}")]
    Extraction(#[from] ExtractionError),
}

pub struct ContractPipeline<'a> {
    state: &'a AppState,
}

impl<'a> ContractPipeline<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Cache the upload under `key`, read it back and extract its text.
    async fn stage_and_extract(&self, key: &str, data: Bytes) -> Result<String, StageError> {
        self.state
            .cache
            .set_ex(key, data, Duration::from_secs(UPLOAD_TTL_SECS))
            .await?;

        let cached = self
            .state
            .cache
            .get(key)
            .await?
            .ok_or_else(|| StageError::Missing(key.to_string()))?;

        let text = self.state.extractor.extract_text(cached).await?;
        Ok(text)
    }

    /// Classify an uploaded contract. The staged upload is removed once a label is produced.
    #[tracing::instrument(skip(self, data), fields(user_id = %user_id, size = data.len()))]
    pub async fn detect_type(&self, user_id: Uuid, data: Bytes) -> Result<String, AppError> {
        let key = upload_key(user_id);

        let text = self
            .stage_and_extract(&key, data)
            .await
            .map_err(|e| AppError::DetectionFailed(e.to_string()))?;

        let contract_type = self
            .state
            .ai
            .detect_type(&text)
            .await
            .map_err(|e| AppError::DetectionFailed(e.to_string()))?;

        if let Err(e) = self.state.cache.delete(&key).await {
            tracing::warn!(error = %e, key = %key, "Failed to remove staged upload; it will expire");
        }

        tracing::info!(contract_type = %contract_type, "Contract type detected");
        Ok(contract_type)
    }

    /// Analyze an uploaded contract as `contract_type` and persist the result for `user_id`.
    ///
    /// The staged upload is left to expire.
    #[tracing::instrument(skip(self, data), fields(user_id = %user_id, size = data.len()))]
    pub async fn analyze(
        &self,
        user_id: Uuid,
        data: Bytes,
        contract_type: &str,
    ) -> Result<ContractAnalysis, AppError> {
        let contract_type = contract_type.trim();
        if contract_type.is_empty() {
            return Err(AppError::InvalidInput(
                "Contract type is required".to_string(),
            ));
        }

        let key = upload_key(user_id);

        let text = self
            .stage_and_extract(&key, data)
            .await
            .map_err(|e| AppError::AnalysisFailed(e.to_string()))?;

        let outcome = self
            .state
            .ai
            .analyze(&text, contract_type)
            .await
            .map_err(|e| AppError::AnalysisFailed(e.to_string()))?;

        let new = NewContractAnalysis::new(
            user_id,
            text,
            contract_type.to_string(),
            outcome,
            self.state.ai.model_id(),
            ANALYSIS_LANGUAGE,
        );

        let analysis = self
            .state
            .analyses
            .insert(new)
            .await
            .map_err(|e| AppError::AnalysisFailed(e.to_string()))?;

        tracing::info!(
            analysis_id = %analysis.id,
            contract_type = %analysis.contract_type,
            overall_score = analysis.overall_score,
            "Contract analysis stored"
        );
        Ok(analysis)
    }
}
