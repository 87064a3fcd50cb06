//! Read-through retrieval of stored analyses.
//!
//! A cached entry holds the exact JSON bytes produced from the store on the
//! first miss, so a hit and a miss answer with identical bodies. The store
//! stays authoritative: cache failures are logged and treated as a miss.

use bytes::Bytes;
use clauseguard_cache::keys::contract_key;
use clauseguard_core::constants::CONTRACT_CACHE_TTL_SECS;
use clauseguard_core::models::ContractAnalysis;
use clauseguard_core::AppError;
use std::time::Duration;
use uuid::Uuid;

use crate::state::AppState;

/// Parse a path id, rejecting anything that is not a UUID.
pub fn parse_contract_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidInput("Invalid contract ID".to_string()))
}

fn not_found() -> AppError {
    AppError::NotFound("Contract not found".to_string())
}

pub struct ContractReader<'a> {
    state: &'a AppState,
}

impl<'a> ContractReader<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// All analyses owned by `user_id`, newest first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<ContractAnalysis>, AppError> {
        self.state.analyses.list_for_user(user_id).await
    }

    /// JSON body of analysis `id`, served from the cache when possible.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, analysis_id = %id))]
    pub async fn get_serialized(&self, user_id: Uuid, id: Uuid) -> Result<Bytes, AppError> {
        let key = contract_key(user_id, id);

        match self.state.cache.get(&key).await {
            Ok(Some(bytes)) => {
                tracing::debug!("Contract cache hit");
                return Ok(bytes);
            }
            Ok(None) => tracing::debug!("Contract cache miss"),
            Err(e) => tracing::warn!(error = %e, "Contract cache read failed; using store"),
        }

        let analysis = self
            .state
            .analyses
            .get_for_user(id, user_id)
            .await?
            .ok_or_else(not_found)?;

        let bytes = serde_json::to_vec(&analysis)
            .map(Bytes::from)
            .map_err(|e| AppError::Internal(format!("Failed to serialize contract: {}", e)))?;

        if let Err(e) = self
            .state
            .cache
            .set_ex(
                &key,
                bytes.clone(),
                Duration::from_secs(CONTRACT_CACHE_TTL_SECS),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to cache contract");
        }

        Ok(bytes)
    }

    /// Delete analysis `id` and evict its cached copy.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, analysis_id = %id))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.state.analyses.delete_for_user(id, user_id).await? {
            return Err(not_found());
        }

        if let Err(e) = self.state.cache.delete(&contract_key(user_id, id)).await {
            tracing::warn!(error = %e, "Failed to evict cached contract");
        }

        tracing::info!("Contract analysis deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_id_must_be_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_contract_id(&id.to_string()).unwrap(), id);

        match parse_contract_id("not-a-uuid") {
            Err(AppError::InvalidInput(msg)) => assert_eq!(msg, "Invalid contract ID"),
            other => panic!("expected invalid input, got {:?}", other),
        }
    }
}
