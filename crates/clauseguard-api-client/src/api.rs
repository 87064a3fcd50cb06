//! Domain methods for the ClauseGuard API client.
//!
//! Record types are re-used from `clauseguard_core::models`; response
//! wrappers that only exist on the wire are defined here.

use crate::ApiClient;
use anyhow::{Context, Result};
use clauseguard_core::constants::{CONTRACT_FIELD, CONTRACT_TYPE_FIELD, PDF_CONTENT_TYPE};
use clauseguard_core::models::{ContractAnalysis, MembershipStatusResponse, User};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectTypeResponse {
    detected_type: String,
}

/// Matches GET /payments/create-checkout-session.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A contract PDF ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl ContractFile {
    /// Read a local PDF. Only `.pdf` files are accepted.
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(anyhow::anyhow!("Invalid input: {}", path.display()));
        }

        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(anyhow::anyhow!("Only PDF files are allowed"));
        }

        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("contract.pdf")
            .to_string();

        Ok(Self { name, data })
    }

    fn part(&self) -> Result<Part> {
        Part::bytes(self.data.clone())
            .file_name(self.name.clone())
            .mime_str(PDF_CONTENT_TYPE)
            .context("Invalid content type")
    }
}

impl ApiClient {
    /// Upload a contract and return the type label the model assigns it.
    pub async fn detect_contract_type(&self, file: &ContractFile) -> Result<String> {
        let form = Form::new().part(CONTRACT_FIELD, file.part()?);
        let response: DetectTypeResponse =
            self.post_multipart("/contracts/detect-type", form).await?;
        Ok(response.detected_type)
    }

    /// Upload a contract for full analysis as `contract_type`. The record is stored server-side.
    pub async fn analyze_contract(
        &self,
        file: &ContractFile,
        contract_type: &str,
    ) -> Result<ContractAnalysis> {
        let form = Form::new()
            .part(CONTRACT_FIELD, file.part()?)
            .text(CONTRACT_TYPE_FIELD, contract_type.to_string());
        self.post_multipart("/contracts/analyze", form).await
    }

    /// All analyses of the signed-in user, newest first.
    pub async fn list_contracts(&self) -> Result<Vec<ContractAnalysis>> {
        self.get("/contracts/user-contracts").await
    }

    pub async fn get_contract(&self, id: Uuid) -> Result<ContractAnalysis> {
        self.get(&format!("/contracts/{}", id)).await
    }

    pub async fn delete_contract(&self, id: Uuid) -> Result<()> {
        self.delete(&format!("/contracts/{}", id)).await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.get("/auth/current-user").await
    }

    pub async fn membership_status(&self) -> Result<MembershipStatusResponse> {
        self.get("/payments/membership-status").await
    }

    /// Start a Stripe checkout for the premium plan.
    pub async fn create_checkout_session(&self) -> Result<CheckoutSessionResponse> {
        self.get("/payments/create-checkout-session").await
    }
}
