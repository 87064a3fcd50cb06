use crate::auth::models::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::contract_reader::parse_contract_id;
use crate::services::{read_contract_form, ContractPipeline, ContractReader};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use clauseguard_core::models::ContractAnalysis;
use clauseguard_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectTypeResponse {
    pub detected_type: String,
}

#[utoipa::path(
    post,
    path = "/contracts/detect-type",
    tag = "contracts",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "PDF in the `contract` field"),
    responses(
        (status = 200, description = "Contract type detected", body = DetectTypeResponse),
        (status = 400, description = "Missing or non-PDF file", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Detection failed", body = ErrorResponse)
    )
)]
pub async fn detect_contract_type(
    State(state): State<Arc<AppState>>,
    user_ctx: UserContext,
    multipart: Multipart,
) -> Result<Json<DetectTypeResponse>, HttpAppError> {
    let form = read_contract_form(multipart, state.config.max_contract_size_bytes()).await?;

    let detected_type = ContractPipeline::new(&state)
        .detect_type(user_ctx.user_id(), form.data)
        .await?;

    Ok(Json(DetectTypeResponse { detected_type }))
}

#[utoipa::path(
    post,
    path = "/contracts/analyze",
    tag = "contracts",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "PDF in `contract`, confirmed type in `contractType`"),
    responses(
        (status = 200, description = "Analysis stored", body = ContractAnalysis),
        (status = 400, description = "Missing file, non-PDF file or missing contract type", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Analysis failed", body = ErrorResponse)
    )
)]
pub async fn analyze_contract(
    State(state): State<Arc<AppState>>,
    user_ctx: UserContext,
    multipart: Multipart,
) -> Result<Json<ContractAnalysis>, HttpAppError> {
    let form = read_contract_form(multipart, state.config.max_contract_size_bytes()).await?;
    let contract_type = form
        .contract_type
        .ok_or_else(|| AppError::InvalidInput("Contract type is required".to_string()))?;

    let analysis = ContractPipeline::new(&state)
        .analyze(user_ctx.user_id(), form.data, &contract_type)
        .await?;

    Ok(Json(analysis))
}

#[utoipa::path(
    get,
    path = "/contracts/user-contracts",
    tag = "contracts",
    responses(
        (status = 200, description = "The caller's analyses, newest first", body = Vec<ContractAnalysis>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn list_user_contracts(
    State(state): State<Arc<AppState>>,
    user_ctx: UserContext,
) -> Result<Json<Vec<ContractAnalysis>>, HttpAppError> {
    let contracts = ContractReader::new(&state).list(user_ctx.user_id()).await?;
    Ok(Json(contracts))
}

#[utoipa::path(
    get,
    path = "/contracts/{id}",
    tag = "contracts",
    params(("id" = String, Path, description = "Analysis UUID")),
    responses(
        (status = 200, description = "The analysis", body = ContractAnalysis),
        (status = 400, description = "Invalid contract ID", body = ErrorResponse),
        (status = 404, description = "Contract not found", body = ErrorResponse)
    )
)]
pub async fn get_contract(
    State(state): State<Arc<AppState>>,
    user_ctx: UserContext,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    let id = parse_contract_id(&id)?;
    let body = ContractReader::new(&state)
        .get_serialized(user_ctx.user_id(), id)
        .await?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

#[utoipa::path(
    delete,
    path = "/contracts/{id}",
    tag = "contracts",
    params(("id" = String, Path, description = "Analysis UUID")),
    responses(
        (status = 204, description = "Analysis deleted"),
        (status = 400, description = "Invalid contract ID", body = ErrorResponse),
        (status = 404, description = "Contract not found", body = ErrorResponse)
    )
)]
pub async fn delete_contract(
    State(state): State<Arc<AppState>>,
    user_ctx: UserContext,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpAppError> {
    let id = parse_contract_id(&id)?;
    ContractReader::new(&state)
        .delete(user_ctx.user_id(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
