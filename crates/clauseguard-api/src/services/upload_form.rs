//! Multipart parsing for contract uploads.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use clauseguard_core::constants::{CONTRACT_FIELD, CONTRACT_TYPE_FIELD, PDF_CONTENT_TYPE};
use clauseguard_core::AppError;

/// The fields of a contract upload form.
#[derive(Debug)]
pub struct ContractForm {
    pub data: Bytes,
    /// Trimmed `contractType` field, `None` when absent or blank.
    pub contract_type: Option<String>,
}

/// Whether a part's declared content type is PDF, ignoring parameters and case.
pub fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Contract file is too large".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Read the `contract` file (and `contractType`, when present) from a multipart body.
///
/// Nothing is written anywhere until the whole form has been validated.
pub async fn read_contract_form(
    mut multipart: Multipart,
    max_size: usize,
) -> Result<ContractForm, AppError> {
    let mut data: Option<Bytes> = None;
    let mut contract_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == CONTRACT_FIELD {
            if data.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple contract fields are not allowed".to_string(),
                ));
            }
            if !is_pdf(field.content_type()) {
                tracing::debug!(content_type = ?field.content_type(), "Rejected non-PDF upload");
                return Err(AppError::InvalidInput(
                    "Only PDF files are allowed".to_string(),
                ));
            }
            data = Some(field.bytes().await.map_err(multipart_error)?);
        } else if field_name == CONTRACT_TYPE_FIELD {
            let text = field.text().await.map_err(multipart_error)?;
            let trimmed = text.trim();
            contract_type = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
    }

    let data = data.ok_or_else(|| AppError::InvalidInput("No file uploaded".to_string()))?;
    if data.is_empty() {
        return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
    }
    if data.len() > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "Contract exceeds the {} MB limit",
            max_size / (1024 * 1024)
        )));
    }

    Ok(ContractForm {
        data,
        contract_type,
    })
}
