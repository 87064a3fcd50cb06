//! Upload payloads for contract tests.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;

/// Bytes with a PDF header. The stub extractor never parses them.
pub fn sample_pdf() -> Bytes {
    Bytes::from_static(b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\ntrailer << >>\n%%EOF\n")
}

pub fn pdf_part() -> Part {
    Part::bytes(sample_pdf())
        .file_name("contract.pdf")
        .mime_type("application/pdf")
}

pub fn detect_form() -> MultipartForm {
    MultipartForm::new().add_part("contract", pdf_part())
}

pub fn analyze_form(contract_type: &str) -> MultipartForm {
    MultipartForm::new()
        .add_part("contract", pdf_part())
        .add_text("contractType", contract_type.to_string())
}

pub fn text_file_form() -> MultipartForm {
    let part = Part::bytes(Bytes::from_static(b"just some notes"))
        .file_name("notes.txt")
        .mime_type("text/plain");
    MultipartForm::new().add_part("contract", part)
}

/// A form carrying only the type label, no file part.
pub fn type_only_form(contract_type: &str) -> MultipartForm {
    MultipartForm::new().add_text("contractType", contract_type.to_string())
}
