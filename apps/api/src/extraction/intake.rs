//! Upload intake: pulls the `resume` field out of a multipart form and checks it is a PDF.

use axum::extract::Multipart;
use tracing::debug;

use crate::errors::{AppError, DocumentParseError};
use crate::models::resume::UploadedDocument;

/// Multipart field carrying the resume file.
pub const UPLOAD_FIELD: &str = "resume";

const PDF_MIME: &str = "application/pdf";
const GENERIC_MIME: &str = "application/octet-stream";

/// Reads the `resume` field. Other fields are ignored.
pub async fn read_upload(multipart: &mut Multipart) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        debug!(
            "Received upload {:?} ({:?}, {} bytes)",
            file_name,
            content_type,
            bytes.len()
        );
        let doc = UploadedDocument {
            bytes,
            content_type,
            file_name,
        };
        ensure_pdf(&doc)?;
        return Ok(doc);
    }

    Err(DocumentParseError::MissingUpload.into())
}

/// Accepts `application/pdf`, or a `.pdf` file name when the type is missing or generic.
pub fn ensure_pdf(doc: &UploadedDocument) -> Result<(), DocumentParseError> {
    if doc.bytes.is_empty() {
        return Err(DocumentParseError::EmptyUpload);
    }

    let mime = doc
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some(PDF_MIME) => Ok(()),
        None | Some("") | Some(GENERIC_MIME) if has_pdf_extension(doc.file_name.as_deref()) => {
            Ok(())
        }
        other => Err(DocumentParseError::NotPdf {
            content_type: other.unwrap_or("unknown").to_string(),
        }),
    }
}

fn has_pdf_extension(file_name: Option<&str>) -> bool {
    file_name
        .map(|n| n.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false)
}
