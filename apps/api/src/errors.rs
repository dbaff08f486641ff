use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Upload intake or PDF parsing failed. Terminal for the interaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentParseError {
    #[error("no file was uploaded in the 'resume' field")]
    MissingUpload,

    #[error("the uploaded file is empty")]
    EmptyUpload,

    #[error("expected a PDF upload, got '{content_type}'")]
    NotPdf { content_type: String },

    #[error("could not read the PDF: {0}")]
    Malformed(String),
}

/// The QA model could not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("the resume contains no extractable text to answer from")]
    EmptyContext,

    #[error("the question-answering model is unavailable: {0}")]
    ModelLoad(String),

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("model inference failed: {0}")]
    Runtime(String),

    #[error("model inference timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Either failure kind of the resume pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    DocumentParse(#[from] DocumentParseError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl PipelineError {
    /// The line shown to the user in the error box.
    pub fn user_message(&self) -> String {
        format!("Error: {self}")
    }

    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::DocumentParse(_) => "DOCUMENT_PARSE_ERROR",
            PipelineError::Inference(_) => "INFERENCE_ERROR",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DocumentParseError> for AppError {
    fn from(e: DocumentParseError) -> Self {
        AppError::Pipeline(e.into())
    }
}

impl From<InferenceError> for AppError {
    fn from(e: InferenceError) -> Self {
        AppError::Pipeline(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Pipeline(e) => {
                tracing::warn!("Pipeline error: {e}");
                let status = match e {
                    PipelineError::DocumentParse(DocumentParseError::Malformed(_)) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    PipelineError::DocumentParse(_) => StatusCode::BAD_REQUEST,
                    PipelineError::Inference(InferenceError::Timeout(_)) => {
                        StatusCode::GATEWAY_TIMEOUT
                    }
                    PipelineError::Inference(InferenceError::EmptyContext) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    PipelineError::Inference(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, e.code(), e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefixes_error() {
        let err = PipelineError::from(InferenceError::EmptyContext);
        assert_eq!(
            err.user_message(),
            "Error: the resume contains no extractable text to answer from"
        );
    }

    #[test]
    fn test_codes_distinguish_failure_kinds() {
        let parse = PipelineError::from(DocumentParseError::Malformed("bad xref".into()));
        let infer = PipelineError::from(InferenceError::Runtime("shape mismatch".into()));
        assert_eq!(parse.code(), "DOCUMENT_PARSE_ERROR");
        assert_eq!(infer.code(), "INFERENCE_ERROR");
        assert!(parse.user_message().contains("bad xref"));
    }

    #[test]
    fn test_timeout_message_in_seconds() {
        let err = InferenceError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "model inference timed out after 30s");
    }

    #[test]
    fn test_malformed_pdf_maps_to_422() {
        let resp = AppError::from(DocumentParseError::Malformed("eof".into())).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_not_pdf_maps_to_400() {
        let resp = AppError::from(DocumentParseError::NotPdf {
            content_type: "image/png".into(),
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
