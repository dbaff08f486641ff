//! Axum route handlers for the upload page and the resume API.

use axum::{
    extract::{Multipart, State},
    response::Html,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{AppError, PipelineError};
use crate::extraction::{extract_text_blocking, read_upload};
use crate::models::resume::UploadedDocument;
use crate::resume::download::DownloadArtifact;
use crate::resume::pipeline::{analyze_resume, ResumeAnalysis};
use crate::resume::render::{render_page, PageOutcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub request_id: Uuid,
    pub page_count: usize,
    pub text: String,
    pub display_text: String,
    pub truncated: bool,
    pub job_title: Option<String>,
    pub inference_error: Option<ErrorBody>,
    pub processed_at: DateTime<Utc>,
}

impl AnalyzeResponse {
    fn from_analysis(analysis: ResumeAnalysis, display_char_limit: usize) -> Self {
        let extracted = analysis.extracted;
        let (job_title, inference_error) = match analysis.job_title {
            Ok(result) => (Some(result.answer), None),
            Err(e) => {
                let e = PipelineError::from(e);
                (
                    None,
                    Some(ErrorBody {
                        code: e.code(),
                        message: e.to_string(),
                    }),
                )
            }
        };
        Self {
            request_id: analysis.request_id,
            page_count: extracted.page_count,
            display_text: extracted.display_prefix(display_char_limit).to_string(),
            truncated: extracted.is_truncated(display_char_limit),
            text: extracted.text,
            job_title,
            inference_error,
            processed_at: Utc::now(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(PageOutcome::Empty, state.config.display_char_limit))
}

/// POST /
///
/// Form upload from the page. Pipeline failures are rendered into the page
/// instead of returned as error responses.
pub async fn handle_upload_page(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let limit = state.config.display_char_limit;
    let outcome = match read_upload(&mut multipart).await {
        Ok(doc) => run_pipeline(&state, doc).await,
        Err(AppError::Pipeline(e)) => Err(e),
        Err(other) => return Err(other),
    };

    let html = match &outcome {
        Ok(analysis) => render_page(PageOutcome::Analyzed(analysis), limit),
        Err(e) => render_page(PageOutcome::Failed(e), limit),
    };
    Ok(Html(html))
}

/// POST /api/v1/resume/analyze
///
/// Same pipeline as the page, as JSON. An inference failure still returns 200
/// with the extracted text and `inference_error` set.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let doc = read_upload(&mut multipart).await?;
    let analysis = run_pipeline(&state, doc).await?;
    Ok(Json(AnalyzeResponse::from_analysis(
        analysis,
        state.config.display_char_limit,
    )))
}

/// POST /api/v1/resume/text
///
/// Returns the full extracted text as `resume_text.txt`. No inference.
pub async fn handle_download_text(mut multipart: Multipart) -> Result<DownloadArtifact, AppError> {
    let doc = read_upload(&mut multipart).await?;
    let extracted = extract_text_blocking(doc.bytes).await?;
    Ok(DownloadArtifact::from_text(&extracted))
}

async fn run_pipeline(
    state: &AppState,
    doc: UploadedDocument,
) -> Result<ResumeAnalysis, PipelineError> {
    let analysis = analyze_resume(
        doc,
        state.answerer.clone(),
        state.config.inference_timeout,
    )
    .await?;
    Ok(analysis)
}
