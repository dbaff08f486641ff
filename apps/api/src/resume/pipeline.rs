//! Upload → text → job title, one linear pass per request.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::{DocumentParseError, InferenceError};
use crate::extraction::extract_text_blocking;
use crate::models::resume::{ExtractedText, InferenceResult, UploadedDocument};
use crate::qa::{find_job_title, QuestionAnswerer};

/// Everything one upload produced. Extraction succeeded; inference may not have.
#[derive(Debug)]
pub struct ResumeAnalysis {
    pub request_id: Uuid,
    pub extracted: ExtractedText,
    pub job_title: Result<InferenceResult, InferenceError>,
}

/// Extracts the resume text and asks the job-title question.
///
/// A parse failure aborts the whole pass. An inference failure is kept in
/// `ResumeAnalysis::job_title` so the extracted text is still shown.
pub async fn analyze_resume(
    doc: UploadedDocument,
    answerer: Arc<dyn QuestionAnswerer>,
    timeout: Duration,
) -> Result<ResumeAnalysis, DocumentParseError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("resume", %request_id);

    async move {
        let extracted = extract_text_blocking(doc.bytes).await.map_err(|e| {
            warn!("Text extraction failed: {e}");
            e
        })?;
        info!(
            "Extracted {} pages, {} chars",
            extracted.page_count,
            extracted.text.chars().count()
        );

        let job_title = find_job_title(answerer, extracted.text.clone(), timeout).await;
        match &job_title {
            Ok(result) => info!("Job title {:?} (score {:.3})", result.answer, result.score),
            Err(e) => warn!("Job title inference failed: {e}"),
        }

        Ok(ResumeAnalysis {
            request_id,
            extracted,
            job_title,
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::test_support::{text_pdf, zero_page_pdf};
    use crate::qa::test_support::PhraseAnswerer;
    use bytes::Bytes;

    fn upload(bytes: Vec<u8>) -> UploadedDocument {
        UploadedDocument {
            bytes: Bytes::from(bytes),
            content_type: Some("application/pdf".into()),
            file_name: Some("resume.pdf".into()),
        }
    }

    fn answerer() -> Arc<dyn QuestionAnswerer> {
        Arc::new(PhraseAnswerer("Engineer"))
    }

    #[tokio::test]
    async fn test_text_pdf_yields_text_and_answer() {
        let pdf = text_pdf(&["Jane Doe", "Senior Software Engineer at Acme Corp"]);
        let analysis = analyze_resume(upload(pdf), answerer(), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(analysis.extracted.page_count, 2);
        let result = analysis.job_title.unwrap();
        assert_eq!(result.answer, "Engineer");
        assert_eq!(&analysis.extracted.text[result.span], "Engineer");
    }

    #[tokio::test]
    async fn test_zero_page_pdf_keeps_text_and_reports_empty_context() {
        let analysis = analyze_resume(upload(zero_page_pdf()), answerer(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(analysis.extracted.text, "");
        assert_eq!(analysis.job_title, Err(InferenceError::EmptyContext));
    }

    #[tokio::test]
    async fn test_malformed_bytes_fail_with_parse_error() {
        let err = analyze_resume(
            upload(b"plain text, not a pdf".to_vec()),
            answerer(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DocumentParseError::Malformed(_)));
    }
}
