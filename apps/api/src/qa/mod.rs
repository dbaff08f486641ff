//! Job-title inference: extractive question answering over the resume text.
//!
//! `AppState` holds an `Arc<dyn QuestionAnswerer>` built once at startup. The
//! default backend is `DistilBertAnswerer`; when the model cannot be loaded an
//! `UnavailableAnswerer` takes its place so every upload reports the load error.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::InferenceError;
use crate::models::resume::InferenceResult;

pub mod model;
pub mod span;

pub use model::DistilBertAnswerer;

/// The one question asked of every resume.
pub const JOB_TITLE_QUESTION: &str = "What is the job title of this person?";

/// Answers a question by selecting a span of the context.
///
/// Implementations are CPU-bound and synchronous; callers run them on the
/// blocking pool.
pub trait QuestionAnswerer: Send + Sync {
    fn answer(&self, question: &str, context: &str) -> Result<InferenceResult, InferenceError>;

    fn is_ready(&self) -> bool {
        true
    }
}

/// Stands in for a model that failed to load.
pub struct UnavailableAnswerer {
    reason: String,
}

impl UnavailableAnswerer {
    pub fn new(err: InferenceError) -> Self {
        let reason = match err {
            InferenceError::ModelLoad(reason) => reason,
            other => other.to_string(),
        };
        Self { reason }
    }
}

impl QuestionAnswerer for UnavailableAnswerer {
    fn answer(&self, _question: &str, _context: &str) -> Result<InferenceResult, InferenceError> {
        Err(InferenceError::ModelLoad(self.reason.clone()))
    }

    fn is_ready(&self) -> bool {
        false
    }
}

/// Asks the job-title question on the blocking pool, bounded by `timeout`.
/// Blank context fails with `EmptyContext` before the model is touched.
pub async fn find_job_title(
    answerer: Arc<dyn QuestionAnswerer>,
    context: String,
    timeout: Duration,
) -> Result<InferenceResult, InferenceError> {
    if context.trim().is_empty() {
        return Err(InferenceError::EmptyContext);
    }

    let task = tokio::task::spawn_blocking(move || answerer.answer(JOB_TITLE_QUESTION, &context));
    match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(InferenceError::Timeout(timeout)),
        Ok(Err(join_err)) => Err(InferenceError::Runtime(format!(
            "inference task failed: {join_err}"
        ))),
        Ok(Ok(result)) => result,
    }
}

/// Deterministic answerers for handler and pipeline tests.
#[cfg(test)]
pub mod test_support {
    use super::*;

    /// Answers with the first occurrence of a fixed phrase.
    pub struct PhraseAnswerer(pub &'static str);

    impl QuestionAnswerer for PhraseAnswerer {
        fn answer(&self, _question: &str, context: &str) -> Result<InferenceResult, InferenceError> {
            let start = context
                .find(self.0)
                .ok_or_else(|| InferenceError::Runtime(format!("{:?} not in context", self.0)))?;
            Ok(InferenceResult {
                answer: self.0.to_string(),
                score: 0.9,
                span: start..start + self.0.len(),
            })
        }
    }

    /// Blocks for the given time before answering.
    pub struct SlowAnswerer(pub Duration);

    impl QuestionAnswerer for SlowAnswerer {
        fn answer(&self, _question: &str, context: &str) -> Result<InferenceResult, InferenceError> {
            std::thread::sleep(self.0);
            Ok(InferenceResult {
                answer: context.to_string(),
                score: 1.0,
                span: 0..context.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{PhraseAnswerer, SlowAnswerer};
    use super::*;

    const RESUME: &str = "Jane Doe\nSenior Software Engineer at Acme Corp\n";

    #[tokio::test]
    async fn test_answer_is_substring_of_context() {
        let answerer: Arc<dyn QuestionAnswerer> =
            Arc::new(PhraseAnswerer("Senior Software Engineer"));
        let result = find_job_title(answerer, RESUME.to_string(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(&RESUME[result.span.clone()], result.answer);
    }

    #[tokio::test]
    async fn test_blank_context_is_empty_context_error() {
        let answerer: Arc<dyn QuestionAnswerer> = Arc::new(PhraseAnswerer("anything"));
        for context in ["", "   \n\t "] {
            let err = find_job_title(answerer.clone(), context.to_string(), Duration::from_secs(5))
                .await
                .unwrap_err();
            assert_eq!(err, InferenceError::EmptyContext);
        }
    }

    #[tokio::test]
    async fn test_unavailable_model_reports_load_error() {
        let answerer: Arc<dyn QuestionAnswerer> = Arc::new(UnavailableAnswerer::new(
            InferenceError::ModelLoad("failed to download weights".into()),
        ));
        assert!(!answerer.is_ready());
        let err = find_job_title(answerer, RESUME.to_string(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            InferenceError::ModelLoad("failed to download weights".into())
        );
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let answerer: Arc<dyn QuestionAnswerer> =
            Arc::new(SlowAnswerer(Duration::from_millis(500)));
        let timeout = Duration::from_millis(20);
        let err = find_job_title(answerer, RESUME.to_string(), timeout)
            .await
            .unwrap_err();
        assert_eq!(err, InferenceError::Timeout(timeout));
    }
}
