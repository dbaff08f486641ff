//! PDF text extraction. A thin, panic-safe wrapper over `pdf-extract`.
//!
//! Pages are extracted individually and concatenated in page order with no
//! separator and no normalization. There is no OCR: image-only pages yield
//! empty text.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use tracing::debug;

use crate::errors::DocumentParseError;
use crate::models::resume::ExtractedText;

/// Extracts the text of every page of an in-memory PDF.
pub fn extract_text(bytes: &[u8]) -> Result<ExtractedText, DocumentParseError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|payload| DocumentParseError::Malformed(panic_message(payload.as_ref())))?
    .map_err(|e| DocumentParseError::Malformed(e.to_string()))?;

    let extracted = ExtractedText::from_pages(pages);
    debug!(
        "Extracted {} chars from {} pages",
        extracted.text.len(),
        extracted.page_count
    );
    Ok(extracted)
}

/// Runs [`extract_text`] on the blocking pool; parsing is CPU-bound.
pub async fn extract_text_blocking(bytes: Bytes) -> Result<ExtractedText, DocumentParseError> {
    tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| DocumentParseError::Malformed(format!("extraction task failed: {e}")))?
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown parser failure".to_string());
    format!("PDF parser aborted: {detail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::test_support::{image_only_pdf, text_pdf, zero_page_pdf};

    #[test]
    fn test_pages_are_concatenated_in_order() {
        let pdf = text_pdf(&["Alpha", "Bravo", "Charlie"]);
        let extracted = extract_text(&pdf).unwrap();

        assert_eq!(extracted.page_count, 3);
        let a = extracted.text.find("Alpha").expect("page 1 text");
        let b = extracted.text.find("Bravo").expect("page 2 text");
        let c = extracted.text.find("Charlie").expect("page 3 text");
        assert!(a < b && b < c, "pages out of order: {:?}", extracted.text);
    }

    #[test]
    fn test_text_equals_concatenation_of_single_pages() {
        let whole = extract_text(&text_pdf(&["Alpha", "Bravo"])).unwrap();
        let first = extract_text(&text_pdf(&["Alpha"])).unwrap();
        let second = extract_text(&text_pdf(&["Bravo"])).unwrap();
        assert_eq!(whole.text, format!("{}{}", first.text, second.text));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let pdf = text_pdf(&["Senior Software Engineer at Acme Corp", "Skills"]);
        assert_eq!(extract_text(&pdf).unwrap(), extract_text(&pdf).unwrap());
    }

    #[test]
    fn test_zero_page_pdf_yields_empty_string() {
        let extracted = extract_text(&zero_page_pdf()).unwrap();
        assert_eq!(extracted.text, "");
        assert_eq!(extracted.page_count, 0);
    }

    #[test]
    fn test_image_only_page_yields_no_text() {
        let extracted = extract_text(&image_only_pdf()).unwrap();
        assert_eq!(extracted.page_count, 1);
        assert!(extracted.is_blank(), "got {:?}", extracted.text);
    }

    #[test]
    fn test_garbage_bytes_fail_with_parse_error() {
        let err = extract_text(b"this is definitely not a pdf").unwrap_err();
        assert!(matches!(err, DocumentParseError::Malformed(_)));
    }

    #[test]
    fn test_png_bytes_fail_with_parse_error() {
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];
        assert!(matches!(
            extract_text(&png),
            Err(DocumentParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_panic_message_reads_str_and_string_payloads() {
        let s: Box<dyn Any + Send> = Box::new("bad font");
        assert_eq!(panic_message(s.as_ref()), "PDF parser aborted: bad font");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bad xref"));
        assert_eq!(panic_message(owned.as_ref()), "PDF parser aborted: bad xref");
    }

    #[tokio::test]
    async fn test_blocking_wrapper_matches_sync_extraction() {
        let pdf = text_pdf(&["Alpha"]);
        let sync = extract_text(&pdf).unwrap();
        let async_result = extract_text_blocking(Bytes::from(pdf)).await.unwrap();
        assert_eq!(sync, async_result);
    }
}
