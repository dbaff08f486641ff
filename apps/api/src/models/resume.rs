use std::ops::Range;

use bytes::Bytes;
use serde::Serialize;

/// One file as received from the upload form. Dropped once its text is extracted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

/// Text of every page, concatenated in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

impl ExtractedText {
    pub fn from_pages(pages: Vec<String>) -> Self {
        let page_count = pages.len();
        Self {
            text: pages.concat(),
            page_count,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// First `limit` characters (not bytes) of the text.
    pub fn display_prefix(&self, limit: usize) -> &str {
        match self.text.char_indices().nth(limit) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }

    pub fn is_truncated(&self, limit: usize) -> bool {
        self.text.chars().nth(limit).is_some()
    }
}

/// Best answer span found by the QA model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceResult {
    pub answer: String,
    pub score: f32,
    /// Byte range of `answer` inside the context it was taken from.
    pub span: Range<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_concatenate_in_order() {
        let text = ExtractedText::from_pages(vec!["first\n".into(), "".into(), "third".into()]);
        assert_eq!(text.text, "first\nthird");
        assert_eq!(text.page_count, 3);
    }

    #[test]
    fn test_zero_pages_is_empty_and_blank() {
        let text = ExtractedText::from_pages(Vec::new());
        assert_eq!(text.text, "");
        assert_eq!(text.page_count, 0);
        assert!(text.is_blank());
    }

    #[test]
    fn test_display_prefix_counts_chars_not_bytes() {
        let text = ExtractedText::from_pages(vec!["héllo wörld".into()]);
        assert_eq!(text.display_prefix(5), "héllo");
        assert!(text.is_truncated(5));
        assert_eq!(text.display_prefix(100), "héllo wörld");
        assert!(!text.is_truncated(11));
    }
}
