use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

use crate::models::resume::ExtractedText;

pub const DOWNLOAD_FILE_NAME: &str = "resume_text.txt";
pub const DOWNLOAD_MIME: &str = "text/plain";

/// The full extracted text as a file. Never truncated.
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub body: Bytes,
}

impl DownloadArtifact {
    pub fn from_text(extracted: &ExtractedText) -> Self {
        Self {
            file_name: DOWNLOAD_FILE_NAME,
            mime: DOWNLOAD_MIME,
            body: Bytes::copy_from_slice(extracted.text.as_bytes()),
        }
    }

    /// `data:` URI for an `<a download>` link, so the page needs no second request.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};charset=utf-8;base64,{}",
            self.mime,
            STANDARD.encode(&self.body)
        )
    }
}

impl IntoResponse for DownloadArtifact {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, format!("{}; charset=utf-8", self.mime)),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", self.file_name),
                ),
            ],
            self.body,
        )
            .into_response()
    }
}
