//! Server-rendered single page: upload form, extracted text, job title or error.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::errors::PipelineError;
use crate::extraction::intake::UPLOAD_FIELD;
use crate::resume::download::DownloadArtifact;
use crate::resume::pipeline::ResumeAnalysis;

/// What the page shows below the upload form.
pub enum PageOutcome<'a> {
    Empty,
    Analyzed(&'a ResumeAnalysis),
    Failed(&'a PipelineError),
}

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, -apple-system, "Segoe UI", sans-serif; background: #f3f4f6; color: #1f2937; }
.layout { display: flex; min-height: 100vh; }
.sidebar { width: 260px; padding: 24px; background: #ffffff; border-right: 1px solid #e5e7eb; }
.sidebar h2 { font-size: 1.25rem; margin-top: 0; }
.main-container { flex: 1; max-width: 56rem; margin: 24px auto; padding: 24px; background: #ffffff; border-radius: 8px; box-shadow: 0 10px 15px rgba(0,0,0,0.1); }
.title { font-size: 2.25rem; font-weight: 700; text-align: center; color: #1f2937; margin-bottom: 16px; }
.subtitle { font-size: 1.125rem; color: #4b5563; text-align: center; margin-bottom: 24px; }
.section-header { font-size: 1.5rem; font-weight: 600; color: #374151; margin: 32px 0 16px; }
.upload-box { border: 2px dashed #d1d5db; border-radius: 8px; padding: 24px; text-align: center; }
.upload-box:hover { border-color: #3b82f6; }
.columns { display: flex; gap: 24px; align-items: flex-start; }
.columns textarea { flex: 3; height: 300px; font-family: ui-monospace, monospace; font-size: 0.85rem; }
.columns .actions { flex: 1; margin-top: 40px; }
.success-box { background: #dcfce7; border-left: 4px solid #22c55e; padding: 16px; border-radius: 8px; }
.success-box p { font-size: 1.125rem; font-weight: 600; color: #15803d; margin: 0; }
.error-box { background: #fee2e2; border-left: 4px solid #ef4444; padding: 16px; border-radius: 8px; }
.error-box p { font-size: 1.125rem; font-weight: 600; color: #b91c1c; margin: 0; }
.download-btn, button { display: inline-block; width: 100%; background: #2563eb; color: #ffffff; font-weight: 600; padding: 8px 16px; border: 0; border-radius: 8px; text-align: center; text-decoration: none; cursor: pointer; }
.download-btn:hover, button:hover { background: #1d4ed8; }
.note { color: #6b7280; font-size: 0.85rem; }
"#;

/// Renders the whole page. `display_char_limit` caps the text area, not the download.
pub fn render_page(outcome: PageOutcome<'_>, display_char_limit: usize) -> String {
    let mut body = String::new();
    body.push_str(r#"<h1 class="title">📄 Resume Extractor + 🧠 Job Title Finder</h1>"#);
    body.push_str(
        r#"<p class="subtitle">Upload a resume PDF to extract the job title using advanced NLP.</p>"#,
    );
    write_upload_form(&mut body);

    match outcome {
        PageOutcome::Empty => {}
        PageOutcome::Failed(err) => write_error_box(&mut body, err),
        PageOutcome::Analyzed(analysis) => {
            write_extracted_text(&mut body, analysis, display_char_limit);
            body.push_str(r#"<h2 class="section-header">💼 Predicted Job Title</h2>"#);
            match &analysis.job_title {
                Ok(result) => {
                    let _ = write!(
                        body,
                        r#"<div class="success-box"><p>{}</p></div>"#,
                        encode_text(&result.answer)
                    );
                }
                Err(e) => write_error_box(&mut body, &PipelineError::from(e.clone())),
            }
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Resume Job Title Extractor</title>
<style>{STYLE}</style>
</head>
<body>
<div class="layout">
<aside class="sidebar">
<h2>About This App</h2>
<p>This app extracts text from uploaded PDF resumes and uses an extractive question-answering model to predict the job title.</p>
<p>Upload a PDF resume to see the result.</p>
</aside>
<main class="main-container">
{body}
</main>
</div>
</body>
</html>
"#
    )
}

fn write_upload_form(out: &mut String) {
    let _ = write!(
        out,
        r#"<form class="upload-box" method="post" action="/" enctype="multipart/form-data">
<label for="{field}">📎 Upload Resume (PDF)</label><br>
<input id="{field}" type="file" name="{field}" accept="application/pdf,.pdf" required>
<p><button type="submit">Extract</button></p>
</form>"#,
        field = UPLOAD_FIELD
    );
}

fn write_extracted_text(out: &mut String, analysis: &ResumeAnalysis, limit: usize) {
    let extracted = &analysis.extracted;
    let artifact = DownloadArtifact::from_text(extracted);

    out.push_str(r#"<h2 class="section-header">📜 Extracted Resume Text</h2>"#);
    out.push_str(r#"<div class="columns">"#);
    let _ = write!(
        out,
        r#"<textarea aria-label="Resume Content" readonly>{}</textarea>"#,
        encode_text(extracted.display_prefix(limit))
    );
    let _ = write!(
        out,
        r#"<div class="actions"><a class="download-btn" href="{href}" download="{name}" title="Download the extracted resume text as a .txt file">📥 Download Extracted Text</a>"#,
        href = encode_double_quoted_attribute(&artifact.data_uri()),
        name = encode_double_quoted_attribute(artifact.file_name),
    );
    if extracted.is_truncated(limit) {
        let _ = write!(
            out,
            r#"<p class="note">Showing the first {limit} characters. The download has the full text.</p>"#
        );
    }
    out.push_str("</div></div>");
}

fn write_error_box(out: &mut String, err: &PipelineError) {
    let _ = write!(
        out,
        r#"<div class="error-box"><p>❌ {}</p></div>"#,
        encode_text(&err.user_message())
    );
}
