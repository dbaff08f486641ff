// Upload intake and PDF text extraction.
// Parsing is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod intake;
pub mod pdf;

pub use intake::read_upload;
pub use pdf::extract_text_blocking;
