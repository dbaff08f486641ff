// Resume → job title: the pipeline, its download artifact, and the page and API around it.
// Extraction lives in crate::extraction, inference in crate::qa.

pub mod download;
pub mod handlers;
pub mod pipeline;
pub mod render;
