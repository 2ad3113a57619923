//! Report Renderer - stored CSV artifacts to branded PDF documents
//!
//! Rendering is split in three stages so that everything except the final
//! byte encoding is plain data:
//!
//! - `document`: artifact -> blocks (banner, summary, charts, table)
//! - `layout`: blocks -> positioned draw operations per page
//! - `pdf`: draw operations -> PDF bytes

pub mod document;
pub mod layout;
pub mod pdf;

#[cfg(test)]
mod tests;

pub use document::{build, ReportDocument};
pub use layout::{layout, Page};

use crate::logic::reports::{ArtifactError, ReportArtifact};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot parse report: {0}")]
    Parse(#[from] ArtifactError),

    #[error("PDF generation failed: {0}")]
    Backend(String),
}

/// Renders raw artifact bytes. The filename drives section selection.
pub fn render(filename: &str, bytes: &[u8]) -> Result<Vec<u8>, RenderError> {
    let artifact = ReportArtifact::parse(filename, bytes)?;
    render_artifact(&artifact)
}

pub fn render_artifact(artifact: &ReportArtifact) -> Result<Vec<u8>, RenderError> {
    let doc = build(artifact);
    let pages = layout(&doc);
    tracing::debug!(
        "Rendering {} ({} rows, {} pages)",
        artifact.filename,
        artifact.table.rows.len(),
        pages.len()
    );
    pdf::write_pdf(&doc.title, &pages)
}
