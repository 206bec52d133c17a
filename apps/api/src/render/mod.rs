// Document rendering: CV document → ordered sections of typed blocks → PDF bytes.
// The section mapping (layout.rs) is backend-independent; pdf.rs draws it with printpdf.
// Rendering is CPU-bound and runs on the blocking pool via `render_blocking`.

pub mod font_metrics;
pub mod layout;
pub mod pdf;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

use crate::cv::document::CvDocument;

pub use pdf::PdfRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF backend error: {0}")]
    Pdf(String),

    #[error("render task failed: {0}")]
    Task(String),
}

/// Turns a validated document into file bytes. Must be deterministic in its
/// section mapping; any layout engine honoring `layout::layout_document` fits.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &CvDocument) -> Result<Vec<u8>, RenderError>;
}

/// Runs `renderer` on tokio's blocking pool so the request task stays responsive.
pub async fn render_blocking(
    renderer: Arc<dyn DocumentRenderer>,
    document: CvDocument,
) -> Result<Bytes, RenderError> {
    tokio::task::spawn_blocking(move || renderer.render(&document))
        .await
        .map_err(|e| RenderError::Task(e.to_string()))?
        .map(Bytes::from)
}
