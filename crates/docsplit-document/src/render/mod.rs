// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page previews: render one source page at a given rotation.
//
// The editor only needs *something* displayable per page. The default
// renderer hands back a one-page PDF; with the `raster` feature a PNG can be
// produced instead through pdfium.

#[cfg(feature = "raster")]
pub mod raster;

use docsplit_core::config::{AppConfig, PreviewFormat};
use docsplit_core::error::{Result, SplitError};
use docsplit_core::types::Rotation;
use tracing::debug;

use crate::pdf::reader::PdfReader;

/// A rendered preview of a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

/// Renders single-page previews.
///
/// Implementations must be pure with respect to the reader: rendering never
/// mutates the source document.
pub trait PageRenderer: Send + Sync {
    /// Render page `source_index` (0-based) of `source` rotated by `rotation`.
    ///
    /// Any failure is reported as [`SplitError::Render`] for that page.
    fn render_page(
        &self,
        source: &PdfReader,
        source_index: usize,
        rotation: Rotation,
    ) -> Result<RenderedPage>;
}

/// Preview as a standalone one-page PDF carrying the page's `/Rotate`.
#[derive(Debug, Clone)]
pub struct PdfPageRenderer {
    pdf_version: String,
}

impl PdfPageRenderer {
    pub fn new(pdf_version: impl Into<String>) -> Self {
        Self {
            pdf_version: pdf_version.into(),
        }
    }
}

impl Default for PdfPageRenderer {
    fn default() -> Self {
        Self::new("1.5")
    }
}

impl PageRenderer for PdfPageRenderer {
    fn render_page(
        &self,
        source: &PdfReader,
        source_index: usize,
        rotation: Rotation,
    ) -> Result<RenderedPage> {
        let bytes = source
            .single_page(source_index, rotation, &self.pdf_version)
            .map_err(|err| render_error(source_index, err))?;
        debug!(source_index, rotation = rotation.degrees(), bytes = bytes.len(), "PDF preview rendered");
        Ok(RenderedPage {
            bytes,
            mime_type: "application/pdf",
        })
    }
}

/// Wrap any failure as a render error for `page`.
pub(crate) fn render_error(page: usize, err: SplitError) -> SplitError {
    match err {
        SplitError::Render { .. } => err,
        other => SplitError::Render {
            page,
            reason: other.to_string(),
        },
    }
}

/// Pick the preview renderer the configuration asks for.
///
/// Raster previews need the `raster` feature; without it the PDF renderer is
/// used and a warning is logged.
pub fn renderer_for(config: &AppConfig) -> Box<dyn PageRenderer> {
    match config.preview.format {
        PreviewFormat::Pdf => Box::new(PdfPageRenderer::new(config.output_pdf_version.clone())),
        PreviewFormat::Raster => raster_renderer(config),
    }
}

#[cfg(feature = "raster")]
fn raster_renderer(config: &AppConfig) -> Box<dyn PageRenderer> {
    Box::new(raster::RasterPageRenderer::new(
        config.preview.target_width,
        config.output_pdf_version.clone(),
    ))
}

#[cfg(not(feature = "raster"))]
fn raster_renderer(config: &AppConfig) -> Box<dyn PageRenderer> {
    tracing::warn!("raster previews need the `raster` feature; falling back to PDF previews");
    Box::new(PdfPageRenderer::new(config.output_pdf_version.clone()))
}
