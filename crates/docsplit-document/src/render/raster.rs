// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster previews through pdfium (behind the "raster" feature).
//
// The page is first composed into a one-page PDF carrying its `/Rotate`, so
// pdfium renders exactly what extraction will produce.

use docsplit_core::error::{Result, SplitError};
use docsplit_core::types::Rotation;
use pdfium_render::prelude::*;
use tracing::{debug, instrument};

use super::{PageRenderer, RenderedPage, render_error};
use crate::image::processor::ImageProcessor;
use crate::pdf::reader::PdfReader;

/// PNG previews scaled to a fixed width.
#[derive(Debug, Clone)]
pub struct RasterPageRenderer {
    target_width: u32,
    pdf_version: String,
}

impl RasterPageRenderer {
    pub fn new(target_width: u32, pdf_version: impl Into<String>) -> Self {
        Self {
            target_width: target_width.max(1),
            pdf_version: pdf_version.into(),
        }
    }
}

impl PageRenderer for RasterPageRenderer {
    #[instrument(skip(self, source), fields(target_width = self.target_width))]
    fn render_page(
        &self,
        source: &PdfReader,
        source_index: usize,
        rotation: Rotation,
    ) -> Result<RenderedPage> {
        let single = source
            .single_page(source_index, rotation, &self.pdf_version)
            .map_err(|err| render_error(source_index, err))?;

        let fail = |reason: String| SplitError::Render {
            page: source_index,
            reason,
        };

        // Bound per call: a `Pdfium` handle is not shareable across threads.
        let pdfium = Pdfium::bind_to_system_library()
            .map(Pdfium::new)
            .map_err(|err| fail(format!("pdfium unavailable: {err}")))?;
        let document = pdfium
            .load_pdf_from_byte_slice(&single, None)
            .map_err(|err| fail(format!("pdfium could not load page: {err}")))?;
        let page = document
            .pages()
            .get(0)
            .map_err(|err| fail(format!("pdfium lost the page: {err}")))?;

        let width = i32::try_from(self.target_width).unwrap_or(i32::MAX);
        let bitmap = page
            .render_with_config(&PdfRenderConfig::new().set_target_width(width))
            .map_err(|err| fail(format!("rasterisation failed: {err}")))?;

        let bytes = ImageProcessor::from_dynamic(bitmap.as_image())
            .fit_within(self.target_width, self.target_width.saturating_mul(2))
            .to_png_bytes()
            .map_err(|err| render_error(source_index, err))?;

        debug!(source_index, bytes = bytes.len(), "raster preview rendered");
        Ok(RenderedPage {
            bytes,
            mime_type: "image/png",
        })
    }
}
