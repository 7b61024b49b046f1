// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsplit-document: PDF side of the Docsplit engine.
//
// Loads source PDFs, re-composes selected pages into fresh documents (with
// rotation), renders single-page previews, runs per-category extraction, and
// packages outputs into ZIP archives.

pub mod archive;
pub mod extract;
pub mod pdf;
pub mod render;

#[cfg(feature = "raster")]
pub mod image;

// Re-export the primary structs so callers can use `docsplit_document::PdfReader` etc.
pub use archive::{Archive, ArchiveEntry, ArchivePackager};
pub use extract::{CategoryFailure, ExtractionReport, Extractor, plan_from_page_map};
pub use pdf::reader::PdfReader;
pub use render::{PageRenderer, PdfPageRenderer, RenderedPage, renderer_for};

#[cfg(feature = "raster")]
pub use crate::image::processor::ImageProcessor;
#[cfg(feature = "raster")]
pub use render::raster::RasterPageRenderer;
