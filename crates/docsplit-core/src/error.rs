// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Docsplit.

use thiserror::Error;

use crate::types::{Category, DocumentId};

/// Top-level error type for all Docsplit operations.
#[derive(Debug, Error)]
pub enum SplitError {
    // -- Intake --
    #[error("document could not be loaded: {0}")]
    Load(String),

    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("invalid page range: {0}")]
    InvalidRange(String),

    // -- Rendering / extraction --
    #[error("page {page} could not be rendered: {reason}")]
    Render { page: usize, reason: String },

    #[error("extraction of {category} failed: {reason}")]
    Extraction { category: Category, reason: String },

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Packaging --
    #[error("archive could not be built: {0}")]
    Packaging(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SplitError>;
