// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Result, SplitError};

/// Name the batch ("download everything") archive is given.
pub const BATCH_ARCHIVE_NAME: &str = "todos_los_documentos.zip";

/// How output PDFs are stored inside the ZIP archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveCompression {
    /// No compression (PDF streams are usually compressed already).
    Stored,
    /// DEFLATE.
    Deflated,
}

/// What a page preview handle contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewFormat {
    /// A standalone one-page PDF.
    Pdf,
    /// A PNG raster (requires the `raster` feature of `docsplit-document`).
    Raster,
}

/// Preview rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub format: PreviewFormat,
    /// Target raster width in pixels (raster previews only).
    pub target_width: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            format: PreviewFormat::Pdf,
            target_width: 600,
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// PDF header version written into generated documents.
    pub output_pdf_version: String,
    /// Compression method for archive entries.
    pub archive_compression: ArchiveCompression,
    /// Optional DEFLATE level (0–9); `None` uses the zip default.
    pub compression_level: Option<i64>,
    /// Page preview settings.
    pub preview: PreviewConfig,
    /// File name of the archive produced by "download all".
    pub batch_archive_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_pdf_version: "1.5".to_string(),
            archive_compression: ArchiveCompression::Deflated,
            compression_level: None,
            preview: PreviewConfig::default(),
            batch_archive_name: BATCH_ARCHIVE_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&data)?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.output_pdf_version.as_str(), "1.4" | "1.5" | "1.6" | "1.7" | "2.0") {
            return Err(SplitError::Config(format!(
                "unsupported PDF version {:?}",
                self.output_pdf_version
            )));
        }
        if let Some(level) = self.compression_level {
            if !(0..=9).contains(&level) {
                return Err(SplitError::Config(format!(
                    "compression level must be 0-9, got {level}"
                )));
            }
        }
        if self.preview.target_width == 0 {
            return Err(SplitError::Config("preview width must be positive".into()));
        }
        if !self.batch_archive_name.ends_with(".zip") {
            return Err(SplitError::Config(format!(
                "batch archive name {:?} must end in .zip",
                self.batch_archive_name
            )));
        }
        Ok(())
    }
}
