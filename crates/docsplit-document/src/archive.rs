// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Archive packaging: bundle generated documents into one ZIP, one folder per
// source document.

use std::collections::BTreeSet;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use docsplit_core::config::{AppConfig, ArchiveCompression, BATCH_ARCHIVE_NAME};
use docsplit_core::error::{Result, SplitError};
use docsplit_core::types::OutputDocument;
use tracing::{debug, info, instrument};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Outputs of one source document, as handed to the packager.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEntry<'a> {
    /// Original file name of the source document (extension included).
    pub source_name: &'a str,
    pub outputs: &'a [OutputDocument],
}

/// A finished archive, ready to be offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Archive {
    pub const MIME_TYPE: &'static str = "application/zip";
}

/// Folder used for sources whose name leaves nothing usable.
const FALLBACK_FOLDER: &str = "documento";

/// `"scan 12.345.678.pdf"` → `"scan 12.345.678"`.
pub fn strip_extension(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
}

/// Archive folder for a source file name: the stem with path separators
/// replaced, never empty, `.` or `..`.
pub fn folder_name(source_name: &str) -> String {
    let stem: String = strip_extension(source_name)
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    let trimmed = stem.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        FALLBACK_FOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// How the finished archive is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Naming {
    /// After the folder when there is exactly one entry, else the batch name.
    Auto,
    /// Always the batch name.
    Batch,
}

/// Builds ZIP archives from extraction outputs.
#[derive(Debug, Clone)]
pub struct ArchivePackager {
    compression: ArchiveCompression,
    compression_level: Option<i64>,
    batch_name: String,
}

impl Default for ArchivePackager {
    fn default() -> Self {
        Self {
            compression: ArchiveCompression::Deflated,
            compression_level: None,
            batch_name: BATCH_ARCHIVE_NAME.to_string(),
        }
    }
}

impl ArchivePackager {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            compression: config.archive_compression,
            compression_level: config.compression_level,
            batch_name: config.batch_archive_name.clone(),
        }
    }

    /// Package `entries` into a single archive.
    ///
    /// Each entry becomes a folder named after its source document without the
    /// extension; colliding folder names get a ` (2)`, ` (3)`, ... suffix. A
    /// single entry names the archive after its folder, several entries use
    /// the batch name. Nothing partial is ever returned.
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub fn pack(&self, entries: &[ArchiveEntry<'_>]) -> Result<Archive> {
        self.pack_named(entries, Naming::Auto)
    }

    /// Package `entries` as the "download everything" archive, which carries
    /// the batch name however many documents it holds.
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub fn pack_batch(&self, entries: &[ArchiveEntry<'_>]) -> Result<Archive> {
        self.pack_named(entries, Naming::Batch)
    }

    fn pack_named(&self, entries: &[ArchiveEntry<'_>], naming: Naming) -> Result<Archive> {
        if entries.is_empty() {
            return Err(SplitError::Packaging("nothing to package".into()));
        }

        let options = self.file_options();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut folders = BTreeSet::new();
        let mut first_folder = None;

        for entry in entries {
            let folder = unique_folder(&folder_name(entry.source_name), &mut folders);
            writer
                .add_directory(format!("{folder}/"), options)
                .map_err(packaging_error)?;

            for output in entry.outputs {
                writer
                    .start_file(format!("{folder}/{}", output.file_name), options)
                    .map_err(packaging_error)?;
                write_content(&mut writer, &output.content)?;
            }

            debug!(%folder, files = entry.outputs.len(), "folder packed");
            first_folder.get_or_insert(folder);
        }

        let bytes = writer.finish().map_err(packaging_error)?.into_inner();

        let file_name = match (naming, entries.len(), first_folder) {
            (Naming::Auto, 1, Some(folder)) => format!("{folder}.zip"),
            _ => self.batch_name.clone(),
        };

        info!(%file_name, bytes = bytes.len(), "Archive packed");
        Ok(Archive { file_name, bytes })
    }

    fn file_options(&self) -> SimpleFileOptions {
        let method = match self.compression {
            ArchiveCompression::Stored => CompressionMethod::Stored,
            ArchiveCompression::Deflated => CompressionMethod::Deflated,
        };
        SimpleFileOptions::default()
            .compression_method(method)
            .compression_level(self.compression_level)
    }
}

fn unique_folder(stem: &str, taken: &mut BTreeSet<String>) -> String {
    let mut candidate = stem.to_string();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{stem} ({suffix})");
        suffix += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

fn packaging_error(err: zip::result::ZipError) -> SplitError {
    SplitError::Packaging(err.to_string())
}

/// Write one entry's bytes; a failed write is a packaging failure.
fn write_content<W: Write + Seek>(writer: &mut ZipWriter<W>, content: &[u8]) -> Result<()> {
    writer
        .write_all(content)
        .map_err(|err| SplitError::Packaging(err.to_string()))
}
