// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A loaded source document and what the session has derived from it.

use chrono::{DateTime, Utc};
use docsplit_core::identifier::extract_identifier;
use docsplit_core::types::{Category, DocumentId, OutputDocument};
use docsplit_document::PdfReader;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::blob::{BlobHandle, BlobStore};
use crate::edit::PageEditState;

/// SHA-256 of `data`, lowercase hex.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// A generated output and the handle it is published under.
#[derive(Debug, Clone)]
pub struct PublishedOutput {
    pub document: OutputDocument,
    pub handle: BlobHandle,
}

/// One loaded input PDF.
///
/// `page_count`, `identifier` and `fingerprint` are fixed at load; the parsed
/// source is never mutated.
#[derive(Debug)]
pub struct SourceDocument {
    pub(crate) id: DocumentId,
    pub(crate) original_name: String,
    pub(crate) page_count: usize,
    pub(crate) reader: PdfReader,
    pub(crate) identifier: String,
    pub(crate) fingerprint: String,
    pub(crate) loaded_at: DateTime<Utc>,
    pub(crate) classification: Option<PageEditState>,
    pub(crate) edited: bool,
    pub(crate) outputs: Vec<PublishedOutput>,
}

impl SourceDocument {
    pub(crate) fn new(original_name: &str, reader: PdfReader, bytes: &[u8]) -> Self {
        Self {
            id: DocumentId::new(),
            original_name: original_name.to_string(),
            page_count: reader.page_count(),
            identifier: extract_identifier(original_name),
            fingerprint: fingerprint(bytes),
            loaded_at: Utc::now(),
            reader,
            classification: None,
            edited: false,
            outputs: Vec::new(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn reader(&self) -> &PdfReader {
        &self.reader
    }

    /// National ID number derived from the file name, or `"unknown"`.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Edit state, present once the editor has been opened.
    pub fn classification(&self) -> Option<&PageEditState> {
        self.classification.as_ref()
    }

    /// `true` once any page has been rotated since the editor was opened.
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn outputs(&self) -> &[PublishedOutput] {
        &self.outputs
    }

    pub fn has_outputs(&self) -> bool {
        !self.outputs.is_empty()
    }

    /// Replace published outputs, revoking the previous handles.
    pub(crate) fn publish(&mut self, outputs: Vec<OutputDocument>, blobs: &mut BlobStore) {
        self.revoke_outputs(blobs);
        self.outputs = outputs
            .into_iter()
            .map(|document| PublishedOutput {
                handle: blobs.register(document.content.clone(), OutputDocument::MIME_TYPE),
                document,
            })
            .collect();
    }

    pub(crate) fn revoke_outputs(&mut self, blobs: &mut BlobStore) {
        for output in self.outputs.drain(..) {
            blobs.revoke(output.handle);
        }
    }

    /// Revoke every handle this document owns.
    pub(crate) fn release(&mut self, blobs: &mut BlobStore) {
        if let Some(mut state) = self.classification.take() {
            state.release(blobs);
        }
        self.revoke_outputs(blobs);
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            original_name: self.original_name.clone(),
            page_count: self.page_count,
            identifier: self.identifier.clone(),
            fingerprint: self.fingerprint.clone(),
            loaded_at: self.loaded_at,
            editor_open: self.classification.is_some(),
            edited: self.edited,
            outputs: self
                .outputs
                .iter()
                .map(|output| OutputSummary {
                    file_name: output.document.file_name.clone(),
                    category: output.document.category,
                    handle: output.handle,
                })
                .collect(),
        }
    }
}

/// Serializable view of a document for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub original_name: String,
    pub page_count: usize,
    pub identifier: String,
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
    pub editor_open: bool,
    pub edited: bool,
    pub outputs: Vec<OutputSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSummary {
    pub file_name: String,
    pub category: Category,
    pub handle: BlobHandle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsplit_document::pdf::fixtures::sample_pdf;

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            fingerprint(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn load_derives_identifier_and_page_count() {
        let bytes = sample_pdf(4);
        let reader = PdfReader::from_bytes(&bytes).expect("load");
        let doc = SourceDocument::new("V-9.876.543 expediente.pdf", reader, &bytes);

        assert_eq!(doc.identifier(), "9876543");
        assert_eq!(doc.page_count(), 4);
        assert_eq!(doc.fingerprint(), fingerprint(&bytes));
        assert!(!doc.has_outputs());
        assert!(doc.classification().is_none());
    }

    #[test]
    fn republishing_revokes_old_handles() {
        let bytes = sample_pdf(1);
        let reader = PdfReader::from_bytes(&bytes).expect("load");
        let mut doc = SourceDocument::new("x.pdf", reader, &bytes);
        let mut blobs = BlobStore::new();
        let output = OutputDocument {
            file_name: "unknown - cedula.pdf".into(),
            category: Category::Identity,
            content: b"%PDF".to_vec(),
        };

        doc.publish(vec![output.clone()], &mut blobs);
        let first = doc.outputs()[0].handle;
        doc.publish(vec![output], &mut blobs);

        assert!(!blobs.contains(first));
        assert_eq!(blobs.len(), 1);
        assert_eq!(doc.summary().outputs.len(), 1);
    }
}
