// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session store: owns every loaded document, its edit state, and the blobs
// handed out for previews and outputs.
//
// All mutation goes through `&mut self`, so rotation and extraction of the same
// document can never interleave. `SessionService` adds the async, shareable
// facade on top.

use docsplit_core::classify::{classify_by_position, classify_by_ranges, validate_disjoint};
use docsplit_core::config::AppConfig;
use docsplit_core::error::{Result, SplitError};
use docsplit_core::types::{
    Category, DocumentConfig, DocumentId, ExtractionPlan, OutputDocument, PageMap, RotateDirection,
};
use docsplit_document::{
    Archive, ArchiveEntry, ArchivePackager, ExtractionReport, Extractor, PageRenderer, PdfReader,
    plan_from_page_map, renderer_for,
};
use tracing::{debug, info, instrument, warn};

use crate::blob::{Blob, BlobHandle, BlobStore};
use crate::document::SourceDocument;
use crate::edit::PageEditState;

/// Every document loaded in one user session.
pub struct Session {
    config: AppConfig,
    documents: Vec<SourceDocument>,
    blobs: BlobStore,
    renderer: Box<dyn PageRenderer>,
    extractor: Extractor,
    packager: ArchivePackager,
}

impl Session {
    /// Session with the preview renderer selected by `config`.
    pub fn new(config: AppConfig) -> Self {
        let renderer = renderer_for(&config);
        Self::with_renderer(config, renderer)
    }

    pub fn with_renderer(config: AppConfig, renderer: Box<dyn PageRenderer>) -> Self {
        Self {
            extractor: Extractor::from_config(&config),
            packager: ArchivePackager::from_config(&config),
            config,
            documents: Vec::new(),
            blobs: BlobStore::new(),
            renderer,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // -- Documents ------------------------------------------------------------

    /// Parse `bytes` as a PDF and add it to the session.
    ///
    /// Nothing is added when the bytes are not a readable PDF.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub fn load_document(&mut self, name: &str, bytes: &[u8]) -> Result<DocumentId> {
        let reader = PdfReader::from_bytes(bytes)?;
        let document = SourceDocument::new(name, reader, bytes);

        if let Some(existing) = self
            .documents
            .iter()
            .find(|existing| existing.fingerprint == document.fingerprint)
        {
            warn!(duplicate_of = %existing.original_name, "identical document already loaded");
        }

        info!(
            id = %document.id,
            identifier = %document.identifier,
            pages = document.page_count,
            "Document loaded"
        );
        let id = document.id;
        self.documents.push(document);
        Ok(id)
    }

    /// Drop a document and revoke every preview and output handle it owns.
    #[instrument(skip(self))]
    pub fn remove_document(&mut self, id: DocumentId) -> Result<()> {
        let position = self
            .documents
            .iter()
            .position(|doc| doc.id == id)
            .ok_or(SplitError::DocumentNotFound(id))?;
        let mut document = self.documents.remove(position);
        document.release(&mut self.blobs);
        info!(name = %document.original_name, "Document removed");
        Ok(())
    }

    /// Documents in load order.
    pub fn documents(&self) -> impl Iterator<Item = &SourceDocument> {
        self.documents.iter()
    }

    pub fn document(&self, id: DocumentId) -> Result<&SourceDocument> {
        self.documents
            .iter()
            .find(|doc| doc.id == id)
            .ok_or(SplitError::DocumentNotFound(id))
    }

    /// Resolve a preview or output handle. Revoked handles resolve to `None`.
    pub fn blob(&self, handle: BlobHandle) -> Option<&Blob> {
        self.blobs.get(handle)
    }

    /// Borrow a document together with the stores its operations need.
    fn parts(
        &mut self,
        id: DocumentId,
    ) -> Result<(&mut SourceDocument, &mut BlobStore, &dyn PageRenderer)> {
        let Session {
            documents,
            blobs,
            renderer,
            ..
        } = self;
        let document = documents
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or(SplitError::DocumentNotFound(id))?;
        Ok((document, blobs, &**renderer))
    }

    // -- Editing --------------------------------------------------------------

    /// Seed the editor from the positional classifier.
    ///
    /// Re-opening re-seeds: previous previews are revoked and the document
    /// counts as unedited again.
    #[instrument(skip(self))]
    pub fn open_editor(&mut self, id: DocumentId) -> Result<&PageEditState> {
        let page_map = classify_by_position(self.document(id)?.page_count);
        self.seed(id, &page_map)
    }

    /// Seed the editor from user-supplied page boundaries.
    ///
    /// Unlike the classifier itself, this rejects boundaries that put one page
    /// into two categories.
    #[instrument(skip(self))]
    pub fn apply_manual_config(
        &mut self,
        id: DocumentId,
        config: DocumentConfig,
    ) -> Result<&PageEditState> {
        let page_map = classify_by_ranges(&config, self.document(id)?.page_count);
        validate_disjoint(&page_map)?;
        self.seed(id, &page_map)
    }

    fn seed(&mut self, id: DocumentId, page_map: &PageMap) -> Result<&PageEditState> {
        let (document, blobs, renderer) = self.parts(id)?;
        let state = PageEditState::initialize(&document.reader, page_map, renderer, blobs)?;

        if let Some(mut previous) = document.classification.take() {
            previous.release(blobs);
        }
        document.edited = false;
        Ok(&*document.classification.insert(state))
    }

    /// Rotate one page of an open editor.
    ///
    /// `Ok(false)` when the editor is not open or there is no such page.
    #[instrument(skip(self))]
    pub fn rotate(
        &mut self,
        id: DocumentId,
        category: Category,
        position: usize,
        direction: RotateDirection,
    ) -> Result<bool> {
        let (document, blobs, renderer) = self.parts(id)?;
        let Some(state) = document.classification.as_mut() else {
            debug!("editor not open; ignoring rotation");
            return Ok(false);
        };

        let rotated = state.rotate(category, position, direction, &document.reader, renderer, blobs)?;
        if rotated {
            document.edited = true;
        }
        Ok(rotated)
    }

    /// Rotate the page showing source page `source_index` within `category`.
    pub fn rotate_by_source_index(
        &mut self,
        id: DocumentId,
        category: Category,
        source_index: usize,
        direction: RotateDirection,
    ) -> Result<bool> {
        let position = self
            .document(id)?
            .classification
            .as_ref()
            .and_then(|state| state.position_of(category, source_index));

        match position {
            Some(position) => self.rotate(id, category, position, direction),
            None => {
                debug!(%category, source_index, "page not in category; ignoring rotation");
                Ok(false)
            }
        }
    }

    /// Rotation addressed by category key (`"cedula"`, `"titulo"`, ...).
    pub fn rotate_by_key(
        &mut self,
        id: DocumentId,
        category_key: &str,
        position: usize,
        direction: RotateDirection,
    ) -> Result<bool> {
        let category: Category = category_key.parse()?;
        self.rotate(id, category, position, direction)
    }

    // -- Extraction -----------------------------------------------------------

    /// Extract from the current edit state and publish the outputs.
    ///
    /// Without an open editor the positional classification is used.
    /// Previously published outputs are revoked and replaced.
    #[instrument(skip(self))]
    pub fn save_changes(&mut self, id: DocumentId) -> Result<ExtractionReport> {
        let Session {
            documents,
            blobs,
            extractor,
            ..
        } = self;
        let document = documents
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or(SplitError::DocumentNotFound(id))?;

        let plan = current_plan(document);
        let report = extractor.extract(&document.reader, &plan, &document.identifier);
        document.publish(report.outputs.clone(), blobs);

        if !report.is_complete() {
            warn!(missing = ?report.missing_categories(), "some categories were not extracted");
        }
        Ok(report)
    }

    /// Extract a document that has no outputs yet.
    ///
    /// Returns `Ok(None)` when outputs are already published.
    pub fn generate_outputs(&mut self, id: DocumentId) -> Result<Option<ExtractionReport>> {
        if self.document(id)?.has_outputs() {
            debug!(%id, "outputs already generated");
            return Ok(None);
        }
        self.save_changes(id).map(Some)
    }

    /// Ids of documents that have no published outputs, in load order.
    pub fn pending_documents(&self) -> Vec<DocumentId> {
        self.documents
            .iter()
            .filter(|doc| !doc.has_outputs())
            .map(|doc| doc.id)
            .collect()
    }

    // -- Packaging ------------------------------------------------------------

    /// Archive one document's outputs, generating them first if needed.
    #[instrument(skip(self))]
    pub fn archive_document(&mut self, id: DocumentId) -> Result<Archive> {
        self.generate_outputs(id)?;
        let document = self.document(id)?;
        if !document.has_outputs() {
            return Err(SplitError::Packaging(format!(
                "{} produced no documents",
                document.original_name
            )));
        }

        let outputs = owned_outputs(document);
        self.packager.pack(&[ArchiveEntry {
            source_name: &document.original_name,
            outputs: &outputs,
        }])
    }

    /// Generate outputs for every pending document, then archive everything.
    pub fn archive_all(&mut self) -> Result<Archive> {
        for id in self.pending_documents() {
            self.generate_outputs(id)?;
        }
        self.pack_all()
    }

    /// Archive every document that has outputs, one folder each, under the
    /// batch archive name.
    #[instrument(skip(self))]
    pub fn pack_all(&self) -> Result<Archive> {
        let packed: Vec<(&str, Vec<OutputDocument>)> = self
            .documents
            .iter()
            .filter(|doc| doc.has_outputs())
            .map(|doc| (doc.original_name.as_str(), owned_outputs(doc)))
            .collect();

        let entries: Vec<ArchiveEntry<'_>> = packed
            .iter()
            .map(|(source_name, outputs)| ArchiveEntry {
                source_name: *source_name,
                outputs: outputs.as_slice(),
            })
            .collect();
        self.packager.pack_batch(&entries)
    }
}

fn current_plan(document: &SourceDocument) -> ExtractionPlan {
    match &document.classification {
        Some(state) => state.to_plan(),
        None => plan_from_page_map(&classify_by_position(document.page_count)),
    }
}

fn owned_outputs(document: &SourceDocument) -> Vec<OutputDocument> {
    document
        .outputs
        .iter()
        .map(|output| output.document.clone())
        .collect()
}
