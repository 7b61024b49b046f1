// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async service facade over the session store.
//
// The store is wrapped in `Arc<tokio::sync::Mutex<>>` and every call holds the
// lock for its whole duration, so operations on a document are serialised.

use std::path::Path;
use std::sync::Arc;

use docsplit_core::config::AppConfig;
use docsplit_core::error::{Result, SplitError};
use docsplit_core::types::{Category, DocumentConfig, DocumentId, RotateDirection};
use docsplit_document::{Archive, ExtractionReport};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::blob::{Blob, BlobHandle};
use crate::document::DocumentSummary;
use crate::edit::PageEdit;
use crate::session::Session;

/// Cheaply cloneable handle to a shared [`Session`].
#[derive(Clone)]
pub struct SessionService {
    session: Arc<Mutex<Session>>,
}

impl SessionService {
    pub fn new(config: AppConfig) -> Self {
        Self::from_session(Session::new(config))
    }

    pub fn from_session(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    // -- Intake ---------------------------------------------------------------

    pub async fn load_document(&self, name: &str, bytes: Vec<u8>) -> Result<DocumentId> {
        self.session.lock().await.load_document(name, &bytes)
    }

    /// Read a PDF from disk and load it under its file name.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load_path(&self, path: impl AsRef<Path>) -> Result<DocumentId> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.load_document(&name, bytes).await
    }

    pub async fn remove_document(&self, id: DocumentId) -> Result<()> {
        self.session.lock().await.remove_document(id)
    }

    /// Snapshot of every loaded document, in load order.
    pub async fn documents(&self) -> Vec<DocumentSummary> {
        self.session
            .lock()
            .await
            .documents()
            .map(|document| document.summary())
            .collect()
    }

    pub async fn document(&self, id: DocumentId) -> Result<DocumentSummary> {
        Ok(self.session.lock().await.document(id)?.summary())
    }

    /// Copy of the binary behind `handle`, if it is still live.
    pub async fn blob(&self, handle: BlobHandle) -> Option<Blob> {
        self.session.lock().await.blob(handle).cloned()
    }

    // -- Editing --------------------------------------------------------------

    /// Open the editor positionally and return its pages in category order.
    pub async fn open_editor(&self, id: DocumentId) -> Result<Vec<PageEdit>> {
        let mut session = self.session.lock().await;
        let state = session.open_editor(id)?;
        Ok(state.categories().flat_map(|category| state.pages(category).to_vec()).collect())
    }

    pub async fn apply_manual_config(
        &self,
        id: DocumentId,
        config: DocumentConfig,
    ) -> Result<Vec<PageEdit>> {
        let mut session = self.session.lock().await;
        let state = session.apply_manual_config(id, config)?;
        Ok(state.categories().flat_map(|category| state.pages(category).to_vec()).collect())
    }

    pub async fn rotate(
        &self,
        id: DocumentId,
        category: Category,
        position: usize,
        direction: RotateDirection,
    ) -> Result<bool> {
        self.session.lock().await.rotate(id, category, position, direction)
    }

    pub async fn rotate_by_source_index(
        &self,
        id: DocumentId,
        category: Category,
        source_index: usize,
        direction: RotateDirection,
    ) -> Result<bool> {
        self.session
            .lock()
            .await
            .rotate_by_source_index(id, category, source_index, direction)
    }

    pub async fn rotate_by_key(
        &self,
        id: DocumentId,
        category_key: &str,
        position: usize,
        direction: RotateDirection,
    ) -> Result<bool> {
        self.session
            .lock()
            .await
            .rotate_by_key(id, category_key, position, direction)
    }

    // -- Extraction & packaging -----------------------------------------------

    pub async fn save_changes(&self, id: DocumentId) -> Result<ExtractionReport> {
        self.session.lock().await.save_changes(id)
    }

    pub async fn generate_outputs(&self, id: DocumentId) -> Result<Option<ExtractionReport>> {
        self.session.lock().await.generate_outputs(id)
    }

    pub async fn archive_document(&self, id: DocumentId) -> Result<Archive> {
        self.session.lock().await.archive_document(id)
    }

    /// Generate every pending document one at a time, then pack them all.
    ///
    /// The session lock is taken once per document and released in between,
    /// so other callers can interleave. Each document's outputs are committed
    /// as soon as it finishes, so a failure part-way leaves the earlier
    /// documents generated. Documents removed while the batch runs are skipped.
    #[instrument(skip(self))]
    pub async fn archive_all(&self) -> Result<Archive> {
        let pending = self.session.lock().await.pending_documents();
        info!(pending = pending.len(), "Generating pending documents");

        for id in pending {
            let generated = self.session.lock().await.generate_outputs(id);
            match generated {
                Ok(_) => {}
                Err(SplitError::DocumentNotFound(_)) => {
                    debug!(%id, "document removed during batch; skipping");
                }
                Err(err) => return Err(err),
            }
            tokio::task::yield_now().await;
        }
        self.session.lock().await.pack_all()
    }
}
