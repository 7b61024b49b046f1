// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Revocable in-memory binaries (page previews, generated PDFs).
//
// Callers only ever see a `BlobHandle`. Once a handle is revoked its bytes are
// dropped and lookups return `None`; handles are never reused.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

/// Opaque reference to a stored binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BlobHandle(u64);

impl std::fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "blob:{}", self.0)
    }
}

/// A stored binary and its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Default)]
pub struct BlobStore {
    next: u64,
    blobs: HashMap<BlobHandle, Blob>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, bytes: Vec<u8>, mime_type: impl Into<String>) -> BlobHandle {
        self.next += 1;
        let handle = BlobHandle(self.next);
        self.blobs.insert(
            handle,
            Blob {
                bytes,
                mime_type: mime_type.into(),
            },
        );
        handle
    }

    pub fn get(&self, handle: BlobHandle) -> Option<&Blob> {
        self.blobs.get(&handle)
    }

    pub fn contains(&self, handle: BlobHandle) -> bool {
        self.blobs.contains_key(&handle)
    }

    /// Drop the binary behind `handle`. Returns `false` if it was already gone.
    pub fn revoke(&mut self, handle: BlobHandle) -> bool {
        let revoked = self.blobs.remove(&handle).is_some();
        if revoked {
            debug!(%handle, "blob revoked");
        }
        revoked
    }

    /// Number of live blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}
