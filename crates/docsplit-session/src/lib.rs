// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsplit-session: per-user session state for the Docsplit engine.
//
// Holds loaded documents, their page edit state and published outputs, and
// exposes the intake operations both synchronously (`Session`) and through an
// async, shareable facade (`SessionService`).

pub mod blob;
pub mod document;
pub mod edit;
pub mod service;
pub mod session;
pub mod telemetry;

pub use blob::{Blob, BlobHandle, BlobStore};
pub use document::{DocumentSummary, OutputSummary, PublishedOutput, SourceDocument};
pub use edit::{PageEdit, PageEditState};
pub use service::SessionService;
pub use session::Session;
pub use telemetry::init_tracing;
