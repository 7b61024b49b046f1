// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: loading source documents and composing new ones from their pages.

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod reader;

pub use reader::PdfReader;
