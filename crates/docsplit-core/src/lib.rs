// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Docsplit: Core types, error definitions, and the content-blind page
// classifiers shared across all crates.

pub mod classify;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod identifier;
pub mod types;

pub use classify::{classify_by_position, classify_by_ranges, validate_disjoint};
pub use config::AppConfig;
pub use error::SplitError;
pub use identifier::{UNKNOWN_IDENTIFIER, extract_identifier};
pub use types::*;
