// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page classification: assign page indices to categories either by the fixed
// positional heuristic or from user-supplied page boundaries.
//
// Neither classifier looks at page content.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, SplitError};
use crate::types::{Category, DocumentConfig, PageMap};

/// Upper bound on pages given to `Credentials` by the positional heuristic.
pub const MAX_CREDENTIAL_PAGES: usize = 4;

/// Pages the heuristic keeps back for the service letter and résumé.
pub const RESERVED_TRAILING_PAGES: usize = 2;

/// Partition `page_count` pages into categories by position alone.
///
/// Greedy, left to right: one page of identity, one of tax ID, up to four
/// credential pages (never eating into the last two pages), one service
/// letter, and everything left over is the résumé. Categories that receive no
/// page are omitted. Total for every `page_count`, including zero.
pub fn classify_by_position(page_count: usize) -> PageMap {
    let mut groups = PageMap::new();
    let mut cursor = 0;

    if cursor < page_count {
        groups.insert(Category::Identity, vec![cursor]);
        cursor += 1;
    }
    if cursor < page_count {
        groups.insert(Category::TaxId, vec![cursor]);
        cursor += 1;
    }

    let credentials_end =
        (cursor + MAX_CREDENTIAL_PAGES).min(page_count.saturating_sub(RESERVED_TRAILING_PAGES));
    let credentials: Vec<usize> = (cursor..credentials_end.max(cursor)).collect();
    cursor += credentials.len();
    if !credentials.is_empty() {
        groups.insert(Category::Credentials, credentials);
    }

    if cursor < page_count {
        groups.insert(Category::ServiceLetter, vec![cursor]);
        cursor += 1;
    }

    let resume: Vec<usize> = (cursor..page_count).collect();
    if !resume.is_empty() {
        groups.insert(Category::Resume, resume);
    }

    debug!(page_count, categories = groups.len(), "classified by position");
    groups
}

/// Build a page map from 1-based user boundaries.
///
/// Every boundary is clamped into the document. An inverted credentials range
/// yields no credentials. Overlaps are *not* rejected here; see
/// [`validate_disjoint`].
pub fn classify_by_ranges(config: &DocumentConfig, page_count: usize) -> PageMap {
    let mut groups = PageMap::new();
    if page_count == 0 {
        return groups;
    }

    let index = |page: u32| -> usize {
        usize::try_from(page)
            .unwrap_or(usize::MAX)
            .saturating_sub(1)
            .min(page_count - 1)
    };

    groups.insert(Category::Identity, vec![index(config.cedula)]);
    groups.insert(Category::TaxId, vec![index(config.rif)]);

    let credentials: Vec<usize> = (index(config.titulo_start)..=index(config.titulo_end)).collect();
    if !credentials.is_empty() {
        groups.insert(Category::Credentials, credentials);
    }

    groups.insert(Category::ServiceLetter, vec![index(config.constancia)]);
    groups.insert(
        Category::Resume,
        (index(config.curriculum_start)..page_count).collect(),
    );

    debug!(page_count, ?config, "classified by manual ranges");
    groups
}

/// Reject a page map that puts the same page into two categories.
pub fn validate_disjoint(groups: &PageMap) -> Result<()> {
    let mut owner: BTreeMap<usize, Category> = BTreeMap::new();
    for (category, pages) in groups {
        for &page in pages {
            if let Some(previous) = owner.insert(page, *category) {
                return Err(SplitError::InvalidRange(format!(
                    "page {} is assigned to both {} and {}",
                    page + 1,
                    previous.display_name(),
                    category.display_name()
                )));
            }
        }
    }
    Ok(())
}
