// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction: compose one output PDF per category from a source document.
//
// A failing category never aborts the others: it is reported in the
// `ExtractionReport` and the caller decides how to surface it.

use docsplit_core::config::AppConfig;
use docsplit_core::error::{Result, SplitError};
use docsplit_core::types::{
    Category, ExtractionPlan, OutputDocument, PageAssignment, PageMap, output_file_name,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::pdf::reader::PdfReader;

/// A category whose output could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFailure {
    pub category: Category,
    pub reason: String,
}

impl From<CategoryFailure> for SplitError {
    fn from(failure: CategoryFailure) -> Self {
        SplitError::Extraction {
            category: failure.category,
            reason: failure.reason,
        }
    }
}

/// Result of extracting one source document.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Generated documents, sorted by file name.
    pub outputs: Vec<OutputDocument>,
    /// Categories that were requested but could not be produced.
    pub failures: Vec<CategoryFailure>,
}

impl ExtractionReport {
    /// `true` when every requested category produced an output.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Categories missing from `outputs` because they failed.
    pub fn missing_categories(&self) -> Vec<Category> {
        self.failures.iter().map(|failure| failure.category).collect()
    }
}

/// Zero-rotation plan for a document nobody has edited.
pub fn plan_from_page_map(groups: &PageMap) -> ExtractionPlan {
    groups
        .iter()
        .map(|(category, pages)| {
            (
                *category,
                pages.iter().copied().map(PageAssignment::unrotated).collect(),
            )
        })
        .collect()
}

/// Composes per-category output documents.
#[derive(Debug, Clone)]
pub struct Extractor {
    pdf_version: String,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new("1.5")
    }
}

impl Extractor {
    pub fn new(pdf_version: impl Into<String>) -> Self {
        Self {
            pdf_version: pdf_version.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.output_pdf_version.clone())
    }

    /// Extract every non-empty category of `plan` from `source`.
    ///
    /// Categories are visited in category order; pages inside a category are
    /// always re-sorted by source index first, so the order edits were made in
    /// never leaks into the output. Outputs are named
    /// `"<identifier> - <slug>.pdf"` and returned sorted by file name.
    #[instrument(skip(self, source, plan), fields(categories = plan.len()))]
    pub fn extract(&self, source: &PdfReader, plan: &ExtractionPlan, identifier: &str) -> ExtractionReport {
        let mut report = ExtractionReport::default();

        for (category, pages) in plan {
            if pages.is_empty() {
                continue;
            }

            match self.extract_category(source, *category, pages) {
                Ok(content) => {
                    let file_name = output_file_name(identifier, *category);
                    debug!(%category, pages = pages.len(), bytes = content.len(), %file_name, "category extracted");
                    report.outputs.push(OutputDocument {
                        file_name,
                        category: *category,
                        content,
                    });
                }
                Err(err) => {
                    warn!(%category, %err, "category extraction failed; continuing");
                    report.failures.push(CategoryFailure {
                        category: *category,
                        reason: err.to_string(),
                    });
                }
            }
        }

        report.outputs.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        info!(
            identifier,
            outputs = report.outputs.len(),
            failures = report.failures.len(),
            "Extraction finished"
        );
        report
    }

    fn extract_category(
        &self,
        source: &PdfReader,
        category: Category,
        pages: &[PageAssignment],
    ) -> Result<Vec<u8>> {
        let mut ordered = pages.to_vec();
        ordered.sort_by_key(|page| page.source_index);

        if let Some(pair) = ordered
            .windows(2)
            .find(|pair| pair[0].source_index == pair[1].source_index)
        {
            return Err(SplitError::InvalidRange(format!(
                "page {} appears twice in {}",
                pair[0].source_index + 1,
                category.display_name()
            )));
        }

        source.compose(&ordered, &self.pdf_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{page_label, sample_pdf};
    use docsplit_core::classify::classify_by_position;
    use docsplit_core::types::Rotation;
    use lopdf::Document;

    fn labels(bytes: &[u8]) -> Vec<String> {
        let doc = Document::load_mem(bytes).expect("output parses");
        doc.get_pages()
            .values()
            .map(|page_id| {
                String::from_utf8_lossy(&doc.get_page_content(*page_id).expect("content")).into_owned()
            })
            .collect()
    }

    fn rotations(bytes: &[u8]) -> Vec<i64> {
        let doc = Document::load_mem(bytes).expect("output parses");
        doc.get_pages()
            .values()
            .map(|page_id| {
                doc.get_dictionary(*page_id)
                    .and_then(|page| page.get(b"Rotate"))
                    .and_then(|value| value.as_i64())
                    .expect("rotate")
            })
            .collect()
    }

    #[test]
    fn unedited_document_yields_one_output_per_category() {
        let reader = PdfReader::from_bytes(&sample_pdf(7)).expect("load");
        let plan = plan_from_page_map(&classify_by_position(7));
        let report = Extractor::default().extract(&reader, &plan, "12345678");

        assert!(report.is_complete());
        let names: Vec<&str> = report.outputs.iter().map(|o| o.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "12345678 - cedula.pdf",
                "12345678 - constancia.pdf",
                "12345678 - curriculum.pdf",
                "12345678 - rif.pdf",
                "12345678 - titulos.pdf",
            ]
        );

        let credentials = report
            .outputs
            .iter()
            .find(|o| o.category == Category::Credentials)
            .expect("credentials");
        let pages = labels(&credentials.content);
        assert_eq!(pages.len(), 3);
        assert!(pages[0].contains(&page_label(2)));
        assert!(pages[2].contains(&page_label(4)));
    }

    #[test]
    fn pages_are_resorted_by_source_index() {
        let reader = PdfReader::from_bytes(&sample_pdf(6)).expect("load");
        let mut plan = ExtractionPlan::new();
        plan.insert(
            Category::Resume,
            vec![
                PageAssignment::new(5, Rotation::Deg90),
                PageAssignment::new(3, Rotation::Deg0),
                PageAssignment::new(4, Rotation::Deg270),
            ],
        );

        let report = Extractor::default().extract(&reader, &plan, "7654321");
        let output = &report.outputs[0];
        let pages = labels(&output.content);
        assert!(pages[0].contains(&page_label(3)));
        assert!(pages[1].contains(&page_label(4)));
        assert!(pages[2].contains(&page_label(5)));
        assert_eq!(rotations(&output.content), vec![0, 270, 90]);
    }

    #[test]
    fn failing_category_does_not_abort_the_rest() {
        let reader = PdfReader::from_bytes(&sample_pdf(3)).expect("load");
        let mut plan = ExtractionPlan::new();
        plan.insert(Category::Identity, vec![PageAssignment::unrotated(0)]);
        plan.insert(Category::TaxId, vec![PageAssignment::unrotated(42)]);
        plan.insert(Category::Resume, vec![PageAssignment::unrotated(2)]);

        let report = Extractor::default().extract(&reader, &plan, "unknown");
        assert!(!report.is_complete());
        assert_eq!(report.missing_categories(), vec![Category::TaxId]);
        assert_eq!(report.outputs.len(), 2);

        let err: SplitError = report.failures[0].clone().into();
        assert!(matches!(err, SplitError::Extraction { category: Category::TaxId, .. }));
    }

    #[test]
    fn duplicate_pages_fail_the_category() {
        let reader = PdfReader::from_bytes(&sample_pdf(3)).expect("load");
        let mut plan = ExtractionPlan::new();
        plan.insert(
            Category::Credentials,
            vec![PageAssignment::unrotated(1), PageAssignment::new(1, Rotation::Deg90)],
        );

        let report = Extractor::default().extract(&reader, &plan, "unknown");
        assert!(report.outputs.is_empty());
        assert_eq!(report.missing_categories(), vec![Category::Credentials]);
    }

    #[test]
    fn empty_document_extracts_nothing() {
        let reader = PdfReader::from_bytes(&sample_pdf(0)).expect("load");
        let plan = plan_from_page_map(&classify_by_position(reader.page_count()));
        let report = Extractor::default().extract(&reader, &plan, "unknown");
        assert!(report.outputs.is_empty());
        assert!(report.is_complete());
    }

    #[test]
    fn empty_categories_are_skipped() {
        let reader = PdfReader::from_bytes(&sample_pdf(2)).expect("load");
        let mut plan = ExtractionPlan::new();
        plan.insert(Category::Identity, Vec::new());
        plan.insert(Category::TaxId, vec![PageAssignment::unrotated(1)]);

        let report = Extractor::default().extract(&reader, &plan, "9876543");
        assert!(report.is_complete());
        assert_eq!(report.outputs.len(), 1);
        assert_eq!(report.outputs[0].file_name, "9876543 - rif.pdf");
    }
}
