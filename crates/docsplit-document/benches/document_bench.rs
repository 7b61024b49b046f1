// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the docsplit-document crate: classification plus
// extraction of a synthetic source document, and ZIP packaging of the result.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use docsplit_core::classify_by_position;
use docsplit_document::pdf::fixtures::sample_pdf;
use docsplit_document::{ArchiveEntry, ArchivePackager, Extractor, PdfReader, plan_from_page_map};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Classify and extract a 12-page document (credentials capped at four pages).
fn bench_extract(c: &mut Criterion) {
    let source = sample_pdf(12);

    c.bench_function("classify + extract (12 pages)", |b| {
        b.iter(|| {
            let reader = PdfReader::from_bytes(black_box(&source)).expect("load");
            let plan = plan_from_page_map(&classify_by_position(reader.page_count()));
            black_box(Extractor::default().extract(&reader, &plan, "12345678"));
        });
    });
}

/// Package the outputs of three extracted documents into one batch archive.
fn bench_pack(c: &mut Criterion) {
    let reader = PdfReader::from_bytes(&sample_pdf(7)).expect("load");
    let plan = plan_from_page_map(&classify_by_position(reader.page_count()));
    let report = Extractor::default().extract(&reader, &plan, "12345678");
    let names = ["a.pdf", "b.pdf", "c.pdf"];
    let entries: Vec<ArchiveEntry<'_>> = names
        .iter()
        .map(|name| ArchiveEntry {
            source_name: name,
            outputs: &report.outputs,
        })
        .collect();

    c.bench_function("pack batch archive (3 documents)", |b| {
        b.iter(|| {
            black_box(ArchivePackager::default().pack(black_box(&entries)).expect("pack"));
        });
    });
}

criterion_group!(benches, bench_extract, bench_pack);
criterion_main!(benches);
