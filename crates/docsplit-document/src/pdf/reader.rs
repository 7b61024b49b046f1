// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open a source document and compose new standalone documents
// from selected pages of it using the `lopdf` crate.

use std::collections::BTreeMap;
use std::path::Path;

use docsplit_core::error::{Result, SplitError};
use docsplit_core::types::{PageAssignment, Rotation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, instrument, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 3] = [b"Resources", b"MediaBox", b"CropBox"];

/// Guard against malformed, cyclic page trees.
const MAX_TREE_DEPTH: usize = 64;

/// Source object ID → object ID in the document being composed.
type CopiedObjects = BTreeMap<ObjectId, ObjectId>;

/// A loaded source PDF.
///
/// The wrapped `lopdf::Document` is never modified; every output is composed
/// into a fresh document.
#[derive(Debug)]
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            SplitError::Load(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|err| SplitError::Load(format!("failed to parse PDF: {}", err)))?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    // -- Composition ----------------------------------------------------------

    /// Compose a new PDF holding the given pages, in the given order, each
    /// stamped with its rotation.
    ///
    /// Returns the serialised bytes. Fails if `pages` is empty or names a page
    /// outside the document.
    #[instrument(skip(self, pages), fields(pages = pages.len()))]
    pub fn compose(&self, pages: &[PageAssignment], pdf_version: &str) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(SplitError::InvalidRange("no pages to compose".into()));
        }

        let source_pages = self.document.get_pages();
        let mut target = Document::with_version(pdf_version);
        let pages_id = target.new_object_id();
        let mut copied = CopiedObjects::new();
        let mut kids = Vec::with_capacity(pages.len());

        for assignment in pages {
            let page_id = page_number(assignment.source_index)
                .and_then(|number| source_pages.get(&number).copied())
                .ok_or_else(|| {
                    SplitError::InvalidRange(format!(
                        "page index {} out of range (document has {} pages)",
                        assignment.source_index,
                        source_pages.len()
                    ))
                })?;

            let new_page_id = copy_page(
                &self.document,
                &mut target,
                page_id,
                pages_id,
                assignment.rotation,
                &mut copied,
            )?;
            kids.push(Object::Reference(new_page_id));
        }

        let count = kids.len() as i64;
        target.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(count)),
            ])),
        );
        let catalog_id = target.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        target.trailer.set("Root", Object::Reference(catalog_id));

        let mut output = Vec::new();
        target
            .save_to(&mut output)
            .map_err(|err| SplitError::PdfError(format!("failed to serialise composed PDF: {}", err)))?;

        debug!(
            copied_objects = copied.len(),
            output_bytes = output.len(),
            "Pages composed"
        );
        Ok(output)
    }

    /// Compose a standalone one-page PDF of `source_index` at `rotation`.
    pub fn single_page(&self, source_index: usize, rotation: Rotation, pdf_version: &str) -> Result<Vec<u8>> {
        self.compose(&[PageAssignment::new(source_index, rotation)], pdf_version)
    }
}

/// lopdf keys pages by 1-indexed page number.
fn page_number(source_index: usize) -> Option<u32> {
    u32::try_from(source_index).ok()?.checked_add(1)
}

/// Copy one page (and everything it references) from `source` into `target`,
/// parented to `parent_id` and with `/Rotate` set to `rotation`.
///
/// Inherited attributes are materialised on the copy so it renders the same
/// outside the source page tree. The page is registered in `copied` before
/// its contents are visited, so annotation back-references resolve to the copy.
fn copy_page(
    source: &Document,
    target: &mut Document,
    page_id: ObjectId,
    parent_id: ObjectId,
    rotation: Rotation,
    copied: &mut CopiedObjects,
) -> Result<ObjectId> {
    let page = source.get_dictionary(page_id).map_err(|err| {
        SplitError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
    })?;

    let new_page_id = target.new_object_id();
    copied.insert(page_id, new_page_id);

    let mut new_page = copy_dictionary(source, target, page, copied)?;
    for key in INHERITABLE_KEYS {
        if new_page.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(source, page, key) {
            let value = deep_copy(source, target, value, copied)?;
            new_page.set(key.to_vec(), value);
        }
    }
    new_page.set("Parent", Object::Reference(parent_id));
    new_page.set("Rotate", Object::Integer(i64::from(rotation.degrees())));

    target.objects.insert(new_page_id, Object::Dictionary(new_page));
    Ok(new_page_id)
}

/// Look `key` up on the ancestors of `page`.
fn inherited_attribute<'a>(source: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = source.get_dictionary(parent_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
    }
    None
}

/// Copy a dictionary, skipping `/Parent` so the source page tree is never
/// dragged into the target.
fn copy_dictionary(
    source: &Document,
    target: &mut Document,
    dict: &Dictionary,
    copied: &mut CopiedObjects,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        let cloned_value = deep_copy(source, target, value, copied)?;
        new_dict.set(key.clone(), cloned_value);
    }
    Ok(new_dict)
}

/// Deep-copy an object, following references. Each referenced source object
/// is copied once; repeated or cyclic references reuse the first copy.
fn deep_copy(
    source: &Document,
    target: &mut Document,
    object: &Object,
    copied: &mut CopiedObjects,
) -> Result<Object> {
    match object {
        Object::Reference(ref_id) => {
            if let Some(existing) = copied.get(ref_id) {
                return Ok(Object::Reference(*existing));
            }
            match source.get_object(*ref_id) {
                Ok(referenced) => {
                    let new_id = target.new_object_id();
                    copied.insert(*ref_id, new_id);
                    let cloned = deep_copy(source, target, referenced, copied)?;
                    target.objects.insert(new_id, cloned);
                    Ok(Object::Reference(new_id))
                }
                Err(err) => {
                    warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                    Ok(Object::Null)
                }
            }
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            source, target, dict, copied,
        )?)),
        Object::Array(items) => {
            let mut new_items = Vec::with_capacity(items.len());
            for item in items {
                new_items.push(deep_copy(source, target, item, copied)?);
            }
            Ok(Object::Array(new_items))
        }
        Object::Stream(stream) => {
            let dict = copy_dictionary(source, target, &stream.dict, copied)?;
            Ok(Object::Stream(Stream::new(dict, stream.content.clone())))
        }
        // Booleans, numbers, strings, names and null copy as-is.
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{page_label, sample_pdf};

    fn load(bytes: &[u8]) -> Document {
        Document::load_mem(bytes).expect("composed PDF parses")
    }

    fn page_text(doc: &Document, page_id: ObjectId) -> String {
        String::from_utf8_lossy(&doc.get_page_content(page_id).expect("content")).into_owned()
    }

    fn rotate_of(doc: &Document, page_id: ObjectId) -> i64 {
        doc.get_dictionary(page_id)
            .and_then(|page| page.get(b"Rotate"))
            .and_then(|value| value.as_i64())
            .expect("page has /Rotate")
    }

    #[test]
    fn garbage_is_a_load_error() {
        let err = PdfReader::from_bytes(b"definitely not a pdf").expect_err("not a pdf");
        assert!(matches!(err, SplitError::Load(_)));
    }

    #[test]
    fn counts_pages() {
        let reader = PdfReader::from_bytes(&sample_pdf(6)).expect("load");
        assert_eq!(reader.page_count(), 6);
        assert!(reader.source_path().is_none());
    }

    #[test]
    fn compose_keeps_requested_order_and_rotation() {
        let reader = PdfReader::from_bytes(&sample_pdf(5)).expect("load");
        let bytes = reader
            .compose(
                &[
                    PageAssignment::new(3, Rotation::Deg90),
                    PageAssignment::new(0, Rotation::Deg270),
                ],
                "1.5",
            )
            .expect("compose");

        let doc = load(&bytes);
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let first = pages[&1];
        let second = pages[&2];
        assert!(page_text(&doc, first).contains(&page_label(3)));
        assert!(page_text(&doc, second).contains(&page_label(0)));
        assert_eq!(rotate_of(&doc, first), 90);
        assert_eq!(rotate_of(&doc, second), 270);
    }

    #[test]
    fn compose_materialises_inherited_attributes() {
        let reader = PdfReader::from_bytes(&sample_pdf(3)).expect("load");
        let doc = load(&reader.single_page(1, Rotation::Deg0, "1.5").expect("compose"));
        let page_id = doc.get_pages()[&1];
        let page = doc.get_dictionary(page_id).expect("page dict");
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
        assert_eq!(rotate_of(&doc, page_id), 0);
    }

    #[test]
    fn compose_rejects_out_of_range_pages() {
        let reader = PdfReader::from_bytes(&sample_pdf(2)).expect("load");
        let err = reader
            .compose(&[PageAssignment::unrotated(2)], "1.5")
            .expect_err("out of range");
        assert!(matches!(err, SplitError::InvalidRange(_)));
    }

    #[test]
    fn compose_rejects_empty_selection() {
        let reader = PdfReader::from_bytes(&sample_pdf(2)).expect("load");
        assert!(reader.compose(&[], "1.5").is_err());
    }

    #[test]
    fn shared_resources_are_copied_once() {
        let reader = PdfReader::from_bytes(&sample_pdf(4)).expect("load");
        let all: Vec<_> = (0..4).map(PageAssignment::unrotated).collect();
        let doc = load(&reader.compose(&all, "1.5").expect("compose"));

        let fonts = doc
            .objects
            .values()
            .filter(|object| {
                object
                    .as_dict()
                    .and_then(|dict| dict.get(b"Type"))
                    .and_then(|value| value.as_name())
                    .map(|name| name == b"Font")
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(fonts, 1);
    }

    #[test]
    fn open_reads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bundle.pdf");
        std::fs::write(&path, sample_pdf(3)).expect("write");

        let reader = PdfReader::open(&path).expect("open");
        assert_eq!(reader.page_count(), 3);
        assert!(reader.source_path().unwrap().ends_with("bundle.pdf"));
    }
}
