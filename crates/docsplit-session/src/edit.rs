// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page edit state: which pages belong to which category, at what rotation,
// and the live preview of each.

use std::collections::BTreeMap;

use docsplit_core::error::Result;
use docsplit_core::types::{
    Category, ExtractionPlan, PageAssignment, PageMap, RotateDirection, Rotation,
};
use docsplit_document::{PageRenderer, PdfReader};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::blob::{BlobHandle, BlobStore};

/// One page's assignment, rotation, and current preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageEdit {
    pub source_index: usize,
    pub rotation: Rotation,
    pub preview: BlobHandle,
    pub category: Category,
}

/// Per-document edit state, seeded from a classification.
///
/// Preview handles are owned by the state: superseded previews are revoked on
/// rotation, and [`PageEditState::release`] revokes the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageEditState {
    groups: BTreeMap<Category, Vec<PageEdit>>,
}

impl PageEditState {
    /// Render a zero-rotation preview for every page in `page_map`.
    ///
    /// Fails as a whole: on the first render error every preview registered so
    /// far is revoked and the error is returned.
    #[instrument(skip_all, fields(categories = page_map.len()))]
    pub fn initialize(
        source: &PdfReader,
        page_map: &PageMap,
        renderer: &dyn PageRenderer,
        blobs: &mut BlobStore,
    ) -> Result<Self> {
        let mut state = Self::default();

        for (category, pages) in page_map {
            let mut edits: Vec<PageEdit> = Vec::with_capacity(pages.len());
            for &source_index in pages {
                let rendered = match renderer.render_page(source, source_index, Rotation::Deg0) {
                    Ok(rendered) => rendered,
                    Err(err) => {
                        warn!(source_index, %err, "preview failed; discarding edit state");
                        state.release(blobs);
                        for edit in edits {
                            blobs.revoke(edit.preview);
                        }
                        return Err(err);
                    }
                };
                edits.push(PageEdit {
                    source_index,
                    rotation: Rotation::Deg0,
                    preview: blobs.register(rendered.bytes, rendered.mime_type),
                    category: *category,
                });
            }
            if !edits.is_empty() {
                state.groups.insert(*category, edits);
            }
        }

        info!(pages = state.page_count(), "Edit state initialised");
        Ok(state)
    }

    /// Rotate the page at `position` within `category` by 90°.
    ///
    /// Returns `Ok(false)` when there is no such page. On a render failure the
    /// page keeps its previous rotation and preview.
    #[instrument(skip(self, source, renderer, blobs))]
    pub fn rotate(
        &mut self,
        category: Category,
        position: usize,
        direction: RotateDirection,
        source: &PdfReader,
        renderer: &dyn PageRenderer,
        blobs: &mut BlobStore,
    ) -> Result<bool> {
        let Some(edit) = self
            .groups
            .get_mut(&category)
            .and_then(|edits| edits.get_mut(position))
        else {
            debug!("no page at that position; ignoring rotation");
            return Ok(false);
        };

        let rotation = edit.rotation.turned(direction);
        let rendered = renderer.render_page(source, edit.source_index, rotation)?;
        let superseded = edit.preview;

        *edit = PageEdit {
            rotation,
            preview: blobs.register(rendered.bytes, rendered.mime_type),
            ..*edit
        };
        blobs.revoke(superseded);

        debug!(
            source_index = edit.source_index,
            degrees = rotation.degrees(),
            "page rotated"
        );
        Ok(true)
    }

    /// Position of `source_index` within `category`, if it is assigned there.
    pub fn position_of(&self, category: Category, source_index: usize) -> Option<usize> {
        self.groups
            .get(&category)?
            .iter()
            .position(|edit| edit.source_index == source_index)
    }

    pub fn page(&self, category: Category, position: usize) -> Option<&PageEdit> {
        self.groups.get(&category)?.get(position)
    }

    /// Pages of `category` in display order (empty if none).
    pub fn pages(&self, category: Category) -> &[PageEdit] {
        self.groups.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty categories in category order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.groups.keys().copied()
    }

    pub fn page_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Snapshot of the current assignments for extraction.
    pub fn to_plan(&self) -> ExtractionPlan {
        self.groups
            .iter()
            .map(|(category, edits)| {
                (
                    *category,
                    edits
                        .iter()
                        .map(|edit| PageAssignment::new(edit.source_index, edit.rotation))
                        .collect(),
                )
            })
            .collect()
    }

    /// Revoke every preview and empty the state.
    pub fn release(&mut self, blobs: &mut BlobStore) {
        for edit in self.groups.values().flatten() {
            blobs.revoke(edit.preview);
        }
        self.groups.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsplit_core::classify::classify_by_position;
    use docsplit_core::error::SplitError;
    use docsplit_document::pdf::fixtures::sample_pdf;
    use docsplit_document::{PdfPageRenderer, RenderedPage};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Fails on one source index, or on everything once `broken` is set.
    struct FlakyRenderer {
        fail_on: Option<usize>,
        broken: AtomicBool,
        calls: AtomicUsize,
    }

    impl FlakyRenderer {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                fail_on,
                broken: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PageRenderer for FlakyRenderer {
        fn render_page(
            &self,
            source: &PdfReader,
            source_index: usize,
            rotation: Rotation,
        ) -> Result<RenderedPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken.load(Ordering::SeqCst) || self.fail_on == Some(source_index) {
                return Err(SplitError::Render {
                    page: source_index,
                    reason: "renderer offline".into(),
                });
            }
            PdfPageRenderer::default().render_page(source, source_index, rotation)
        }
    }

    fn seeded(pages: usize, blobs: &mut BlobStore) -> (PdfReader, PageEditState) {
        let reader = PdfReader::from_bytes(&sample_pdf(pages)).expect("load");
        let state = PageEditState::initialize(
            &reader,
            &classify_by_position(pages),
            &PdfPageRenderer::default(),
            blobs,
        )
        .expect("initialise");
        (reader, state)
    }

    #[test]
    fn initialize_renders_one_preview_per_page() {
        let mut blobs = BlobStore::new();
        let (_, state) = seeded(7, &mut blobs);

        assert_eq!(state.page_count(), 7);
        assert_eq!(blobs.len(), 7);
        assert_eq!(state.categories().count(), 5);
        assert!(state
            .pages(Category::Credentials)
            .iter()
            .all(|edit| edit.rotation == Rotation::Deg0 && edit.category == Category::Credentials));
    }

    #[test]
    fn failed_initialisation_leaves_no_previews_behind() {
        let reader = PdfReader::from_bytes(&sample_pdf(7)).expect("load");
        let mut blobs = BlobStore::new();
        let renderer = FlakyRenderer::new(Some(3));

        let err = PageEditState::initialize(&reader, &classify_by_position(7), &renderer, &mut blobs)
            .expect_err("page 3 fails");
        assert!(matches!(err, SplitError::Render { page: 3, .. }));
        assert!(blobs.is_empty());
    }

    #[test]
    fn left_then_right_restores_rotation() {
        let mut blobs = BlobStore::new();
        let (reader, mut state) = seeded(7, &mut blobs);
        let renderer = PdfPageRenderer::default();

        assert!(state
            .rotate(Category::Credentials, 1, RotateDirection::Left, &reader, &renderer, &mut blobs)
            .expect("rotate"));
        assert_eq!(state.page(Category::Credentials, 1).map(|e| e.rotation), Some(Rotation::Deg270));

        state
            .rotate(Category::Credentials, 1, RotateDirection::Right, &reader, &renderer, &mut blobs)
            .expect("rotate");
        assert_eq!(state.page(Category::Credentials, 1).map(|e| e.rotation), Some(Rotation::Deg0));
    }

    #[test]
    fn rotation_replaces_and_revokes_the_preview() {
        let mut blobs = BlobStore::new();
        let (reader, mut state) = seeded(3, &mut blobs);
        let before = state.page(Category::TaxId, 0).copied().expect("rif page");

        state
            .rotate(
                Category::TaxId,
                0,
                RotateDirection::Right,
                &reader,
                &PdfPageRenderer::default(),
                &mut blobs,
            )
            .expect("rotate");

        let after = state.page(Category::TaxId, 0).copied().expect("rif page");
        assert_eq!(after.rotation, Rotation::Deg90);
        assert_eq!(after.source_index, before.source_index);
        assert_ne!(after.preview, before.preview);
        assert!(!blobs.contains(before.preview));
        assert!(blobs.contains(after.preview));
        assert_eq!(blobs.len(), 3);
    }

    #[test]
    fn failed_rotation_keeps_previous_state() {
        let mut blobs = BlobStore::new();
        let (reader, mut state) = seeded(3, &mut blobs);
        let before = state.clone();
        let renderer = FlakyRenderer::new(None);
        renderer.broken.store(true, Ordering::SeqCst);

        let err = state
            .rotate(Category::Identity, 0, RotateDirection::Left, &reader, &renderer, &mut blobs)
            .expect_err("renderer is down");
        assert!(matches!(err, SplitError::Render { .. }));
        assert_eq!(state, before);
        assert_eq!(blobs.len(), 3);
    }

    #[test]
    fn rotating_a_missing_page_is_a_no_op() {
        let mut blobs = BlobStore::new();
        let (reader, mut state) = seeded(2, &mut blobs);
        let renderer = FlakyRenderer::new(None);

        let rotated = state
            .rotate(Category::Resume, 0, RotateDirection::Left, &reader, &renderer, &mut blobs)
            .expect("no-op");
        assert!(!rotated);
        let rotated = state
            .rotate(Category::Identity, 9, RotateDirection::Left, &reader, &renderer, &mut blobs)
            .expect("no-op");
        assert!(!rotated);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn plan_reflects_rotations() {
        let mut blobs = BlobStore::new();
        let (reader, mut state) = seeded(7, &mut blobs);
        state
            .rotate(
                Category::Resume,
                0,
                RotateDirection::Left,
                &reader,
                &PdfPageRenderer::default(),
                &mut blobs,
            )
            .expect("rotate");

        let plan = state.to_plan();
        assert_eq!(plan[&Category::Resume], vec![PageAssignment::new(6, Rotation::Deg270)]);
        assert_eq!(plan[&Category::Identity], vec![PageAssignment::unrotated(0)]);
    }

    #[test]
    fn position_lookup_by_source_index() {
        let mut blobs = BlobStore::new();
        let (_, state) = seeded(7, &mut blobs);
        assert_eq!(state.position_of(Category::Credentials, 4), Some(2));
        assert_eq!(state.position_of(Category::Credentials, 0), None);
    }

    #[test]
    fn release_revokes_everything() {
        let mut blobs = BlobStore::new();
        let (_, mut state) = seeded(5, &mut blobs);
        state.release(&mut blobs);
        assert!(blobs.is_empty());
        assert_eq!(state.page_count(), 0);
    }
}
