// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The surface registry.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::frame::{CompositorFrame, CopyOutputRequest, RenderPassId};

use super::id::SurfaceId;

/// Per-surface registry state.
#[derive(Debug)]
struct Surface {
    frame: CompositorFrame,
    /// Manager-wide monotonic stamp of the last submission.
    frame_index: u64,
    /// `frame_index` at the time of the last `mark_aggregated` call, 0 if
    /// never aggregated.
    last_aggregated_index: u64,
}

/// Maps a [`SurfaceId`] to the most recently submitted, drawable frame.
///
/// Surfaces come into existence on first submission and disappear on
/// [`evict`](Self::evict); eviction is immediately visible to
/// [`frame`](Self::frame). The manager owns the frames; the aggregator
/// borrows them for the duration of a single aggregation, except for
/// copy-output requests, which are moved out via
/// [`take_copy_requests`](Self::take_copy_requests).
#[derive(Debug, Default)]
pub struct SurfaceManager {
    surfaces: HashMap<SurfaceId, Surface>,
    next_frame_index: u64,
}

impl SurfaceManager {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            surfaces: HashMap::new(),
            next_frame_index: 1,
        }
    }

    /// Submits a frame, creating the surface on first submission.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the sentinel or `frame` has no passes — such a
    /// frame can never be drawn and would poison damage diffing.
    pub fn submit_frame(&mut self, id: SurfaceId, frame: CompositorFrame) {
        assert!(id.is_valid(), "cannot submit to the sentinel surface id");
        assert!(
            !frame.passes.is_empty(),
            "a compositor frame must carry at least one render pass"
        );
        let frame_index = self.next_frame_index;
        self.next_frame_index += 1;
        match self.surfaces.get_mut(&id) {
            Some(surface) => {
                surface.frame = frame;
                surface.frame_index = frame_index;
            }
            None => {
                self.surfaces.insert(
                    id,
                    Surface {
                        frame,
                        frame_index,
                        last_aggregated_index: 0,
                    },
                );
            }
        }
    }

    /// Returns the most recent drawable frame, or `None` if the surface does
    /// not exist or was evicted.
    #[must_use]
    pub fn frame(&self, id: SurfaceId) -> Option<&CompositorFrame> {
        self.surfaces.get(&id).map(|s| &s.frame)
    }

    /// Returns the submission stamp of the surface's active frame.
    #[must_use]
    pub fn frame_index(&self, id: SurfaceId) -> Option<u64> {
        self.surfaces.get(&id).map(|s| s.frame_index)
    }

    /// Records that the surface's active frame is being aggregated.
    ///
    /// Called once per surface actually visited, before frame access. A
    /// no-op for unknown surfaces.
    pub fn mark_aggregated(&mut self, id: SurfaceId) {
        if let Some(surface) = self.surfaces.get_mut(&id) {
            surface.last_aggregated_index = surface.frame_index;
        }
    }

    /// Returns the submission stamp current at the last
    /// [`mark_aggregated`](Self::mark_aggregated) call, or `None` if the
    /// surface was never aggregated or does not exist.
    #[must_use]
    pub fn last_aggregated_frame_index(&self, id: SurfaceId) -> Option<u64> {
        self.surfaces
            .get(&id)
            .map(|s| s.last_aggregated_index)
            .filter(|&index| index != 0)
    }

    /// Drops a surface and its frame. Returns whether anything was evicted.
    pub fn evict(&mut self, id: SurfaceId) -> bool {
        self.surfaces.remove(&id).is_some()
    }

    /// Moves every pending copy-output request out of the surface's active
    /// frame, tagged with the frame-local id of the pass that carried it.
    ///
    /// After this call the source frame observably holds no requests, so a
    /// later aggregation cannot consume them again.
    pub fn take_copy_requests(&mut self, id: SurfaceId) -> Vec<(RenderPassId, CopyOutputRequest)> {
        let mut taken = Vec::new();
        if let Some(surface) = self.surfaces.get_mut(&id) {
            for pass in &mut surface.frame.passes {
                for request in pass.copy_requests.drain(..) {
                    taken.push((pass.id, request));
                }
            }
        }
        taken
    }

    /// Returns whether the surface currently exists.
    #[must_use]
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    /// Returns the number of live surfaces.
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }
}
