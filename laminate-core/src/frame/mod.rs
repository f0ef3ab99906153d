// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The compositor-frame submission format.
//!
//! A *compositor frame* is one complete submission from a client: an ordered
//! list of [`RenderPass`]es (leaf passes first, the root pass last), the
//! [`TransferableResource`]s its quads reference, and metadata. Each pass
//! holds a flat list of [`SharedQuadState`]s and an ordered list of
//! [`DrawQuad`]s; every quad carries the index of the shared state it
//! inherits from.
//!
//! Frames are owned by the [`SurfaceManager`](crate::surface::SurfaceManager)
//! once submitted. The aggregator borrows them read-only, with one observable
//! exception: [`CopyOutputRequest`]s are *moved* out of a source frame when
//! consumed, so a request can never be aggregated twice.

mod copy;
mod pass;
mod quad;
mod resource;

pub use copy::CopyOutputRequest;
pub use pass::{BlendMode, Filter, RenderPass, RenderPassId, SharedQuadState};
pub use quad::{DrawQuad, QuadMaterial};
pub use resource::{ResourceId, ReturnedResource, TransferableResource};

use alloc::vec::Vec;

use crate::surface::SurfaceId;

/// Frame metadata supplied by the submitting client.
#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    /// Surfaces the client depends on but may or may not directly draw.
    ///
    /// The aggregator walks these in addition to embedded surfaces so that
    /// copy-output requests on undrawn surfaces are still serviced.
    pub referenced_surfaces: Vec<SurfaceId>,
}

/// One complete submission from a client, or the aggregator's output.
///
/// Not `Clone`: copy-output requests are move-once tokens.
#[derive(Debug, Default)]
pub struct CompositorFrame {
    /// Client-supplied metadata.
    pub metadata: FrameMetadata,
    /// Resources referenced by this frame's quads.
    pub resource_list: Vec<TransferableResource>,
    /// Render passes, dependencies first, root pass last.
    pub passes: Vec<RenderPass>,
}

impl CompositorFrame {
    /// Creates a frame from a pass list with empty metadata and resources.
    #[must_use]
    pub fn from_passes(passes: Vec<RenderPass>) -> Self {
        Self {
            metadata: FrameMetadata::default(),
            resource_list: Vec::new(),
            passes,
        }
    }

    /// Returns the root (last) pass, if the frame has any passes.
    #[must_use]
    pub fn root_pass(&self) -> Option<&RenderPass> {
        self.passes.last()
    }

    /// Returns the pass with the given frame-local id.
    #[must_use]
    pub fn pass(&self, id: RenderPassId) -> Option<&RenderPass> {
        self.passes.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Rect;

    use super::*;

    #[test]
    fn root_pass_is_last() {
        let frame = CompositorFrame::from_passes(vec![
            RenderPass::new(RenderPassId(1), Rect::new(0.0, 0.0, 10.0, 10.0)),
            RenderPass::new(RenderPassId(2), Rect::new(0.0, 0.0, 20.0, 20.0)),
        ]);
        assert_eq!(frame.root_pass().unwrap().id, RenderPassId(2));
        assert_eq!(frame.pass(RenderPassId(1)).unwrap().id, RenderPassId(1));
        assert!(frame.pass(RenderPassId(7)).is_none());
    }

    #[test]
    fn empty_frame_has_no_root() {
        assert!(CompositorFrame::default().root_pass().is_none());
    }
}
