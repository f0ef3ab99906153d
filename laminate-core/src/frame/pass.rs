// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render passes and shared quad state.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use crate::transform::Transform3d;

use super::copy::CopyOutputRequest;
use super::quad::DrawQuad;

/// Identifies a render pass.
///
/// In a submitted frame the id is client-local and unique only within its
/// owning frame. In an aggregated frame the id comes from the aggregator's
/// single id space and is unique across the whole output.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderPassId(pub u64);

impl fmt::Debug for RenderPassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderPassId({})", self.0)
    }
}

/// Blend mode for compositing a quad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Standard source-over alpha compositing.
    #[default]
    SourceOver,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
}

/// A visual filter attached to a render pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Filter {
    /// Gaussian blur with the given radius in pixels.
    Blur {
        /// Blur radius in pixels.
        radius: f64,
    },
    /// Brightness adjustment.
    Brightness {
        /// Multiplier, 1.0 is unchanged.
        amount: f64,
    },
    /// Saturation adjustment.
    Saturate {
        /// Multiplier, 1.0 is unchanged.
        amount: f64,
    },
}

impl Filter {
    /// Returns whether this filter samples pixels outside its input bounds.
    ///
    /// Pixel-moving filters force full damage for the surface that carries
    /// them, since any upstream change can affect every output pixel.
    #[must_use]
    pub fn moves_pixels(&self) -> bool {
        matches!(self, Self::Blur { .. })
    }
}

/// Per-layer state shared by one or more sibling quads.
#[derive(Clone, Debug, PartialEq)]
pub struct SharedQuadState {
    /// Maps quad-local coordinates into the owning pass's target space.
    pub quad_to_target_transform: Transform3d,
    /// Visible portion of the quads, in quad-local space.
    pub visible_rect: Rect,
    /// Clip in target space; `None` means unclipped.
    pub clip_rect: Option<Rect>,
    /// Opacity, 0.0–1.0.
    pub opacity: f32,
    /// Blend mode for quads under this state.
    pub blend_mode: BlendMode,
    /// 3-D sorting context, 0 when unsorted.
    pub sorting_context_id: i32,
}

impl Default for SharedQuadState {
    fn default() -> Self {
        Self {
            quad_to_target_transform: Transform3d::IDENTITY,
            visible_rect: Rect::ZERO,
            clip_rect: None,
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            sorting_context_id: 0,
        }
    }
}

impl SharedQuadState {
    /// Creates a state with the given transform, otherwise defaulted.
    #[must_use]
    pub fn with_transform(transform: Transform3d) -> Self {
        Self {
            quad_to_target_transform: transform,
            ..Self::default()
        }
    }
}

/// An intermediate offscreen render target and the quads drawn into it.
///
/// Not `Clone`: copy-output requests are move-once tokens.
#[derive(Debug)]
pub struct RenderPass {
    /// Pass id; see [`RenderPassId`] for the two id spaces.
    pub id: RenderPassId,
    /// Bounds of this pass's content in its own target space.
    pub output_rect: Rect,
    /// Changed region since the previous frame, in target space.
    pub damage_rect: Rect,
    /// Maps this pass's target space into the frame's root target space.
    pub transform_to_root_target: Transform3d,
    /// Filters applied to this pass's output.
    pub filters: Vec<Filter>,
    /// Filters sampling the backdrop below this pass.
    pub background_filters: Vec<Filter>,
    /// Whether the pass background is transparent.
    pub has_transparent_background: bool,
    /// Pending one-shot capture requests.
    pub copy_requests: Vec<CopyOutputRequest>,
    /// Flat list of shared states referenced by `quads`.
    pub shared_quad_states: Vec<SharedQuadState>,
    /// Quads in back-to-front paint order.
    pub quads: Vec<DrawQuad>,
}

impl RenderPass {
    /// Creates an empty pass. The damage rect starts at the full output rect.
    #[must_use]
    pub fn new(id: RenderPassId, output_rect: Rect) -> Self {
        Self {
            id,
            output_rect,
            damage_rect: output_rect,
            transform_to_root_target: Transform3d::IDENTITY,
            filters: Vec::new(),
            background_filters: Vec::new(),
            has_transparent_background: false,
            copy_requests: Vec::new(),
            shared_quad_states: Vec::new(),
            quads: Vec::new(),
        }
    }

    /// Appends a shared state and returns its index for use in quads.
    pub fn add_shared_state(&mut self, state: SharedQuadState) -> usize {
        self.shared_quad_states.push(state);
        self.shared_quad_states.len() - 1
    }

    /// Appends a quad.
    ///
    /// # Panics
    ///
    /// Panics if the quad references a shared state that does not exist.
    pub fn add_quad(&mut self, quad: DrawQuad) {
        assert!(
            quad.shared_state < self.shared_quad_states.len(),
            "quad references shared state {} but pass has {}",
            quad.shared_state,
            self.shared_quad_states.len()
        );
        self.quads.push(quad);
    }

    /// Returns whether any filter on this pass moves pixels.
    #[must_use]
    pub fn has_pixel_moving_filter(&self) -> bool {
        self.filters.iter().any(Filter::moves_pixels)
            || self.background_filters.iter().any(Filter::moves_pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::QuadMaterial;

    #[test]
    fn shared_state_indices() {
        let mut pass = RenderPass::new(RenderPassId(1), Rect::new(0.0, 0.0, 100.0, 100.0));
        let a = pass.add_shared_state(SharedQuadState::default());
        let b = pass.add_shared_state(SharedQuadState::with_transform(
            Transform3d::from_translation(5.0, 5.0),
        ));
        assert_eq!((a, b), (0, 1));
        pass.add_quad(DrawQuad::new(
            b,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            QuadMaterial::SolidColor { color: 0xFF00_0000 },
        ));
        assert_eq!(pass.quads.len(), 1);
    }

    #[test]
    #[should_panic(expected = "quad references shared state")]
    fn quad_with_missing_state_panics() {
        let mut pass = RenderPass::new(RenderPassId(1), Rect::new(0.0, 0.0, 100.0, 100.0));
        pass.add_quad(DrawQuad::new(
            0,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            QuadMaterial::SolidColor { color: 0 },
        ));
    }

    #[test]
    fn pixel_moving_filters() {
        let mut pass = RenderPass::new(RenderPassId(1), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(!pass.has_pixel_moving_filter());
        pass.filters.push(Filter::Brightness { amount: 0.5 });
        assert!(!pass.has_pixel_moving_filter());
        pass.background_filters.push(Filter::Blur { radius: 4.0 });
        assert!(pass.has_pixel_moving_filter());
    }
}
