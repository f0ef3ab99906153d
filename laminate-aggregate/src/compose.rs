// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared-state composition across embedding boundaries.
//!
//! When a child surface's quads are copied into a parent pass, every quad
//! keeps its own local coordinates; the embedding is expressed entirely
//! through the quad's [`SharedQuadState`]. An [`EmbedContext`] carries the
//! accumulated transform, clip, and opacity from the destination pass down
//! to the surface currently being copied.

use kurbo::Rect;
use laminate_core::frame::SharedQuadState;
use laminate_core::geometry;
use laminate_core::transform::Transform3d;

/// Opacity within this distance of 1.0 counts as fully opaque.
pub(crate) const OPACITY_EPSILON: f32 = 0.001;

/// Accumulated embedding state between a destination pass and the surface
/// whose quads are being copied into it.
#[derive(Clone, Debug)]
pub(crate) struct EmbedContext {
    /// Maps the embedded surface's root target space into the destination
    /// pass's target space.
    pub transform: Transform3d,
    /// Clip in destination-pass space, if any embedding level clipped.
    pub clip: Option<Rect>,
    /// Product of opacities along the embedding chain.
    pub opacity: f32,
    /// Whether the destination pass's content feeds a copy-output request
    /// taken this aggregation. Content on such a path is captured, so
    /// protected quads must not be rendered into it.
    pub in_copy_path: bool,
}

impl EmbedContext {
    /// The context at the top of a destination pass.
    pub(crate) fn root(in_copy_path: bool) -> Self {
        Self {
            transform: Transform3d::IDENTITY,
            clip: None,
            opacity: 1.0,
            in_copy_path,
        }
    }

    /// The context for quads of a surface embedded through `state`. Quads
    /// merged through it land in the same destination pass, so the copy-path
    /// flag carries through unchanged.
    pub(crate) fn descend(&self, state: &SharedQuadState) -> Self {
        Self {
            transform: self.transform * state.quad_to_target_transform,
            clip: geometry::intersect_clips(
                self.clip,
                state.clip_rect.map(|c| self.transform.map_rect(c)),
            ),
            opacity: self.opacity * state.opacity,
            in_copy_path: self.in_copy_path,
        }
    }

    /// Whether this context still composites as plain opaque source-over
    /// content, which is what inlining into the parent pass requires.
    pub(crate) fn is_effectively_opaque(&self) -> bool {
        self.opacity >= 1.0 - OPACITY_EPSILON
    }
}

/// Rewrites a source shared state into the destination pass's space.
pub(crate) fn compose_state(ctx: &EmbedContext, state: &SharedQuadState) -> SharedQuadState {
    SharedQuadState {
        quad_to_target_transform: ctx.transform * state.quad_to_target_transform,
        visible_rect: state.visible_rect,
        clip_rect: geometry::intersect_clips(
            ctx.clip,
            state.clip_rect.map(|c| ctx.transform.map_rect(c)),
        ),
        opacity: ctx.opacity * state.opacity,
        blend_mode: state.blend_mode,
        sorting_context_id: state.sorting_context_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laminate_core::frame::BlendMode;

    #[test]
    fn descend_accumulates_transform_and_opacity() {
        let ctx = EmbedContext::root(false);
        let state = SharedQuadState {
            quad_to_target_transform: Transform3d::from_translation(5.0, 7.0),
            opacity: 0.5,
            ..SharedQuadState::default()
        };
        let child = ctx.descend(&state);
        let p = child.transform.transform_point((1.0, 1.0).into());
        assert_eq!(p, (6.0, 8.0).into());
        assert!((child.opacity - 0.5).abs() < 1e-6);
        assert!(!child.is_effectively_opaque());
        assert!(ctx.is_effectively_opaque());
    }

    #[test]
    fn clips_move_into_destination_space_before_intersecting() {
        let mut ctx = EmbedContext::root(false);
        ctx.transform = Transform3d::from_translation(10.0, 0.0);
        let state = SharedQuadState {
            clip_rect: Some(Rect::new(0.0, 0.0, 20.0, 20.0)),
            ..SharedQuadState::default()
        };
        let child = ctx.descend(&state);
        assert_eq!(child.clip, Some(Rect::new(10.0, 0.0, 30.0, 20.0)));
    }

    #[test]
    fn compose_state_intersects_clips() {
        let mut ctx = EmbedContext::root(false);
        ctx.clip = Some(Rect::new(0.0, 0.0, 15.0, 15.0));
        let state = SharedQuadState {
            clip_rect: Some(Rect::new(10.0, 10.0, 40.0, 40.0)),
            blend_mode: BlendMode::Multiply,
            ..SharedQuadState::default()
        };
        let composed = compose_state(&ctx, &state);
        assert_eq!(composed.clip_rect, Some(Rect::new(10.0, 10.0, 15.0, 15.0)));
        assert_eq!(composed.blend_mode, BlendMode::Multiply);
    }

    #[test]
    fn copy_path_carries_through_nested_descents() {
        let ctx = EmbedContext::root(true);
        let inner = ctx.descend(&SharedQuadState::default());
        let innermost = inner.descend(&SharedQuadState::default());
        assert!(innermost.in_copy_path);
        assert!(!EmbedContext::root(false)
            .descend(&SharedQuadState::default())
            .in_copy_path);
    }
}
