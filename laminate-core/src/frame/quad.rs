// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw quads: the visual primitives inside a render pass.

use kurbo::Rect;

use crate::surface::SurfaceId;

use super::pass::RenderPassId;
use super::resource::ResourceId;

/// What a quad draws.
///
/// The aggregator treats only [`Surface`](Self::Surface) and
/// [`RenderPass`](Self::RenderPass) specially; every other material is copied
/// verbatim modulo shared-state composition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QuadMaterial {
    /// A flat color, packed `0xAARRGGBB`.
    SolidColor {
        /// Packed ARGB color.
        color: u32,
    },
    /// A textured quad sampling a transferable resource.
    Texture {
        /// The sampled resource.
        resource: ResourceId,
        /// Whether the content may only reach secure outputs.
        secure_output_only: bool,
    },
    /// A tiled-content quad sampling a transferable resource.
    Tile {
        /// The sampled resource.
        resource: ResourceId,
    },
    /// Embeds another surface's content at this position.
    Surface {
        /// The embedded surface.
        surface: SurfaceId,
        /// Fallback color when the surface cannot contribute, packed
        /// `0xAARRGGBB`.
        default_background_color: u32,
    },
    /// Samples the output of an earlier pass in the same frame.
    RenderPass {
        /// The referenced pass.
        pass: RenderPassId,
    },
}

/// A single visual primitive in a pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawQuad {
    /// Index of this quad's [`SharedQuadState`](super::SharedQuadState) in
    /// the owning pass's flat list.
    pub shared_state: usize,
    /// Quad bounds in quad-local space.
    pub rect: Rect,
    /// What to draw.
    pub material: QuadMaterial,
}

impl DrawQuad {
    /// Creates a quad.
    #[must_use]
    pub fn new(shared_state: usize, rect: Rect, material: QuadMaterial) -> Self {
        Self {
            shared_state,
            rect,
            material,
        }
    }

    /// Returns the resource this quad samples, if any.
    #[must_use]
    pub fn resource(&self) -> Option<ResourceId> {
        match self.material {
            QuadMaterial::Texture { resource, .. } | QuadMaterial::Tile { resource } => {
                Some(resource)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_extraction() {
        let r = ResourceId(7);
        let tex = DrawQuad::new(
            0,
            Rect::ZERO,
            QuadMaterial::Texture {
                resource: r,
                secure_output_only: false,
            },
        );
        let solid = DrawQuad::new(0, Rect::ZERO, QuadMaterial::SolidColor { color: 0 });
        assert_eq!(tex.resource(), Some(r));
        assert_eq!(solid.resource(), None);
    }
}
