// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable frame dumps.
//!
//! [`dump_frame`] writes one line per pass and one indented line per quad,
//! enough to eyeball what an aggregation produced without a debugger.

use std::io::{self, Write};

use kurbo::Rect;
use laminate_core::frame::{CompositorFrame, QuadMaterial, RenderPass};

fn fmt_rect(rect: Rect) -> String {
    format!(
        "{}x{}+{}+{}",
        rect.width(),
        rect.height(),
        rect.x0,
        rect.y0
    )
}

/// Writes a human-readable dump of `frame` to `writer`.
pub fn dump_frame(frame: &CompositorFrame, writer: &mut dyn Write) -> io::Result<()> {
    writeln!(
        writer,
        "frame: {} passes, {} resources",
        frame.passes.len(),
        frame.resource_list.len()
    )?;
    for pass in &frame.passes {
        dump_pass(pass, writer)?;
    }
    Ok(())
}

fn dump_pass(pass: &RenderPass, writer: &mut dyn Write) -> io::Result<()> {
    writeln!(
        writer,
        "pass {}: output={} damage={} filters={} copy_requests={}",
        pass.id.0,
        fmt_rect(pass.output_rect),
        fmt_rect(pass.damage_rect),
        pass.filters.len(),
        pass.copy_requests.len(),
    )?;
    for quad in &pass.quads {
        let state = &pass.shared_quad_states[quad.shared_state];
        let material = match quad.material {
            QuadMaterial::SolidColor { color } => format!("solid #{color:08X}"),
            QuadMaterial::Texture {
                resource,
                secure_output_only,
            } => {
                if secure_output_only {
                    format!("texture {resource:?} (protected)")
                } else {
                    format!("texture {resource:?}")
                }
            }
            QuadMaterial::Tile { resource } => format!("tile {resource:?}"),
            QuadMaterial::Surface { surface, .. } => format!("surface {surface:?}"),
            QuadMaterial::RenderPass { pass } => format!("pass {}", pass.0),
        };
        writeln!(
            writer,
            "  quad {} rect={} opacity={} blend={:?}",
            material,
            fmt_rect(quad.rect),
            state.opacity,
            state.blend_mode,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use laminate_core::frame::{DrawQuad, RenderPassId, SharedQuadState};

    use super::*;

    #[test]
    fn dump_mentions_every_pass_and_quad() {
        let mut pass = RenderPass::new(RenderPassId(3), Rect::new(0.0, 0.0, 100.0, 50.0));
        pass.add_shared_state(SharedQuadState::default());
        pass.add_quad(DrawQuad::new(
            0,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            QuadMaterial::SolidColor { color: 0xFF00_FF00 },
        ));
        let frame = CompositorFrame::from_passes(vec![pass]);

        let mut out = Vec::new();
        dump_frame(&frame, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("pass 3"), "{text}");
        assert!(text.contains("solid #FF00FF00"), "{text}");
        assert!(text.contains("100x50"), "{text}");
    }
}
