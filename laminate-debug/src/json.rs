// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON frame export.
//!
//! [`export`] serializes an aggregated frame as a single JSON object,
//! suitable for diffing between aggregations or attaching to bug reports.

use std::io::{self, Write};

use kurbo::Rect;
use serde_json::{Value, json};

use laminate_core::frame::{CompositorFrame, QuadMaterial, RenderPass};

fn rect_json(rect: Rect) -> Value {
    json!([rect.x0, rect.y0, rect.x1, rect.y1])
}

fn quad_json(pass: &RenderPass, index: usize) -> Value {
    let quad = &pass.quads[index];
    let state = &pass.shared_quad_states[quad.shared_state];
    let material = match quad.material {
        QuadMaterial::SolidColor { color } => json!({
            "kind": "solid",
            "color": format!("#{color:08X}"),
        }),
        QuadMaterial::Texture {
            resource,
            secure_output_only,
        } => json!({
            "kind": "texture",
            "resource": resource.0,
            "protected": secure_output_only,
        }),
        QuadMaterial::Tile { resource } => json!({
            "kind": "tile",
            "resource": resource.0,
        }),
        QuadMaterial::Surface { surface, .. } => json!({
            "kind": "surface",
            "surface": format!("{surface:?}"),
        }),
        QuadMaterial::RenderPass { pass } => json!({
            "kind": "render_pass",
            "pass": pass.0,
        }),
    };
    json!({
        "rect": rect_json(quad.rect),
        "opacity": state.opacity,
        "blend": format!("{:?}", state.blend_mode),
        "clip": state.clip_rect.map(rect_json),
        "material": material,
    })
}

/// Writes `frame` as one JSON object to `writer`.
pub fn export(frame: &CompositorFrame, writer: &mut dyn Write) -> io::Result<()> {
    let passes: Vec<Value> = frame
        .passes
        .iter()
        .map(|pass| {
            let quads: Vec<Value> = (0..pass.quads.len()).map(|i| quad_json(pass, i)).collect();
            json!({
                "id": pass.id.0,
                "output_rect": rect_json(pass.output_rect),
                "damage_rect": rect_json(pass.damage_rect),
                "filters": pass.filters.len(),
                "copy_requests": pass
                    .copy_requests
                    .iter()
                    .map(|r| r.request_id())
                    .collect::<Vec<_>>(),
                "quads": quads,
            })
        })
        .collect();
    let doc = json!({
        "resources": frame
            .resource_list
            .iter()
            .map(|r| json!({
                "id": r.id.0,
                "software": r.is_software,
                "protected": r.secure_output_only,
            }))
            .collect::<Vec<_>>(),
        "passes": passes,
    });
    serde_json::to_writer_pretty(&mut *writer, &doc)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use laminate_core::frame::{DrawQuad, RenderPassId, SharedQuadState};

    use super::*;

    #[test]
    fn export_round_trips_through_serde_json() {
        let mut pass = RenderPass::new(RenderPassId(1), Rect::new(0.0, 0.0, 8.0, 8.0));
        pass.add_shared_state(SharedQuadState::default());
        pass.add_quad(DrawQuad::new(
            0,
            Rect::new(0.0, 0.0, 4.0, 4.0),
            QuadMaterial::RenderPass {
                pass: RenderPassId(7),
            },
        ));
        let frame = CompositorFrame::from_passes(vec![pass]);

        let mut out = Vec::new();
        export(&frame, &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["passes"][0]["id"], 1);
        assert_eq!(parsed["passes"][0]["quads"][0]["material"]["pass"], 7);
    }
}
