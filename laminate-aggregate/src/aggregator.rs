// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The aggregation pipeline.
//!
//! [`Aggregator::aggregate`] runs two phases over the embedding graph rooted
//! at the display's root surface:
//!
//! 1. **Prewalk** (mutable manager access): depth-first discovery of every
//!    reachable surface. Marks frames aggregated, takes copy-output requests,
//!    validates and pins resources, and folds per-surface damage into one
//!    root-space rect.
//! 2. **Copy** (shared manager access): emits output passes bottom-up. A
//!    surface embedded as plain opaque source-over content with an
//!    axis-aligned transform is inlined into its embedder's pass; anything
//!    else keeps its root pass as a separate output pass referenced through a
//!    render-pass quad.
//!
//! Embedding cycles are broken by dropping the quad that would close them.
//! The output frame contains no surface quads, pass ids unique within the
//! frame, and every pass before any pass that samples it.

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use kurbo::Rect;
use laminate_core::frame::{
    BlendMode, CompositorFrame, CopyOutputRequest, DrawQuad, QuadMaterial, RenderPass,
    RenderPassId, ResourceId, SharedQuadState, TransferableResource,
};
use laminate_core::surface::{FrameSinkClient, FrameSinkId, SurfaceId, SurfaceManager};
use laminate_core::transform::Transform3d;

use crate::compose::{self, EmbedContext};
use crate::damage::DamageTracker;
use crate::error::AggregateError;
use crate::ids::PassIdMap;
use crate::resources::{self, ResourceProvider, ResourceTracker};

/// Opaque black, drawn in place of protected content on insecure outputs.
const PROTECTED_FALLBACK_COLOR: u32 = 0xFF00_0000;

/// What the prewalk learned about one surface.
#[derive(Clone, Copy, Debug, Default)]
struct SurfaceInfo {
    /// The surface has an active frame with usable resources.
    contributing: bool,
    /// Reached through surface quads rather than only frame references.
    drawn: bool,
    /// Copy-output requests were taken from it this aggregation.
    has_copy_requests: bool,
}

/// Everything the prewalk needs from a frame, copied out so the frame borrow
/// can end before the manager is mutated again.
struct FramePrewalk {
    frame_index: u64,
    root_output: Rect,
    root_damage: Rect,
    pixel_moving: bool,
    valid: bool,
    resource_ids: Vec<ResourceId>,
    children: Vec<(SurfaceId, Transform3d)>,
    referenced: Vec<SurfaceId>,
}

/// Flattens a forest of surface frames into one frame for the display.
///
/// Owns all cross-aggregation state: pass-id mappings, damage history,
/// resource refcounts, and the set of surfaces seen last time.
pub struct Aggregator {
    provider: Option<Box<dyn ResourceProvider>>,
    use_partial_swap: bool,
    output_is_secure: bool,

    ids: PassIdMap,
    damage: DamageTracker,
    resources: ResourceTracker,
    previous_contained: HashSet<SurfaceId>,

    // Scratch state, reset at the start of every aggregation.
    contained: HashSet<SurfaceId>,
    visited: HashMap<SurfaceId, SurfaceInfo>,
    stack: Vec<SurfaceId>,
    embedded: HashSet<SurfaceId>,
    prewalk_order: Vec<SurfaceId>,
    referenced_order: Vec<SurfaceId>,
    taken_requests: HashMap<(SurfaceId, RenderPassId), Vec<CopyOutputRequest>>,
    inlined: HashMap<SurfaceId, Option<RenderPassId>>,
    draw_notifications: Vec<(SurfaceId, Rect)>,
    output_resources: Vec<TransferableResource>,
    output_resource_keys: HashSet<(FrameSinkId, ResourceId)>,
}

impl Aggregator {
    /// Creates an aggregator with partial swap enabled and an insecure
    /// output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            provider: None,
            use_partial_swap: true,
            output_is_secure: false,
            ids: PassIdMap::new(),
            damage: DamageTracker::new(),
            resources: ResourceTracker::new(),
            previous_contained: HashSet::new(),
            contained: HashSet::new(),
            visited: HashMap::new(),
            stack: Vec::new(),
            embedded: HashSet::new(),
            prewalk_order: Vec::new(),
            referenced_order: Vec::new(),
            taken_requests: HashMap::new(),
            inlined: HashMap::new(),
            draw_notifications: Vec::new(),
            output_resources: Vec::new(),
            output_resource_keys: HashSet::new(),
        }
    }

    /// Installs the validator consulted for every frame's resource list.
    pub fn set_resource_provider(&mut self, provider: Box<dyn ResourceProvider>) {
        self.provider = Some(provider);
    }

    /// When disabled, every output frame reports its full output rect as
    /// damaged. Damage history is tracked either way.
    pub fn set_use_partial_swap(&mut self, enable: bool) {
        self.use_partial_swap = enable;
    }

    /// Whether the output link is secure. Protected quads are replaced with
    /// opaque black on insecure outputs.
    pub fn set_output_is_secure(&mut self, secure: bool) {
        self.output_is_secure = secure;
    }

    /// Forces `surface` to contribute full damage the next time it is
    /// aggregated, regardless of what it resubmits.
    pub fn set_full_damage_for_surface(&mut self, surface: SurfaceId) {
        self.damage.force_full_damage(surface);
    }

    /// Surfaces reached by the most recent aggregation.
    pub fn previous_contained_surfaces(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.previous_contained.iter().copied()
    }

    /// Flattens the frame forest rooted at `root` into a single frame.
    ///
    /// Returns an empty frame if `root` is invalid or has no active frame;
    /// no cross-aggregation state changes in that case.
    pub fn aggregate(
        &mut self,
        manager: &mut SurfaceManager,
        client: &mut dyn FrameSinkClient,
        root: SurfaceId,
    ) -> CompositorFrame {
        if !root.is_valid() || manager.frame(root).is_none() {
            log::debug!("{}", AggregateError::InvalidSurface(root));
            return CompositorFrame::default();
        }
        self.begin();
        self.prewalk(manager, root, Transform3d::IDENTITY, true);

        let mut passes = Vec::new();
        // Surfaces elided by resource validation still owe their taken copy
        // requests; deliver them on empty shell passes up front.
        let shells: Vec<SurfaceId> = self
            .prewalk_order
            .iter()
            .copied()
            .filter(|s| {
                let info = self.visited.get(s).copied().unwrap_or_default();
                !info.contributing && info.has_copy_requests
            })
            .collect();
        for surface in shells {
            self.emit_shell_passes(manager, surface, &mut passes);
        }
        // Referenced-but-undrawn surfaces holding copy requests (anywhere in
        // their embedding subtree) render into output passes that nothing
        // samples. The root stays on the stack throughout: an undrawn capture
        // embedding the aggregation's own output is a cycle, and the root's
        // passes must only be emitted once, at the end.
        let undrawn: Vec<SurfaceId> = self
            .referenced_order
            .iter()
            .copied()
            .filter(|s| {
                let info = self.visited.get(s).copied().unwrap_or_default();
                *s != root
                    && info.contributing
                    && info.has_copy_requests
                    && !self.embedded.contains(s)
            })
            .collect();
        self.stack.push(root);
        for surface in undrawn {
            if !self.inlined.contains_key(&surface) {
                self.emit_surface(manager, surface, &mut passes);
            }
        }
        self.stack.pop();
        let root_contributes = self.visited.get(&root).is_some_and(|i| i.contributing);
        if root_contributes {
            self.emit_surface(manager, root, &mut passes);
        }

        let root_output = manager
            .frame(root)
            .and_then(|f| f.root_pass())
            .map(|p| p.output_rect)
            .unwrap_or(Rect::ZERO);
        let damage = self.damage.finish();
        let damage_rect = if self.use_partial_swap {
            damage.intersect(root_output)
        } else {
            root_output
        };
        if root_contributes {
            if let Some(root_pass) = passes.last_mut() {
                root_pass.damage_rect = damage_rect;
            }
        }
        self.ids.end_aggregation();

        // Surfaces that fell out of the aggregation release their pins.
        let departed: Vec<SurfaceId> = self
            .previous_contained
            .difference(&self.contained)
            .copied()
            .collect();
        for surface in departed {
            self.resources.release_surface(surface);
        }
        for (sink, returned) in self.resources.take_returns() {
            client.return_resources(sink, returned);
        }
        for (surface, rect) in core::mem::take(&mut self.draw_notifications) {
            client.will_draw_surface(surface.local(), rect);
        }
        core::mem::swap(&mut self.previous_contained, &mut self.contained);

        let mut output = CompositorFrame::from_passes(passes);
        output.resource_list = core::mem::take(&mut self.output_resources);
        output
    }

    fn begin(&mut self) {
        self.contained.clear();
        self.visited.clear();
        self.stack.clear();
        self.embedded.clear();
        self.prewalk_order.clear();
        self.referenced_order.clear();
        self.taken_requests.clear();
        self.inlined.clear();
        self.draw_notifications.clear();
        self.output_resources.clear();
        self.output_resource_keys.clear();
        self.ids.begin_aggregation();
        self.damage.begin();
    }

    /// Discovery phase. `to_root` maps the surface's root target space into
    /// the aggregated root target space; `drawn` is false for surfaces
    /// reached only through frame references.
    fn prewalk(
        &mut self,
        manager: &mut SurfaceManager,
        id: SurfaceId,
        to_root: Transform3d,
        drawn: bool,
    ) {
        if self.stack.contains(&id) {
            log::debug!("{}", AggregateError::CycleDetected(id));
            return;
        }
        // A surface first reached undrawn may be revisited once it turns out
        // to be embedded somewhere after all.
        let prior = self.visited.get(&id).copied();
        let upgrade = match prior {
            Some(info) => {
                if info.drawn || !drawn {
                    return;
                }
                true
            }
            None => false,
        };
        manager.mark_aggregated(id);
        let Some(info) = self.collect(manager, id) else {
            log::debug!("{}", AggregateError::InvalidSurface(id));
            self.visited.insert(id, SurfaceInfo::default());
            return;
        };
        for (pass_id, request) in manager.take_copy_requests(id) {
            self.taken_requests
                .entry((id, pass_id))
                .or_default()
                .push(request);
        }
        let has_requests =
            prior.is_some_and(|p| p.has_copy_requests) || self.has_taken_requests(id);
        self.contained.insert(id);
        if !upgrade {
            self.prewalk_order.push(id);
        }

        if !info.valid {
            log::debug!("{}", AggregateError::ResourceValidationFailed(id));
            self.resources.release_surface(id);
            self.visited.insert(
                id,
                SurfaceInfo {
                    contributing: false,
                    drawn,
                    has_copy_requests: has_requests,
                },
            );
            return;
        }
        self.resources.retain(id, &info.resource_ids);
        let local_damage = self.damage.contribute(
            id,
            info.frame_index,
            info.root_damage,
            info.root_output,
            to_root,
            info.pixel_moving,
            drawn,
        );
        if drawn {
            self.draw_notifications.push((id, local_damage));
        }

        self.stack.push(id);
        for &(child, embed) in &info.children {
            self.embedded.insert(child);
            self.prewalk(manager, child, to_root * embed, drawn);
        }
        for referenced in info.referenced {
            self.referenced_order.push(referenced);
            self.prewalk(manager, referenced, to_root, false);
        }
        self.stack.pop();
        // Requests taken anywhere in the embedding subtree count against this
        // surface too; an undrawn surface must still be rendered when only a
        // descendant carries the capture.
        let has_requests = has_requests
            || info.children.iter().any(|(child, _)| {
                self.visited
                    .get(child)
                    .is_some_and(|i| i.has_copy_requests)
            });
        self.visited.insert(
            id,
            SurfaceInfo {
                contributing: true,
                drawn,
                has_copy_requests: has_requests,
            },
        );
    }

    /// Copies out everything the prewalk needs from `id`'s frame, or `None`
    /// if the surface has no active frame.
    fn collect(&self, manager: &SurfaceManager, id: SurfaceId) -> Option<FramePrewalk> {
        let frame = manager.frame(id)?;
        let (root_output, root_damage) = match frame.root_pass() {
            Some(root) => (root.output_rect, root.damage_rect),
            None => (Rect::ZERO, Rect::ZERO),
        };
        let mut pixel_moving = false;
        let mut resource_ids = Vec::new();
        let mut children = Vec::new();
        for pass in &frame.passes {
            pixel_moving |= pass.has_pixel_moving_filter();
            for quad in &pass.quads {
                if let QuadMaterial::Surface { surface, .. } = quad.material {
                    let state = &pass.shared_quad_states[quad.shared_state];
                    children.push((
                        surface,
                        pass.transform_to_root_target * state.quad_to_target_transform,
                    ));
                } else if let Some(resource) = quad.resource() {
                    if !resource_ids.contains(&resource) {
                        resource_ids.push(resource);
                    }
                }
            }
        }
        Some(FramePrewalk {
            frame_index: manager.frame_index(id).unwrap_or(0),
            root_output,
            root_damage,
            pixel_moving,
            valid: resources::validate(self.provider.as_deref(), frame),
            resource_ids,
            children,
            referenced: frame.metadata.referenced_surfaces.clone(),
        })
    }

    fn has_taken_requests(&self, surface: SurfaceId) -> bool {
        self.taken_requests.keys().any(|(s, _)| *s == surface)
    }

    /// The frame-local ids of `surface`'s passes whose content feeds a taken
    /// copy request: passes carrying one, plus everything they sample. Passes
    /// are ordered dependencies-first, so one reverse sweep resolves the
    /// chain.
    fn capture_pass_set(
        &self,
        surface: SurfaceId,
        frame: &CompositorFrame,
    ) -> HashSet<RenderPassId> {
        let mut captured = HashSet::new();
        for pass in frame.passes.iter().rev() {
            if !captured.contains(&pass.id)
                && !self.taken_requests.contains_key(&(surface, pass.id))
            {
                continue;
            }
            captured.insert(pass.id);
            for quad in &pass.quads {
                if let QuadMaterial::RenderPass { pass: sampled } = quad.material {
                    captured.insert(sampled);
                }
            }
        }
        captured
    }

    /// Emits all of `surface`'s passes as output passes, root pass last.
    /// Used for the root surface and for undrawn captured surfaces.
    fn emit_surface(
        &mut self,
        manager: &SurfaceManager,
        surface: SurfaceId,
        output: &mut Vec<RenderPass>,
    ) {
        let Some(frame) = manager.frame(surface) else {
            return;
        };
        let captured = self.capture_pass_set(surface, frame);
        self.stack.push(surface);
        let mut last = None;
        for pass in &frame.passes {
            let in_copy_path = captured.contains(&pass.id);
            last = Some(self.copy_pass(manager, surface, frame, pass, in_copy_path, output));
        }
        self.stack.pop();
        self.inlined.insert(surface, last);
    }

    /// Delivers taken copy requests of an elided surface on passes with no
    /// content.
    fn emit_shell_passes(
        &mut self,
        manager: &SurfaceManager,
        surface: SurfaceId,
        output: &mut Vec<RenderPass>,
    ) {
        let Some(frame) = manager.frame(surface) else {
            return;
        };
        for pass in &frame.passes {
            let Some(requests) = self.taken_requests.remove(&(surface, pass.id)) else {
                continue;
            };
            let mut shell = RenderPass::new(self.ids.remap(surface, pass.id), pass.output_rect);
            shell.transform_to_root_target = pass.transform_to_root_target;
            shell.copy_requests = requests;
            output.push(shell);
        }
    }

    /// Copies one source pass into a fresh output pass, appended to
    /// `output` after any passes its quads reference.
    fn copy_pass(
        &mut self,
        manager: &SurfaceManager,
        surface: SurfaceId,
        frame: &CompositorFrame,
        source: &RenderPass,
        in_copy_path: bool,
        output: &mut Vec<RenderPass>,
    ) -> RenderPassId {
        let remapped = self.ids.remap(surface, source.id);
        let mut dest = RenderPass::new(remapped, source.output_rect);
        dest.damage_rect = source.damage_rect;
        dest.transform_to_root_target = source.transform_to_root_target;
        dest.filters = source.filters.clone();
        dest.background_filters = source.background_filters.clone();
        dest.has_transparent_background = source.has_transparent_background;
        if let Some(requests) = self.taken_requests.remove(&(surface, source.id)) {
            dest.copy_requests = requests;
        }
        let in_copy_path = in_copy_path || !dest.copy_requests.is_empty();
        let ctx = EmbedContext::root(in_copy_path);
        self.copy_quads(manager, surface, frame, source, &ctx, &mut dest, output);
        output.push(dest);
        remapped
    }

    /// Copies `source`'s quads into `dest` under the embedding context
    /// `ctx`, recursing through surface quads.
    #[expect(clippy::too_many_arguments, reason = "threads one traversal's state")]
    fn copy_quads(
        &mut self,
        manager: &SurfaceManager,
        surface: SurfaceId,
        frame: &CompositorFrame,
        source: &RenderPass,
        ctx: &EmbedContext,
        dest: &mut RenderPass,
        output: &mut Vec<RenderPass>,
    ) {
        // Source shared-state index -> dest index. States are spliced in
        // source-list order; states used only by surface quads are skipped,
        // the embedded content carries its own.
        let mut used = alloc::vec![false; source.shared_quad_states.len()];
        for quad in &source.quads {
            if !matches!(quad.material, QuadMaterial::Surface { .. }) {
                used[quad.shared_state] = true;
            }
        }
        let mut state_map: Vec<Option<usize>> = alloc::vec![None; source.shared_quad_states.len()];
        for (index, state) in source.shared_quad_states.iter().enumerate() {
            if used[index] {
                state_map[index] = Some(dest.add_shared_state(compose::compose_state(ctx, state)));
            }
        }
        for quad in &source.quads {
            if matches!(quad.material, QuadMaterial::Surface { .. }) {
                let state = &source.shared_quad_states[quad.shared_state];
                self.embed_surface(manager, quad, state, ctx, dest, output);
                continue;
            }
            let dest_state = match state_map[quad.shared_state] {
                Some(index) => index,
                None => {
                    let composed =
                        compose::compose_state(ctx, &source.shared_quad_states[quad.shared_state]);
                    let index = dest.add_shared_state(composed);
                    state_map[quad.shared_state] = Some(index);
                    index
                }
            };
            let mut copied = *quad;
            copied.shared_state = dest_state;
            if let QuadMaterial::RenderPass { pass } = &mut copied.material {
                *pass = self.ids.remap(surface, *pass);
            }
            if let QuadMaterial::Texture {
                secure_output_only: true,
                ..
            } = copied.material
            {
                if ctx.in_copy_path {
                    log::debug!("{}", AggregateError::ProtectedContentWithCopyRequest(surface));
                    copied.material = QuadMaterial::SolidColor {
                        color: PROTECTED_FALLBACK_COLOR,
                    };
                } else if !self.output_is_secure {
                    log::trace!("masking protected quad of {surface:?} on insecure output");
                    copied.material = QuadMaterial::SolidColor {
                        color: PROTECTED_FALLBACK_COLOR,
                    };
                }
            }
            if let Some(resource) = copied.resource() {
                self.record_output_resource(surface, frame, resource);
            }
            dest.quads.push(copied);
        }
    }

    /// Replaces one surface quad with the embedded surface's content:
    /// inline quads when the embedding is plain opaque source-over with an
    /// axis-aligned transform, a render-pass quad otherwise.
    fn embed_surface(
        &mut self,
        manager: &SurfaceManager,
        quad: &DrawQuad,
        state: &SharedQuadState,
        ctx: &EmbedContext,
        dest: &mut RenderPass,
        output: &mut Vec<RenderPass>,
    ) {
        let QuadMaterial::Surface { surface: child, .. } = quad.material else {
            return;
        };
        if self.stack.contains(&child) {
            log::debug!("{}", AggregateError::CycleDetected(child));
            return;
        }
        let info = self.visited.get(&child).copied().unwrap_or_default();
        if !info.contributing {
            log::debug!("dropping embed of non-contributing surface {child:?}");
            return;
        }
        // A surface already emitted this aggregation is referenced, not
        // copied again; if it merged into another pass there is nothing to
        // reference and the quad is dropped.
        if let Some(&emitted_root) = self.inlined.get(&child) {
            match emitted_root {
                Some(id) => {
                    let index = dest.add_shared_state(compose::compose_state(ctx, state));
                    dest.quads.push(DrawQuad::new(
                        index,
                        quad.rect,
                        QuadMaterial::RenderPass { pass: id },
                    ));
                }
                None => log::debug!("dropping repeat embed of merged surface {child:?}"),
            }
            return;
        }
        let Some(frame) = manager.frame(child) else {
            return;
        };
        let Some((root_pass, non_root)) = frame.passes.split_last() else {
            return;
        };
        let captured = self.capture_pass_set(child, frame);
        let child_ctx = ctx.descend(state);
        self.stack.push(child);
        for pass in non_root {
            let in_copy_path = child_ctx.in_copy_path || captured.contains(&pass.id);
            self.copy_pass(manager, child, frame, pass, in_copy_path, output);
        }
        let root_has_requests = self.taken_requests.contains_key(&(child, root_pass.id));
        let merge = child_ctx.is_effectively_opaque()
            && state.blend_mode == BlendMode::SourceOver
            && child_ctx.transform.preserves_2d_axis_alignment()
            && !root_has_requests;
        if merge {
            self.inlined.insert(child, None);
            self.copy_quads(manager, child, frame, root_pass, &child_ctx, dest, output);
        } else {
            let in_copy_path = child_ctx.in_copy_path || captured.contains(&root_pass.id);
            let remapped =
                self.copy_pass(manager, child, frame, root_pass, in_copy_path, output);
            self.inlined.insert(child, Some(remapped));
            let index = dest.add_shared_state(compose::compose_state(ctx, state));
            dest.quads.push(DrawQuad::new(
                index,
                quad.rect,
                QuadMaterial::RenderPass { pass: remapped },
            ));
        }
        self.stack.pop();
    }

    fn record_output_resource(
        &mut self,
        surface: SurfaceId,
        frame: &CompositorFrame,
        id: ResourceId,
    ) {
        if !self.output_resource_keys.insert((surface.sink(), id)) {
            return;
        }
        if let Some(resource) = frame.resource_list.iter().find(|r| r.id == id) {
            self.output_resources.push(*resource);
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Aggregator")
            .field("use_partial_swap", &self.use_partial_swap)
            .field("output_is_secure", &self.output_is_secure)
            .field("previous_contained", &self.previous_contained.len())
            .finish_non_exhaustive()
    }
}
